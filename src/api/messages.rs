//! Path segments for the account-scoped message resources. Ids stay as
//! separate segments so they are percent-encoded when joined onto a URL.

pub fn list_endpoint(account_id: &str) -> Vec<String> {
    segments(&["accounts", account_id, "messages", "view"])
}

pub fn collection_endpoint(account_id: &str) -> Vec<String> {
    segments(&["accounts", account_id, "messages"])
}

pub fn message_endpoint(account_id: &str, message_id: &str) -> Vec<String> {
    segments(&["accounts", account_id, "messages", message_id])
}

pub fn content_endpoint(account_id: &str, folder_id: &str, message_id: &str) -> Vec<String> {
    segments(&[
        "accounts", account_id, "folders", folder_id, "messages", message_id, "content",
    ])
}

pub fn details_endpoint(account_id: &str, folder_id: &str, message_id: &str) -> Vec<String> {
    segments(&[
        "accounts", account_id, "folders", folder_id, "messages", message_id, "details",
    ])
}

pub fn list_query(folder_id: Option<&str>, limit: u32) -> Vec<(String, String)> {
    let mut params = vec![("limit".to_string(), limit.to_string())];
    if let Some(folder_id) = folder_id {
        params.push(("folderId".to_string(), folder_id.to_string()));
    }
    params
}

pub(crate) fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}
