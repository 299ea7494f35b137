use super::messages::segments;

pub fn list_folders_endpoint(account_id: &str) -> Vec<String> {
    segments(&["accounts", account_id, "folders"])
}
