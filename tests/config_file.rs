use std::fs;

use zohomail::api::ReplyDraftStrategy;
use zohomail::config;

#[test]
fn loads_settings_file_with_user_id_alias() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("zohomail.json");
    fs::write(
        &path,
        r#"{
            "client_id": "client",
            "client_secret": "secret",
            "refresh_token": "refresh",
            "user_id": "555",
            "allow_send_mail": false,
            "reply_draft_strategy": "generic_draft"
        }"#,
    )
    .expect("write settings");

    let settings = config::load(&path).expect("settings");
    let credentials = settings.credentials().expect("credentials");

    assert_eq!(credentials.account_id, "555");
    assert!(!settings.allow_send_mail());
    assert_eq!(settings.reply_draft_strategy(), ReplyDraftStrategy::GenericDraft);
}

#[test]
fn missing_file_yields_empty_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = config::load(&dir.path().join("absent.json")).expect("settings");

    assert!(settings.client_id.is_none());
    assert!(settings.credentials().is_err());
}
