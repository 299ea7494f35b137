use std::time::Duration;

use reqwest::Client;

use crate::error::AppResult;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shared `reqwest` client setup. The provider gives no bound on a hung
/// connection, so every request carries a fixed timeout.
pub fn build_client() -> AppResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}
