use tracing::{info, instrument};

use crate::api::client::MailClient;
use crate::auth::Authenticator;
use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Validates `settings`, refreshes an access token once and returns a client
/// bound to it. Every call performs a fresh refresh.
#[instrument(skip_all, level = "info")]
pub async fn connect(settings: &Settings) -> AppResult<MailClient> {
    let credentials = settings.credentials()?;

    let mut auth = Authenticator::new(&credentials.client_id, &credentials.client_secret)?;
    if let Some(token_url) = settings.token_url() {
        auth = auth.with_token_url(token_url);
    }

    let token = auth.refresh(&credentials.refresh_token).await?;
    let access_token = token.access_token().ok_or_else(|| {
        AppError::Config(format!("error refreshing access token: {token}"))
    })?;

    let mut client = MailClient::new(access_token, &credentials.account_id)?
        .with_send_permission(settings.allow_send_mail())
        .with_reply_draft_strategy(settings.reply_draft_strategy());
    if let Some(base_url) = settings.api_base_url() {
        client = client.with_base_url(base_url);
    }
    if let Some(time_zone) = settings.time_zone() {
        client = client.with_time_zone(time_zone);
    }

    info!(account_id = client.account_id(), "zoho mail session ready");
    Ok(client)
}

/// [`connect`] with settings read from the environment (and `.env`).
pub async fn connect_from_env() -> AppResult<MailClient> {
    let settings = Settings::from_env()?;
    connect(&settings).await
}
