use std::collections::HashMap;
use std::fmt;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::ZOHO_TOKEN_URL;
use crate::error::{AppError, AppResult};
use crate::http;

use super::token::TokenResponse;

/// Talks to the Zoho accounts token endpoint for one OAuth client.
#[derive(Clone)]
pub struct Authenticator {
    http: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl Authenticator {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            http: http::build_client()?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: ZOHO_TOKEN_URL.to_string(),
        })
    }

    /// Points the exchange at another accounts server, e.g. a regional data
    /// center such as `https://accounts.zoho.eu/oauth/v2/token`.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// One-time exchange of an authorization grant code, used while setting
    /// up a refresh token.
    #[instrument(skip_all, level = "info")]
    pub async fn exchange_grant(&self, grant_code: &str) -> AppResult<TokenResponse> {
        let form = HashMap::from([
            ("code", grant_code.to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("grant_type", "authorization_code".to_string()),
        ]);

        self.post_form(&form).await
    }

    #[instrument(skip_all, level = "info")]
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let form = HashMap::from([
            ("refresh_token", refresh_token.to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("grant_type", "refresh_token".to_string()),
        ]);

        self.post_form(&form).await
    }

    async fn post_form(&self, form: &HashMap<&str, String>) -> AppResult<TokenResponse> {
        debug!(url = %self.token_url, "requesting token");
        let response = self.http.post(&self.token_url).form(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        let token = parse_token_response(&body)?;

        if let Some(error) = token.error() {
            warn!(%status, error, "token endpoint reported an error");
        }

        Ok(token)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}

fn parse_token_response(body: &str) -> AppResult<TokenResponse> {
    serde_json::from_str::<Map<String, Value>>(body)
        .map(TokenResponse::new)
        .map_err(|err| AppError::parse(body, err))
}
