use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::models::ReplyDraftStrategy;
use crate::error::{AppError, AppResult};

pub const ENV_CLIENT_ID: &str = "ZOHOMAIL_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ZOHOMAIL_CLIENT_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "ZOHOMAIL_REFRESH_TOKEN";
pub const ENV_ACCOUNT_ID: &str = "ZOHOMAIL_ACCOUNT_ID";
pub const ENV_USER_ID: &str = "ZOHOMAIL_USER_ID";
pub const ENV_ALLOW_SEND_MAIL: &str = "ZOHOMAIL_ALLOW_SEND_MAIL";
pub const ENV_REPLY_DRAFT_STRATEGY: &str = "ZOHOMAIL_REPLY_DRAFT_STRATEGY";
pub const ENV_TIME_ZONE: &str = "ZOHOMAIL_TIME_ZONE";
pub const ENV_API_BASE_URL: &str = "ZOHOMAIL_API_BASE_URL";
pub const ENV_TOKEN_URL: &str = "ZOHOMAIL_TOKEN_URL";

/// Everything needed to build an authenticated [`MailClient`](crate::api::MailClient).
///
/// Only the four credential fields are required; the rest fall back to the
/// public Zoho endpoints and client defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "user_id")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub allow_send_mail: Option<bool>,
    #[serde(default)]
    pub reply_draft_strategy: Option<ReplyDraftStrategy>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
}

/// The validated credential set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub account_id: String,
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first
    /// when one exists.
    pub fn from_env() -> AppResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !is_missing_env_file(&err) {
                warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allow_send_mail = lookup(ENV_ALLOW_SEND_MAIL)
            .map(|raw| parse_flag(ENV_ALLOW_SEND_MAIL, &raw))
            .transpose()?;
        let reply_draft_strategy = lookup(ENV_REPLY_DRAFT_STRATEGY)
            .map(|raw| raw.parse::<ReplyDraftStrategy>())
            .transpose()?;

        Ok(Self {
            client_id: lookup(ENV_CLIENT_ID),
            client_secret: lookup(ENV_CLIENT_SECRET),
            refresh_token: lookup(ENV_REFRESH_TOKEN),
            account_id: lookup_present(&lookup, ENV_ACCOUNT_ID)
                .or_else(|| lookup_present(&lookup, ENV_USER_ID)),
            allow_send_mail,
            reply_draft_strategy,
            time_zone: lookup(ENV_TIME_ZONE),
            api_base_url: lookup(ENV_API_BASE_URL),
            token_url: lookup(ENV_TOKEN_URL),
        })
    }

    /// Fails with every missing setting named, so one run reports them all.
    pub fn credentials(&self) -> AppResult<Credentials> {
        let fields = [
            (ENV_CLIENT_ID, &self.client_id),
            (ENV_CLIENT_SECRET, &self.client_secret),
            (ENV_REFRESH_TOKEN, &self.refresh_token),
            (ENV_ACCOUNT_ID, &self.account_id),
        ];

        let missing = fields
            .iter()
            .filter(|(_, value)| present(value).is_none())
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let take = |value: &Option<String>| present(value).unwrap_or_default().to_string();
        Ok(Credentials {
            client_id: take(&self.client_id),
            client_secret: take(&self.client_secret),
            refresh_token: take(&self.refresh_token),
            account_id: take(&self.account_id),
        })
    }

    pub fn allow_send_mail(&self) -> bool {
        self.allow_send_mail.unwrap_or(true)
    }

    pub fn reply_draft_strategy(&self) -> ReplyDraftStrategy {
        self.reply_draft_strategy.unwrap_or_default()
    }

    pub fn time_zone(&self) -> Option<&str> {
        present(&self.time_zone)
    }

    pub fn api_base_url(&self) -> Option<&str> {
        present(&self.api_base_url)
    }

    pub fn token_url(&self) -> Option<&str> {
        present(&self.token_url)
    }
}

/// Loads a JSON settings file. A missing file yields empty settings.
pub fn load(path: &Path) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

fn lookup_present<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn is_missing_env_file(err: &dotenvy::Error) -> bool {
    matches!(err, dotenvy::Error::Io(source) if source.kind() == io::ErrorKind::NotFound)
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_flag(name: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!(
            "{name} must be a boolean, got `{other}`"
        ))),
    }
}
