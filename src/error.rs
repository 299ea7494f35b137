use std::io;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("zoho api error {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse response as JSON ({source}), body: {body}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("network or API error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sending mail is disabled for this client (allow_send_mail = false)")]
    SendDisabled,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    pub(crate) fn parse(body: &str, source: serde_json::Error) -> Self {
        Self::Parse {
            body: body.to_string(),
            source,
        }
    }

    /// HTTP status of an [`AppError::Api`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
