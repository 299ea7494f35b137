use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Body format of an outgoing message, as named by the Zoho API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailFormat {
    #[default]
    PlainText,
    Html,
}

impl MailFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "plaintext",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for MailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a reply that should not be sent right away is submitted.
///
/// Zoho's per-message `reply` action always sends, so neither option is a
/// true reply draft:
/// - `ScheduleSend` keeps the reply linked to the original message and
///   schedules it instead of sending it now.
/// - `GenericDraft` saves a real draft through the messages collection, but
///   the server does not link it to the original message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyDraftStrategy {
    #[default]
    ScheduleSend,
    GenericDraft,
}

impl FromStr for ReplyDraftStrategy {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "schedule_send" | "schedule" => Ok(Self::ScheduleSend),
            "generic_draft" | "draft" => Ok(Self::GenericDraft),
            other => Err(AppError::Config(format!(
                "unknown reply draft strategy `{other}`; expected schedule_send or generic_draft"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub content: String,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub mail_format: MailFormat,
    pub is_draft: bool,
    pub reply_to_message_id: Option<String>,
}

impl OutgoingMessage {
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn from_address(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn format(mut self, mail_format: MailFormat) -> Self {
        self.mail_format = mail_format;
        self
    }

    pub fn draft(mut self, is_draft: bool) -> Self {
        self.is_draft = is_draft;
        self
    }

    pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to_message_id = Some(message_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyOptions {
    pub from: Option<String>,
    pub mail_format: MailFormat,
    pub is_draft: bool,
}

/// The fields of a message details `data` object that a reply needs. Every
/// other field is ignored, whatever its type.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDetails {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "fromAddress")]
    pub from_address: String,
}
