pub mod client;
pub mod folders;
pub mod messages;
pub mod models;

pub use client::{DEFAULT_LIST_LIMIT, MailClient};
pub use models::{MailFormat, MessageDetails, OutgoingMessage, ReplyDraftStrategy, ReplyOptions};
