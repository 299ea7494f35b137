pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod mail;
pub mod session;

pub use api::{MailClient, MailFormat, OutgoingMessage, ReplyDraftStrategy, ReplyOptions};
pub use auth::{Authenticator, TokenResponse};
pub use config::Settings;
pub use error::{AppError, AppResult};
pub use session::{connect, connect_from_env};
