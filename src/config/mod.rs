pub mod settings;

pub use settings::{Credentials, Settings, load};

pub const ZOHO_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";
pub const ZOHO_MAIL_API_BASE_URL: &str = "https://mail.zoho.com/api";
