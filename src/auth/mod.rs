pub mod oauth;
pub mod token;

pub use oauth::Authenticator;
pub use token::TokenResponse;
