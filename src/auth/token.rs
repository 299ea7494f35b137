use std::fmt;

use serde_json::{Map, Value};

/// Raw JSON object returned by the token endpoint.
///
/// Zoho answers failed exchanges with a 200 and an `error` field, so success
/// is judged only by the presence of `access_token`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenResponse(Map<String, Value>);

impl TokenResponse {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.str_field("access_token")
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.str_field("refresh_token")
    }

    pub fn api_domain(&self) -> Option<&str> {
        self.str_field("api_domain")
    }

    pub fn token_type(&self) -> Option<&str> {
        self.str_field("token_type")
    }

    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }

    pub fn expires_in(&self) -> Option<u64> {
        self.0.get("expires_in").and_then(Value::as_u64)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl fmt::Display for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: Value) -> TokenResponse {
        match value {
            Value::Object(fields) => TokenResponse::new(fields),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn reads_success_fields() {
        let token = response(json!({
            "access_token": "1000.abc",
            "api_domain": "https://www.zohoapis.com",
            "token_type": "Bearer",
            "expires_in": 3600
        }));

        assert_eq!(token.access_token(), Some("1000.abc"));
        assert_eq!(token.api_domain(), Some("https://www.zohoapis.com"));
        assert_eq!(token.token_type(), Some("Bearer"));
        assert_eq!(token.expires_in(), Some(3600));
        assert_eq!(token.refresh_token(), None);
    }

    #[test]
    fn error_payload_has_no_access_token() {
        let token = response(json!({"error": "invalid_code"}));

        assert_eq!(token.access_token(), None);
        assert_eq!(token.error(), Some("invalid_code"));
        assert_eq!(token.to_string(), r#"{"error":"invalid_code"}"#);
    }
}
