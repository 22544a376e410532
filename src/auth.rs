use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Path of the credential exchange endpoint, relative to the base URL
pub const TOKEN_ENDPOINT: &str = "v2/token";

/// Authorization value the portal expects on the bootstrap token request
pub const BOOTSTRAP_AUTHORIZATION: &str = "TOKEN 4c433da015985d17669c604a5a4e2c906083e815";

/// Value of the `Client` header sent with every request
pub const CLIENT_IDENTIFIER: &str = "Breweryportal";

#[derive(Serialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by the token endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until the token expires
    pub exp: i64,
}

/// Source of the current time for token expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A bearer token together with the instant it stops being accepted.
///
/// Renewal replaces the whole value; the two halves are never updated
/// separately.
#[derive(Clone, PartialEq)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Build a token from an exchange response, anchoring `exp` at `issued_at`.
    ///
    /// Fails when `exp` does not fit in the calendar range chrono can represent.
    pub fn from_response(response: &TokenResponse, issued_at: DateTime<Utc>) -> Result<Self> {
        let expires_at = Duration::try_seconds(response.exp)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or(Error::InvalidExpiry(response.exp))?;
        Ok(Self::new(response.token.clone(), expires_at))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &crate::redact::MASK)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"token":"mock_token","exp":3600}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "mock_token");
        assert_eq!(response.exp, 3600);
    }

    #[test]
    fn test_token_response_missing_exp_is_rejected() {
        let json = r#"{"token":"mock_token"}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[test]
    fn test_token_request_uses_email_field() {
        let request = TokenRequest {
            email: "brewer@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["email"], "brewer@example.com");
        assert_eq!(json["password"], "hunter2");
    }

    #[test]
    fn test_token_validity_against_expiry() {
        let token = Token::new("mock_token", at(2000));
        assert!(token.is_valid_at(at(1000)));
        assert!(!token.is_valid_at(at(2000)));
        assert!(!token.is_valid_at(at(3000)));
    }

    #[test]
    fn test_token_from_response_adds_exp() {
        let response = TokenResponse {
            token: "mock_token".to_string(),
            exp: 3600,
        };
        let token = Token::from_response(&response, at(1000)).unwrap();
        assert_eq!(token.value(), "mock_token");
        assert_eq!(token.expires_at(), at(4600));
        assert_eq!(token.bearer(), "Bearer mock_token");
    }

    #[test]
    fn test_token_from_response_rejects_out_of_range_exp() {
        for exp in [i64::MAX, 9_000_000_000_000, i64::MIN] {
            let response = TokenResponse {
                token: "mock_token".to_string(),
                exp,
            };
            let result = Token::from_response(&response, at(1000));
            assert!(
                matches!(result, Err(Error::InvalidExpiry(value)) if value == exp),
                "exp {} should be rejected",
                exp
            );
        }
    }

    #[test]
    fn test_token_debug_hides_value() {
        let token = Token::new("super-secret-token", at(2000));
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("***"));
    }
}
