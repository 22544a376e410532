use std::fmt;

use reqwest::header::InvalidHeaderValue;
use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Config(String),
    /// The token endpoint answered with a non-success status
    Auth {
        status: StatusCode,
        body: String,
    },
    /// Any other endpoint answered with a non-success status
    Request {
        status: StatusCode,
        url: String,
        body: String,
    },
    /// The response body did not match the expected record shape
    Decode(serde_json::Error),
    /// The token endpoint returned an expiry that cannot be represented
    InvalidExpiry(i64),
    Http(reqwest::Error),
    InvalidHeader(InvalidHeaderValue),
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl Error {
    /// HTTP status of a rejected request, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Auth { status, .. } | Error::Request { status, .. } => Some(*status),
            Error::Http(err) => err.status(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Auth { status, body } => {
                write!(f, "Authentication failed ({}): {}", status, body)
            }
            Error::Request { status, url, body } => {
                write!(f, "Request to {} failed ({}): {}", url, status, body)
            }
            Error::Decode(err) => write!(f, "Failed to decode response: {}", err),
            Error::InvalidExpiry(exp) => {
                write!(f, "Token expiry of {} seconds is out of range", exp)
            }
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::InvalidHeader(err) => write!(f, "Invalid header value: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Yaml(err) => write!(f, "YAML parsing error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::Http(err) => Some(err),
            Error::InvalidHeader(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Yaml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(err: InvalidHeaderValue) -> Self {
        Error::InvalidHeader(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = Error::Request {
            status: StatusCode::NOT_FOUND,
            url: "https://api.example.com/v1/sessions/1/".to_string(),
            body: "Not found".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("https://api.example.com/v1/sessions/1/"));
        assert!(message.contains("404"));
        assert!(message.contains("Not found"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_decode_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.status().is_none());
    }
}
