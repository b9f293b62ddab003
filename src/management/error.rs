use serde_json::Value;
use thiserror::Error;

/// Failure talking to the Auth0 Management API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid tenant domain {domain}: {message}")]
    InvalidDomain { domain: String, message: String },
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} - {status}, {message}")]
    Status {
        method: String,
        path: String,
        status: u16,
        message: String,
    },
    #[error("{method} {path} returned an unexpected body: {source}")]
    Decode {
        method: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("token exchange with {domain} failed: {message}")]
    Token { domain: String, message: String },
}

impl ApiError {
    /// HTTP status returned by Auth0, when the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull the human readable part out of an Auth0 error body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    json.get("message")
        .or_else(|| json.get("error_description"))
        .or_else(|| json.get("error"))
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
