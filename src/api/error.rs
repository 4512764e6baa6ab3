//! API client error types

use thiserror::Error;

/// Failures raised while talking to the mission API.
///
/// Configuration (`BaseUrlUnset`), transport (`InvalidUrl`, `Timeout`,
/// `Transport`) and protocol (`Status`, `Decode`) failures all abort only the
/// resource being fetched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API base not set")]
    BaseUrlUnset,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
