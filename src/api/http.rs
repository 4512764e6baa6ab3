//! HTTP utilities for the mission API

use super::error::{ApiError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// A single header applied to every request, e.g. `Authorization: Bearer <token>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub name: String,
    pub value: String,
}

impl AuthHeader {
    /// Build from header name, scheme and token. No token means no header.
    pub fn from_parts(name: &str, scheme: &str, token: &str) -> Option<Self> {
        if token.is_empty() || name.is_empty() {
            return None;
        }
        let value = if scheme.is_empty() {
            token.to_string()
        } else {
            format!("{} {}", scheme, token)
        };
        Some(Self {
            name: name.to_string(),
            value,
        })
    }
}

/// HTTP client wrapper for API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("missionboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET a JSON document, giving up after `timeout`.
    ///
    /// An empty body (e.g. `204`) reads as `null`.
    pub async fn get(&self, url: Url, auth: Option<&AuthHeader>, timeout: Duration) -> Result<Value> {
        tracing::debug!("GET {}", url);
        with_timeout(self.fetch_json(url, auth), timeout).await
    }

    /// GET `url` and report the status code, successful or not
    pub async fn probe(&self, url: Url, timeout: Duration) -> Result<u16> {
        tracing::debug!("PROBE {}", url);
        with_timeout(self.fetch_status(url), timeout).await
    }

    async fn fetch_json(&self, url: Url, auth: Option<&AuthHeader>) -> Result<Value> {
        let mut request = self.client.get(url);
        if let Some(auth) = auth {
            request = request.header(auth.name.as_str(), auth.value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_status(&self, url: Url) -> Result<u16> {
        let response = self.client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Race `request` against a timer. The request future is dropped on expiry.
async fn with_timeout<T>(
    request: impl std::future::Future<Output = Result<T>>,
    timeout: Duration,
) -> Result<T> {
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Request abandoned after {:?}", timeout);
            Err(ApiError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Format an API error for display
/// Security: Sanitizes error messages to avoid leaking API details
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::BaseUrlUnset => "API base not set. Configure --api-base or MISSIONBOARD_API_BASE.".to_string(),
        ApiError::Timeout { .. } => "Request timed out. The API may be overloaded.".to_string(),
        ApiError::Status { status } => match status {
            401 => "Authentication failed. Check the auth token.".to_string(),
            403 => "Permission denied. Check the service account's RBAC rules.".to_string(),
            404 => "Resource not found. Check the API mode and namespace.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "API temporarily unavailable. Please try again.".to_string(),
            other => format!("Request failed with HTTP {}.", other),
        },
        other => {
            let text = other.to_string();
            let sanitized: String = text
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect();
            if sanitized.len() < text.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
