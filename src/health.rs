//! API health tracking and status-bar labels

use crate::api::{ApiError, ResourceClient};
use crate::config::Config;
use crate::model::NONE_LABEL;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Reachability of the configured API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    #[default]
    Unknown,
    Checking,
    Ok,
    Down,
    Disabled,
}

impl ApiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Ok => "ok",
            Self::Down => "down",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMonitor {
    pub status: ApiStatus,
    pub message: String,
    pub last_checked: Option<DateTime<Utc>>,
    refresh_interval_ms: u64,
    detail_poll_interval_ms: u64,
    read_only: bool,
}

impl HealthMonitor {
    pub fn new(config: &Config) -> Self {
        Self {
            refresh_interval_ms: config.refresh_interval,
            detail_poll_interval_ms: config.detail_poll_interval,
            read_only: config.read_only,
            ..Default::default()
        }
    }

    /// Probe the API and record the outcome.
    ///
    /// `status` reads [`ApiStatus::Checking`] only while the ping is in flight.
    /// The exclusive borrow lasts for the whole call, so other readers see the
    /// previous status until the outcome lands.
    pub async fn check(&mut self, client: &ResourceClient) -> ApiStatus {
        self.message.clear();

        if !client.has_base_url() {
            self.status = ApiStatus::Disabled;
            self.message = ApiError::BaseUrlUnset.to_string();
            self.last_checked = Some(Utc::now());
            return self.status;
        }

        self.status = ApiStatus::Checking;
        let result = client.ping().await;
        self.last_checked = Some(Utc::now());

        if result.disabled {
            self.status = ApiStatus::Disabled;
            self.message = result
                .error
                .unwrap_or_else(|| ApiError::BaseUrlUnset.to_string());
        } else if result.ok {
            self.status = ApiStatus::Ok;
        } else {
            self.status = ApiStatus::Down;
            self.message = match (result.error, result.status) {
                (Some(error), _) => error,
                (None, Some(status)) => format!("HTTP {}", status),
                (None, None) => "Unreachable".to_string(),
            };
        }

        tracing::info!("API status: {} {}", self.status, self.message);
        self.status
    }

    pub fn refresh_label(&self) -> String {
        seconds_label(self.refresh_interval_ms)
    }

    pub fn detail_poll_label(&self) -> String {
        seconds_label(self.detail_poll_interval_ms)
    }

    pub fn mode_label(&self) -> &'static str {
        if self.read_only {
            "Read-only"
        } else {
            "Read-write"
        }
    }

    pub fn last_checked_label(&self) -> String {
        self.last_checked
            .map(|at| at.format("%H:%M").to_string())
            .unwrap_or_else(|| NONE_LABEL.to_string())
    }
}

/// Milliseconds rendered as rounded whole seconds, e.g. `10s`
fn seconds_label(ms: u64) -> String {
    format!("{}s", ms.saturating_add(500) / 1000)
}
