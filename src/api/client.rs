//! Mode-aware resource client

use super::error::{ApiError, Result};
use super::http::{AuthHeader, HttpClient};
use crate::resource::registry::{get_resource, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Liveness endpoint probed by [`ResourceClient::ping`]
pub const HEALTH_PATH: &str = "/healthz";

const DATA_TIMEOUT: Duration = Duration::from_secs(8);
const PING_TIMEOUT: Duration = Duration::from_secs(3);

/// Which API shape the base URL serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Simplified `/api/<resource>` gateway
    #[default]
    Gateway,
    /// Kubernetes API server paths
    K8s,
}

impl ApiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::K8s => "k8s",
        }
    }

    /// Case-insensitive parse; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gateway" => Some(Self::Gateway),
            "k8s" | "kubernetes" => Some(Self::K8s),
            _ => None,
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for a [`ResourceClient`]
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub base_url: String,
    pub mode: ApiMode,
    pub namespace: String,
    pub auth: Option<AuthHeader>,
}

/// Outcome of a liveness probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PingResult {
    pub ok: bool,
    pub disabled: bool,
    pub status: Option<u16>,
    pub error: Option<String>,
}

/// Fetches raw resource payloads for the configured mode and namespace
#[derive(Clone)]
pub struct ResourceClient {
    http: HttpClient,
    config: ApiConfig,
    data_timeout: Duration,
    ping_timeout: Duration,
}

impl ResourceClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            config,
            data_timeout: DATA_TIMEOUT,
            ping_timeout: PING_TIMEOUT,
        })
    }

    /// Override the data and ping timeouts
    pub fn with_timeouts(mut self, data: Duration, ping: Duration) -> Self {
        self.data_timeout = data;
        self.ping_timeout = ping;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn has_base_url(&self) -> bool {
        !self.config.base_url.trim().is_empty()
    }

    /// Resolve `path` against the base URL. An absolute path replaces any
    /// path component of the base.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.trim();
        if base.is_empty() {
            return Err(ApiError::BaseUrlUnset);
        }
        let base = Url::parse(base)?;
        Ok(base.join(path)?)
    }

    /// Request path for `kind` in the configured mode
    pub fn path_for(&self, kind: ResourceKind) -> Result<String> {
        let def = get_resource(kind.key())
            .ok_or_else(|| ApiError::UnknownResource(kind.key().to_string()))?;
        Ok(def.path(self.config.mode, &self.config.namespace))
    }

    /// GET the raw payload for `kind`
    pub async fn fetch(&self, kind: ResourceKind) -> Result<Value> {
        let path = self.path_for(kind)?;
        self.get_path(&path).await
    }

    /// GET an arbitrary path under the base URL
    pub async fn get_path(&self, path: &str) -> Result<Value> {
        let url = self.resolve(path)?;
        self.http
            .get(url, self.config.auth.as_ref(), self.data_timeout)
            .await
    }

    /// Probe the health endpoint. Never fails; problems are captured in the result.
    pub async fn ping(&self) -> PingResult {
        let url = match self.resolve(HEALTH_PATH) {
            Ok(url) => url,
            Err(_) => {
                return PingResult {
                    disabled: true,
                    error: Some(ApiError::BaseUrlUnset.to_string()),
                    ..Default::default()
                }
            }
        };

        match self.http.probe(url, self.ping_timeout).await {
            Ok(status) => PingResult {
                ok: (200..300).contains(&status),
                status: Some(status),
                ..Default::default()
            },
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                PingResult {
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}
