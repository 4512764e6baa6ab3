//! Configuration Management
//!
//! Layered configuration for missionboard: built-in defaults, then
//! `MISSIONBOARD_*` environment variables, then the saved config file, then
//! CLI flags.

use crate::api::{ApiConfig, ApiMode, AuthHeader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `MISSIONBOARD_API_BASE`
const ENV_PREFIX: &str = "MISSIONBOARD_";

const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10_000;
const DEFAULT_DETAIL_POLL_INTERVAL_MS: u64 = 5_000;

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_base: String,
    /// `gateway` unless a layer says otherwise; `MISSIONBOARD_API_MODE=k8s`
    /// points the board straight at a Kubernetes API server
    pub api_mode: ApiMode,
    pub namespace: String,
    pub auth_header: String,
    pub auth_scheme: String,
    pub auth_token: String,
    /// Store polling interval in milliseconds
    pub refresh_interval: u64,
    /// Detail view polling interval in milliseconds
    pub detail_poll_interval: u64,
    pub read_only: bool,
    pub verbose_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_mode: ApiMode::default(),
            namespace: "default".to_string(),
            auth_header: "Authorization".to_string(),
            auth_scheme: "Bearer".to_string(),
            auth_token: String::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
            detail_poll_interval: DEFAULT_DETAIL_POLL_INTERVAL_MS,
            read_only: false,
            verbose_events: false,
        }
    }
}

/// One source of overrides. `None` leaves the lower layer's value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub api_base: Option<String>,
    pub api_mode: Option<ApiMode>,
    pub namespace: Option<String>,
    pub auth_header: Option<String>,
    pub auth_scheme: Option<String>,
    pub auth_token: Option<String>,
    pub refresh_interval: Option<u64>,
    pub detail_poll_interval: Option<u64>,
    pub read_only: Option<bool>,
    pub verbose_events: Option<bool>,
}

impl ConfigLayer {
    /// Read a layer from a JSON object whose keys are UPPER_SNAKE or camelCase.
    /// Anything other than an object is an empty layer.
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self::collect(|upper, camel| {
            [map.get(upper), map.get(camel)]
                .into_iter()
                .flatten()
                .cloned()
                .collect()
        })
    }

    /// Read `MISSIONBOARD_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read `MISSIONBOARD_*` variables through `lookup`
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::collect(|upper, _| {
            lookup(&format!("{}{}", ENV_PREFIX, upper))
                .map(Value::String)
                .into_iter()
                .collect()
        })
    }

    /// Read a saved config file. Missing, unreadable or invalid files are empty.
    pub fn read_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<Value>(&content)?));
        match parsed {
            Ok(value) => Self::from_json(&value),
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// `candidates(UPPER_SNAKE, camelCase)` yields the raw values for a field in
    /// priority order; the first one that parses wins.
    fn collect(candidates: impl Fn(&str, &str) -> Vec<Value>) -> Self {
        fn first<T>(values: Vec<Value>, parse: fn(&Value) -> Option<T>) -> Option<T> {
            values.iter().find_map(parse)
        }

        Self {
            api_base: first(candidates("API_BASE", "apiBase"), text),
            api_mode: first(candidates("API_MODE", "apiMode"), mode),
            namespace: first(candidates("NAMESPACE", "namespace"), text),
            auth_header: first(candidates("AUTH_HEADER", "authHeader"), text),
            auth_scheme: first(candidates("AUTH_SCHEME", "authScheme"), text),
            auth_token: first(candidates("AUTH_TOKEN", "authToken"), text),
            refresh_interval: first(candidates("REFRESH_INTERVAL", "refreshInterval"), interval),
            detail_poll_interval: first(
                candidates("DETAIL_POLL_INTERVAL", "detailPollInterval"),
                interval,
            ),
            read_only: first(candidates("READ_ONLY", "readOnly"), flag),
            verbose_events: first(candidates("VERBOSE_EVENTS", "verboseEvents"), flag),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn mode(value: &Value) -> Option<ApiMode> {
    value.as_str().and_then(ApiMode::parse)
}

/// Positive milliseconds from a number or numeric string
fn interval(value: &Value) -> Option<u64> {
    let ms = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (ms.is_finite() && ms >= 1.0).then(|| ms.round() as u64)
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("missionboard").join("config.json"))
    }

    /// Defaults, then environment, then the saved file
    pub fn load() -> Self {
        let stored = Self::config_path()
            .map(|path| ConfigLayer::read_file(&path))
            .unwrap_or_default();
        Self::default()
            .merge(ConfigLayer::from_env())
            .merge(stored)
    }

    /// Apply every `Some` field of `layer`
    pub fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(v) = layer.api_base {
            self.api_base = v;
        }
        if let Some(v) = layer.api_mode {
            self.api_mode = v;
        }
        if let Some(v) = layer.namespace {
            self.namespace = v;
        }
        if let Some(v) = layer.auth_header {
            self.auth_header = v;
        }
        if let Some(v) = layer.auth_scheme {
            self.auth_scheme = v;
        }
        if let Some(v) = layer.auth_token {
            self.auth_token = v;
        }
        if let Some(v) = layer.refresh_interval {
            self.refresh_interval = v;
        }
        if let Some(v) = layer.detail_poll_interval {
            self.detail_poll_interval = v;
        }
        if let Some(v) = layer.read_only {
            self.read_only = v;
        }
        if let Some(v) = layer.verbose_events {
            self.verbose_events = v;
        }
        self
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Saved config to {}", path.display());

        Ok(())
    }

    /// Client settings derived from this configuration
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base.clone(),
            mode: self.api_mode,
            namespace: self.namespace.clone(),
            auth: AuthHeader::from_parts(&self.auth_header, &self.auth_scheme, &self.auth_token),
        }
    }

    pub fn refresh_duration(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}
