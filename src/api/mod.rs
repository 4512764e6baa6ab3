//! Mission API interaction module
//!
//! Talks to either the simplified gateway or a Kubernetes API server,
//! depending on [`ApiMode`].
//!
//! # Module Structure
//!
//! - [`client`] - Mode-aware resource client and liveness probe
//! - [`error`] - Typed failures for configuration, transport and protocol errors
//! - [`http`] - HTTP utilities: timed GETs, auth header, error formatting
//!
//! # Example
//!
//! ```ignore
//! use missionboard::api::{ApiConfig, ApiMode, ResourceClient};
//! use missionboard::resource::ResourceKind;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ResourceClient::new(ApiConfig {
//!         base_url: "http://gateway.local:8080".into(),
//!         mode: ApiMode::Gateway,
//!         namespace: "default".into(),
//!         auth: None,
//!     })?;
//!     let missions = client.fetch(ResourceKind::Missions).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;

pub use client::{ApiConfig, ApiMode, PingResult, ResourceClient, HEALTH_PATH};
pub use error::ApiError;
pub use http::{format_api_error, AuthHeader};
