//! Resource abstraction layer
//!
//! Endpoint paths are data-driven: definitions are loaded from embedded JSON,
//! one entry per resource with a gateway path and a Kubernetes path.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Fetches payloads and runs them through the normalizers
//!
//! # Example
//!
//! ```ignore
//! use missionboard::resource::{fetch_list, ResourceKind};
//! use missionboard::normalize::normalize_mission_list;
//!
//! async fn missions(client: &ResourceClient) -> Result<Vec<Mission>, ApiError> {
//!     fetch_list(client, ResourceKind::Missions, normalize_mission_list).await
//! }
//! ```

pub mod fetcher;
pub mod registry;

pub use fetcher::{fetch_list, fetch_nodes, NodeFetch};
pub use registry::*;
