//! missionboard
//!
//! Polls a Kubernetes API server (or the simplified gateway in front of it)
//! for mission orchestration resources and cluster health, and normalizes
//! both payload shapes into flat, display-ready records.

pub mod api;
pub mod config;
pub mod health;
pub mod model;
pub mod normalize;
pub mod resource;
pub mod store;

/// Version injected at compile time via MISSIONBOARD_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("MISSIONBOARD_VERSION") {
    Some(v) => v,
    None => "dev",
};
