//! Resource Registry - Load resource definitions from JSON
//!
//! Endpoint paths for every resource the board reads, per API mode, are
//! embedded from `src/resources/resources.json` at compile time.

use crate::api::ApiMode;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Embedded resource JSON (compiled into the binary)
const RESOURCE_FILE: &str = include_str!("../resources/resources.json");

/// Placeholder substituted with the configured namespace
const NAMESPACE_PLACEHOLDER: &str = "{namespace}";

/// Resources fetched by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Missions,
    Stages,
    FlightTasks,
    Weapons,
    Nodes,
    NodeMetrics,
    Pods,
    Events,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        Self::Missions,
        Self::Stages,
        Self::FlightTasks,
        Self::Weapons,
        Self::Nodes,
        Self::NodeMetrics,
        Self::Pods,
        Self::Events,
    ];

    /// Registry key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Missions => "missions",
            Self::Stages => "stages",
            Self::FlightTasks => "flighttasks",
            Self::Weapons => "weapons",
            Self::Nodes => "nodes",
            Self::NodeMetrics => "node-metrics",
            Self::Pods => "pods",
            Self::Events => "events",
        }
    }

    /// Human-readable name from the registry
    pub fn display_name(&self) -> &'static str {
        get_resource(self.key())
            .map(|def| def.display_name.as_str())
            .unwrap_or(self.key())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub gateway_path: String,
    pub k8s_path: String,
    /// Cluster-scoped kinds leave their path untouched
    #[serde(default)]
    pub namespaced: bool,
}

impl ResourceDef {
    /// Request path for `mode`, with the namespace substituted and escaped
    pub fn path(&self, mode: ApiMode, namespace: &str) -> String {
        match mode {
            ApiMode::Gateway => self.gateway_path.clone(),
            ApiMode::K8s if self.namespaced => self
                .k8s_path
                .replace(NAMESPACE_PLACEHOLDER, &urlencoding::encode(namespace)),
            ApiMode::K8s => self.k8s_path.clone(),
        }
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(RESOURCE_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e))
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(
            !registry.resources.is_empty(),
            "Registry should have resources"
        );
    }

    #[test]
    fn test_every_kind_has_a_definition() {
        for kind in ResourceKind::ALL {
            assert!(get_resource(kind.key()).is_some(), "missing definition for {}", kind);
            assert_eq!(ResourceKind::from_key(kind.key()), Some(kind));
            assert!(!kind.display_name().is_empty());
        }
    }

    #[test]
    fn test_k8s_paths_substitute_namespace() {
        let missions = get_resource("missions").unwrap();
        assert_eq!(
            missions.path(ApiMode::K8s, "ops"),
            "/apis/airforce.airforce.mil/v1alpha1/namespaces/ops/missions"
        );
        assert_eq!(missions.path(ApiMode::Gateway, "ops"), "/api/missions");

        let events = get_resource("events").unwrap();
        assert_eq!(events.path(ApiMode::K8s, "a b"), "/api/v1/namespaces/a%20b/events");
    }

    #[test]
    fn test_cluster_scoped_paths_ignore_namespace() {
        let nodes = get_resource("nodes").unwrap();
        assert!(!nodes.namespaced);
        assert_eq!(nodes.path(ApiMode::K8s, "ops"), "/api/v1/nodes");
        assert_eq!(
            get_resource("node-metrics").unwrap().path(ApiMode::K8s, "ops"),
            "/apis/metrics.k8s.io/v1beta1/nodes"
        );
    }

    #[test]
    fn test_namespaced_flag_matches_placeholder() {
        for (key, def) in &get_registry().resources {
            assert_eq!(
                def.namespaced,
                def.k8s_path.contains(NAMESPACE_PLACEHOLDER),
                "namespaced flag out of step with path for {}",
                key
            );
        }
    }

    #[test]
    fn test_only_namespaced_paths_are_substituted() {
        let def = ResourceDef {
            display_name: "Widgets".to_string(),
            gateway_path: "/api/widgets".to_string(),
            k8s_path: "/apis/example.io/v1/namespaces/{namespace}/widgets".to_string(),
            namespaced: false,
        };
        assert_eq!(def.path(ApiMode::K8s, "ops"), def.k8s_path);

        let def = ResourceDef { namespaced: true, ..def };
        assert_eq!(def.path(ApiMode::K8s, "ops"), "/apis/example.io/v1/namespaces/ops/widgets");
    }
}
