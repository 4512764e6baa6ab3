//! Node normalization
//!
//! Nodes are joined with two optional side payloads: the metrics API
//! (current usage per node) and the pod list (running pods per node). When
//! either is missing the affected fields degrade instead of failing.

use super::quantity::{parse_cpu_cores, parse_memory_bytes, to_percent};
use super::{has_metadata, list_items, lookup, normalize_items, text_at, text_of, NULL};
use crate::model::{Node, NodeRole, NodeStatus, NONE_LABEL};
use serde_json::Value;
use std::collections::HashMap;

const ROLE_LABELS: &[(&str, NodeRole)] = &[
    ("node-role.kubernetes.io/control-plane", NodeRole::ControlPlane),
    ("node-role.kubernetes.io/master", NodeRole::Master),
    ("node-role.kubernetes.io/worker", NodeRole::Worker),
];

const ZONE_LABELS: &[&str] = &[
    "topology.kubernetes.io/zone",
    "failure-domain.beta.kubernetes.io/zone",
];

/// Usage and pod counts indexed by node name
#[derive(Debug, Default)]
pub struct NodeContext {
    usage: HashMap<String, Value>,
    /// `None` when no pod payload was supplied at all
    running_pods: Option<HashMap<String, u64>>,
}

impl NodeContext {
    pub fn new(metrics: Option<&Value>, pods: Option<&Value>) -> Self {
        let usage = metrics
            .map(|payload| {
                list_items(payload)
                    .iter()
                    .filter_map(|item| {
                        let name = text_at(item, "metadata.name")?;
                        let usage = lookup(item, "usage").cloned().unwrap_or(Value::Null);
                        Some((name, usage))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let running_pods = pods.filter(|p| !p.is_null()).map(|payload| {
            let mut counts: HashMap<String, u64> = HashMap::new();
            for pod in list_items(payload) {
                let Some(node) = text_at(pod, "spec.nodeName") else {
                    continue;
                };
                if text_at(pod, "status.phase").as_deref() != Some("Running") {
                    continue;
                }
                *counts.entry(node).or_default() += 1;
            }
            counts
        });

        Self { usage, running_pods }
    }
}

/// Normalize a nodes payload, joined with optional metrics and pods payloads
pub fn normalize_node_list(payload: &Value, metrics: Option<&Value>, pods: Option<&Value>) -> Vec<Node> {
    let context = NodeContext::new(metrics, pods);
    normalize_items(payload, "node", has_metadata, |item| normalize_node(item, &context))
}

pub fn normalize_node(item: &Value, context: &NodeContext) -> Node {
    let status = lookup(item, "status").unwrap_or(&NULL);
    let name = text_at(item, "metadata.name").unwrap_or_else(|| NONE_LABEL.to_string());

    let resource = |key: &str| {
        text_at(status, &format!("allocatable.{}", key))
            .or_else(|| text_at(status, &format!("capacity.{}", key)))
    };

    let usage = context.usage.get(&name).unwrap_or(&NULL);
    let cpu_used = text_at(usage, "cpu").and_then(|v| parse_cpu_cores(&v));
    let cpu_capacity = resource("cpu").and_then(|v| parse_cpu_cores(&v));
    let memory_used = text_at(usage, "memory").and_then(|v| parse_memory_bytes(&v));
    let memory_capacity = resource("memory").and_then(|v| parse_memory_bytes(&v));

    let pods_capacity = resource("pods").unwrap_or_else(|| NONE_LABEL.to_string());
    let pods_used = match &context.running_pods {
        Some(counts) => counts.get(&name).copied().unwrap_or(0).to_string(),
        None => NONE_LABEL.to_string(),
    };

    Node {
        role: node_role(item),
        status: node_status(lookup(status, "conditions")),
        cpu: to_percent(cpu_used, cpu_capacity),
        memory: to_percent(memory_used, memory_capacity),
        pods: format!("{} / {}", pods_used, pods_capacity),
        zone: ZONE_LABELS
            .iter()
            .find_map(|key| label(item, key))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        name,
    }
}

fn label(item: &Value, key: &str) -> Option<String> {
    let labels = lookup(item, "metadata.labels")?;
    labels.get(key).and_then(text_of)
}

/// First well-known role label present wins; unlabeled nodes are workers
fn node_role(item: &Value) -> NodeRole {
    let Some(labels) = lookup(item, "metadata.labels").and_then(|v| v.as_object()) else {
        return NodeRole::Worker;
    };
    ROLE_LABELS
        .iter()
        .find(|(key, _)| labels.contains_key(*key))
        .map(|(_, role)| *role)
        .unwrap_or(NodeRole::Worker)
}

fn node_status(conditions: Option<&Value>) -> NodeStatus {
    let Some(conditions) = conditions.and_then(|v| v.as_array()) else {
        return NodeStatus::Unknown;
    };
    let ready = conditions
        .iter()
        .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("Ready"));
    match ready {
        None => NodeStatus::Unknown,
        Some(c) if c.get("status").and_then(|s| s.as_str()) == Some("True") => NodeStatus::Ready,
        Some(_) => NodeStatus::NotReady,
    }
}
