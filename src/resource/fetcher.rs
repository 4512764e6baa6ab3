//! Resource Fetcher
//!
//! Fetches raw payloads through a [`ResourceClient`] and normalizes them into
//! canonical records.

use super::registry::ResourceKind;
use crate::api::{ApiError, ResourceClient};
use crate::model::Node;
use crate::normalize::normalize_node_list;
use serde_json::Value;

/// Nodes plus any advisory from the auxiliary metrics and pods fetches
#[derive(Debug, Clone, Default)]
pub struct NodeFetch {
    pub nodes: Vec<Node>,
    pub warning: Option<String>,
}

/// Fetch `kind` and normalize the whole payload
pub async fn fetch_list<T>(
    client: &ResourceClient,
    kind: ResourceKind,
    normalize: fn(&Value) -> Vec<T>,
) -> Result<Vec<T>, ApiError> {
    let payload = client.fetch(kind).await?;
    let items = normalize(&payload);
    tracing::debug!("Fetched {} {}", items.len(), kind);
    Ok(items)
}

/// Fetch nodes, then metrics and pods concurrently.
///
/// Only the node fetch can fail. A failed auxiliary fetch degrades the
/// derived columns and is reported through [`NodeFetch::warning`].
pub async fn fetch_nodes(client: &ResourceClient) -> Result<NodeFetch, ApiError> {
    let nodes = client.fetch(ResourceKind::Nodes).await?;

    let (metrics, pods) = futures::join!(
        client.fetch(ResourceKind::NodeMetrics),
        client.fetch(ResourceKind::Pods)
    );

    let mut warnings = Vec::new();
    let metrics = auxiliary(metrics, ResourceKind::NodeMetrics, &mut warnings);
    let pods = auxiliary(pods, ResourceKind::Pods, &mut warnings);

    let nodes = normalize_node_list(&nodes, metrics.as_ref(), pods.as_ref());
    tracing::debug!("Fetched {} nodes", nodes.len());

    Ok(NodeFetch {
        nodes,
        warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
    })
}

fn auxiliary(
    result: Result<Value, ApiError>,
    kind: ResourceKind,
    warnings: &mut Vec<String>,
) -> Option<Value> {
    match result {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!("Auxiliary fetch of {} failed: {}", kind, e);
            warnings.push(format!("{}: {}", kind, e));
            None
        }
    }
}
