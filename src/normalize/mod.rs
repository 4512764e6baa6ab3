//! Normalization layer
//!
//! Turns raw API payloads into the canonical records in [`crate::model`].
//! A payload is either a Kubernetes list (`{"items": [...]}` of custom
//! resources with `metadata`/`spec`/`status`) or a gateway response that is
//! already flat. The list normalizers look at the first element to tell the
//! two apart and either map every item or pass the gateway records through.
//!
//! # Module Structure
//!
//! - [`quantity`] - CPU/memory quantity parsing and percent math
//! - [`labels`] - label casing, enum labels and timestamp rendering
//! - [`mission`], [`stage`], [`flight_task`], [`weapon`] - custom resources
//! - [`node`], [`event`] - core cluster resources
//!
//! Every accessor here is total: a missing or wrong-typed field reads as
//! absent, never as an error.

pub mod event;
pub mod flight_task;
pub mod labels;
pub mod mission;
pub mod node;
pub mod quantity;
pub mod stage;
pub mod weapon;

pub use event::{normalize_event, normalize_event_list};
pub use flight_task::{normalize_flight_task, normalize_flight_task_list};
pub use mission::{normalize_mission, normalize_mission_list};
pub use node::{normalize_node, normalize_node_list};
pub use stage::{normalize_stage, normalize_stage_list};
pub use weapon::{normalize_weapon, normalize_weapon_list};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Items of a list payload: a bare array or an object carrying `items`.
/// Anything else is an empty list.
pub fn list_items(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("items")
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// A custom resource straight from the Kubernetes API
pub fn is_k8s_item(item: &Value) -> bool {
    lookup(item, "metadata").is_some() && lookup(item, "spec").is_some()
}

/// Built-in kinds (nodes, events) carry no `spec` worth testing for
pub fn has_metadata(item: &Value) -> bool {
    lookup(item, "metadata").is_some()
}

/// Read gateway records that are already in canonical shape.
///
/// Non-object elements cannot be canonical and are dropped. Record fields
/// decode independently, so a bad field only resets that field.
pub(crate) fn passthrough<T: DeserializeOwned + Default>(items: &[Value], kind: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| {
            if !item.is_object() {
                tracing::warn!("Dropping non-object {} record from gateway payload", kind);
                return None;
            }
            match serde_json::from_value(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Malformed {} record from gateway: {}", kind, e);
                    Some(T::default())
                }
            }
        })
        .collect()
}

/// Shared dual-mode dispatch for list normalizers
pub(crate) fn normalize_items<T, F>(
    payload: &Value,
    kind: &str,
    is_raw: fn(&Value) -> bool,
    map: F,
) -> Vec<T>
where
    T: DeserializeOwned + Default,
    F: Fn(&Value) -> T,
{
    let items = list_items(payload);
    let Some(first) = items.first() else {
        return Vec::new();
    };

    if !is_raw(first) {
        tracing::trace!("{} payload is gateway-shaped, passing through", kind);
        return passthrough(items, kind);
    }

    items.iter().map(map).collect()
}

// =============================================================================
// Accessors
// =============================================================================

/// Stand-in for a missing object so nested lookups stay total
pub(crate) static NULL: Value = Value::Null;

/// Walk a dot-separated path. Numeric segments index into arrays.
/// `null` at the end of the path reads as absent.
pub(crate) fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = item;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) if current.is_array() => current.get(idx)?,
            _ => current.get(part)?,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Render a scalar as a label. Empty strings, zero, `false` and
/// non-scalars count as absent.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

pub(crate) fn text_at(item: &Value, path: &str) -> Option<String> {
    lookup(item, path).and_then(text_of)
}

/// A finite JSON number at `path` (strings are not coerced)
pub(crate) fn number_at(item: &Value, path: &str) -> Option<f64> {
    lookup(item, path)
        .and_then(|v| v.as_f64())
        .filter(|f| f.is_finite())
}

pub(crate) fn array_at<'a>(item: &'a Value, path: &str) -> &'a [Value] {
    lookup(item, path)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

/// String elements of an array at `path`
pub(crate) fn strings_at(item: &Value, path: &str) -> Vec<String> {
    array_at(item, path)
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect()
}

/// A label or annotation by exact key (keys may contain dots and slashes)
pub(crate) fn meta_value(item: &Value, key: &str) -> Option<String> {
    let meta = item.get("metadata")?;
    ["labels", "annotations"]
        .iter()
        .find_map(|section| meta.get(*section).and_then(|m| m.get(key)).and_then(text_of))
}

/// `"reason: message"`, or whichever half is present, or the sentinel
pub(crate) fn compose_message(reason: &str, message: &str) -> String {
    match (reason.is_empty(), message.is_empty()) {
        (false, false) => format!("{}: {}", reason, message),
        (true, false) => message.to_string(),
        (false, true) => reason.to_string(),
        (true, true) => crate::model::NONE_LABEL.to_string(),
    }
}
