//! Canonical Records
//!
//! View-ready shapes for every resource kind. These are what the store holds
//! and what a gateway returns already flattened, so they serialize with the
//! gateway's camelCase field names. Every missing field deserializes to the
//! `"--"` sentinel (or an empty list) so a partial gateway record never
//! leaves a hole in the view. Fields are decoded one at a time: a null or
//! wrongly typed value falls back to that field's default and the rest of
//! the record is kept.

use serde::{Deserialize, Serialize};

/// Placeholder for any label whose source data is absent
pub const NONE_LABEL: &str = "--";

fn none_label() -> String {
    NONE_LABEL.to_string()
}

fn unknown_pod_counts() -> String {
    format!("{NONE_LABEL} / {NONE_LABEL}")
}

/// Four-valued severity used to style events and conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ok,
    Warn,
    Err,
    #[default]
    Muted,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Err => "err",
            Self::Muted => "muted",
        }
    }
}

/// Cluster role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    ControlPlane,
    Master,
    #[default]
    Worker,
}

/// Readiness as reported by the node's `Ready` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeStatus {
    Ready,
    NotReady,
    #[default]
    Unknown,
}

// =============================================================================
// Mission
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mission {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::label")]
    pub mission_type: String,
    #[serde(deserialize_with = "lenient::label")]
    pub priority: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::label")]
    pub commander: String,
    #[serde(deserialize_with = "lenient::label")]
    pub region: String,
    #[serde(deserialize_with = "lenient::label")]
    pub updated: String,
    #[serde(deserialize_with = "lenient::label")]
    pub objective: String,
    #[serde(deserialize_with = "lenient::label")]
    pub failure_policy: String,
    #[serde(deserialize_with = "lenient::count")]
    pub tasks: u64,
    #[serde(deserialize_with = "lenient::list")]
    pub stages: Vec<MissionStageSummary>,
}

impl Default for Mission {
    fn default() -> Self {
        Self {
            name: none_label(),
            mission_type: none_label(),
            priority: none_label(),
            status: none_label(),
            commander: none_label(),
            region: none_label(),
            updated: none_label(),
            objective: none_label(),
            failure_policy: none_label(),
            tasks: 0,
            stages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissionStageSummary {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::label")]
    pub mode: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::count")]
    pub tasks: u64,
    #[serde(deserialize_with = "lenient::list")]
    pub depends_on: Vec<String>,
}

impl Default for MissionStageSummary {
    fn default() -> Self {
        Self {
            name: none_label(),
            mode: none_label(),
            status: none_label(),
            tasks: 0,
            depends_on: Vec::new(),
        }
    }
}

// =============================================================================
// Stage
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stage {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::label")]
    pub mission: String,
    /// Position within the mission; rendered as `"--"` when unknown
    #[serde(with = "sentinel_number")]
    pub index: Option<i64>,
    #[serde(deserialize_with = "lenient::label")]
    pub mode: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::label")]
    pub timeout: String,
    #[serde(deserialize_with = "lenient::list")]
    pub depends_on: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub tasks: Vec<StageTaskSummary>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            name: none_label(),
            mission: none_label(),
            index: None,
            mode: none_label(),
            status: none_label(),
            timeout: none_label(),
            depends_on: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTaskSummary {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::label")]
    pub eta: String,
    #[serde(deserialize_with = "lenient::label")]
    pub node: String,
}

impl Default for StageTaskSummary {
    fn default() -> Self {
        Self {
            name: none_label(),
            status: none_label(),
            eta: none_label(),
            node: none_label(),
        }
    }
}

// =============================================================================
// FlightTask
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightTask {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::label")]
    pub stage: String,
    #[serde(deserialize_with = "lenient::label")]
    pub mission: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::label")]
    pub pod: String,
    #[serde(deserialize_with = "lenient::label")]
    pub node: String,
    #[serde(deserialize_with = "lenient::label")]
    pub weapon: String,
    #[serde(deserialize_with = "lenient::count")]
    pub attempts: i64,
    #[serde(deserialize_with = "lenient::label")]
    pub scheduled_at: String,
    #[serde(deserialize_with = "lenient::list")]
    pub conditions: Vec<TaskCondition>,
    #[serde(deserialize_with = "lenient::list")]
    pub constraints: Vec<String>,
    #[serde(deserialize_with = "lenient::label")]
    pub pod_status: String,
    #[serde(deserialize_with = "lenient::list")]
    pub sidecars: Vec<String>,
}

impl Default for FlightTask {
    fn default() -> Self {
        Self {
            name: none_label(),
            stage: none_label(),
            mission: none_label(),
            status: none_label(),
            pod: none_label(),
            node: none_label(),
            weapon: none_label(),
            attempts: 0,
            scheduled_at: none_label(),
            conditions: Vec::new(),
            constraints: Vec::new(),
            pod_status: none_label(),
            sidecars: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskCondition {
    #[serde(deserialize_with = "lenient::label")]
    pub label: String,
    #[serde(deserialize_with = "lenient::condition_tone")]
    pub tone: Tone,
    #[serde(deserialize_with = "lenient::label")]
    pub detail: String,
}

impl Default for TaskCondition {
    fn default() -> Self {
        Self {
            label: none_label(),
            tone: Tone::Warn,
            detail: none_label(),
        }
    }
}

// =============================================================================
// Weapon
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::label")]
    pub status: String,
    #[serde(deserialize_with = "lenient::label")]
    pub image: String,
    #[serde(deserialize_with = "lenient::label")]
    pub version: String,
    #[serde(deserialize_with = "lenient::label")]
    pub usage: String,
    #[serde(deserialize_with = "lenient::list")]
    pub aircraft: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub hardpoints: Vec<String>,
    #[serde(deserialize_with = "lenient::label")]
    pub resources: String,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            name: none_label(),
            status: none_label(),
            image: none_label(),
            version: none_label(),
            usage: none_label(),
            aircraft: Vec::new(),
            hardpoints: Vec::new(),
            resources: none_label(),
        }
    }
}

// =============================================================================
// Cluster
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub role: NodeRole,
    #[serde(deserialize_with = "lenient::or_default")]
    pub status: NodeStatus,
    /// CPU utilization percent, 0..=100
    #[serde(deserialize_with = "lenient::percent")]
    pub cpu: u8,
    /// Memory utilization percent, 0..=100
    #[serde(deserialize_with = "lenient::percent")]
    pub memory: u8,
    /// `"<running> / <capacity>"`
    #[serde(deserialize_with = "lenient::pod_counts")]
    pub pods: String,
    #[serde(deserialize_with = "lenient::label")]
    pub zone: String,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: none_label(),
            role: NodeRole::Worker,
            status: NodeStatus::Unknown,
            cpu: 0,
            memory: 0,
            pods: unknown_pod_counts(),
            zone: none_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient::label")]
    pub time: String,
    #[serde(deserialize_with = "lenient::label")]
    pub scope: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub level: Tone,
    #[serde(deserialize_with = "lenient::label")]
    pub message: String,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            time: none_label(),
            scope: none_label(),
            level: Tone::Muted,
            message: none_label(),
        }
    }
}

/// Per-field decoders for gateway records.
///
/// None of these fail on a well-formed JSON value; a value of the wrong
/// shape decodes to the field's default instead.
mod lenient {
    use super::{none_label, unknown_pod_counts, Tone};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_number(value: &Value) -> Option<f64> {
        let n: Option<f64> = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    /// Strings as-is, scalars stringified, everything else `"--"`
    pub fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => none_label(),
        })
    }

    pub fn pod_counts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => s,
            _ => unknown_pod_counts(),
        })
    }

    /// Integer counts; fractions are rounded and out-of-range values read as the default
    pub fn count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64> + Default,
    {
        let value = Value::deserialize(deserializer)?;
        let n = match &value {
            Value::Number(n) => n.as_i64().or_else(|| as_number(&value).map(|f| f.round() as i64)),
            _ => as_number(&value).map(|f| f.round() as i64),
        };
        Ok(n.and_then(|n| T::try_from(n).ok()).unwrap_or_default())
    }

    /// Utilization percent, rounded and clamped to 0..=100
    pub fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value)
            .map(|n| n.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0))
    }

    /// Arrays keep the elements that decode; anything else is an empty list
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn condition_tone<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tone, D::Error> {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or(Tone::Warn))
    }
}

/// Serde adapter for an optional integer that renders as `"--"` when absent.
///
/// Accepts a JSON number or a numeric string on input; anything else reads
/// back as `None`.
mod sentinel_number {
    use super::NONE_LABEL;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_i64(*n),
            None => serializer.serialize_str(NONE_LABEL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}
