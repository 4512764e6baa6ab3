//! MissionStage normalization

use super::labels::{phase_label, stage_type_label};
use super::{array_at, is_k8s_item, lookup, meta_value, normalize_items, strings_at, text_at, NULL};
use crate::model::{Stage, StageTaskSummary, NONE_LABEL};
use serde_json::Value;

pub fn normalize_stage_list(payload: &Value) -> Vec<Stage> {
    normalize_items(payload, "stage", is_k8s_item, normalize_stage)
}

pub fn normalize_stage(item: &Value) -> Stage {
    let spec = lookup(item, "spec").unwrap_or(&NULL);
    let status = lookup(item, "status").unwrap_or(&NULL);

    Stage {
        name: text_at(spec, "stageName")
            .or_else(|| meta_value(item, "stage-name"))
            .or_else(|| text_at(item, "metadata.name"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        mission: text_at(spec, "missionRef.name")
            .or_else(|| meta_value(item, "mission"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        index: stage_index(item, spec),
        mode: stage_type_label(text_at(spec, "stageType").as_deref()),
        status: phase_label(text_at(status, "phase").as_deref()),
        timeout: text_at(spec, "config.timeout").unwrap_or_else(|| NONE_LABEL.to_string()),
        depends_on: strings_at(spec, "dependsOn"),
        tasks: stage_tasks(array_at(status, "flightTasksStatus"), array_at(spec, "flightTasks")),
    }
}

/// Non-zero `spec.stageIndex`, else a non-zero numeric `stage-index` label
fn stage_index(item: &Value, spec: &Value) -> Option<i64> {
    let from_spec = lookup(spec, "stageIndex")
        .and_then(|v| v.as_f64())
        .filter(|n| n.is_finite() && *n != 0.0);
    let from_label = || {
        meta_value(item, "stage-index")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite() && *n != 0.0)
    };
    from_spec.or_else(from_label).map(|n| n as i64)
}

/// Live task status when the controller has reported any, else the
/// templates from the spec marked `Pending`
fn stage_tasks(reported: &[Value], templates: &[Value]) -> Vec<StageTaskSummary> {
    if !reported.is_empty() {
        return reported
            .iter()
            .map(|task| StageTaskSummary {
                name: text_at(task, "name").unwrap_or_else(|| NONE_LABEL.to_string()),
                status: phase_label(text_at(task, "phase").as_deref()),
                eta: NONE_LABEL.to_string(),
                node: text_at(task, "aircraftNode").unwrap_or_else(|| NONE_LABEL.to_string()),
            })
            .collect();
    }

    templates
        .iter()
        .map(|task| StageTaskSummary {
            name: text_at(task, "name").unwrap_or_else(|| NONE_LABEL.to_string()),
            status: "Pending".to_string(),
            eta: NONE_LABEL.to_string(),
            node: NONE_LABEL.to_string(),
        })
        .collect()
}
