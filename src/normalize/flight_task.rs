//! FlightTask normalization

use super::labels::{format_time, phase_label};
use super::{
    array_at, compose_message, is_k8s_item, lookup, meta_value, normalize_items, text_at, text_of, NULL,
};
use crate::model::{FlightTask, TaskCondition, Tone, NONE_LABEL};
use serde_json::Value;

pub fn normalize_flight_task_list(payload: &Value) -> Vec<FlightTask> {
    normalize_items(payload, "flighttask", is_k8s_item, normalize_flight_task)
}

pub fn normalize_flight_task(item: &Value) -> FlightTask {
    let spec = lookup(item, "spec").unwrap_or(&NULL);
    let status = lookup(item, "status").unwrap_or(&NULL);
    let phase = text_at(status, "phase");

    let weapons: Vec<String> = array_at(spec, "weaponLoadout")
        .iter()
        .filter_map(|load| text_at(load, "weaponRef.name"))
        .collect();

    FlightTask {
        name: text_at(item, "metadata.name").unwrap_or_else(|| NONE_LABEL.to_string()),
        stage: text_at(spec, "stageRef.name")
            .or_else(|| meta_value(item, "stage"))
            .or_else(|| meta_value(item, "stageRef"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        mission: meta_value(item, "mission").unwrap_or_else(|| NONE_LABEL.to_string()),
        status: phase_label(phase.as_deref()),
        pod: text_at(status, "podRef.name").unwrap_or_else(|| NONE_LABEL.to_string()),
        node: text_at(status, "schedulingInfo.assignedNode").unwrap_or_else(|| NONE_LABEL.to_string()),
        weapon: weapons.first().cloned().unwrap_or_else(|| NONE_LABEL.to_string()),
        attempts: lookup(status, "schedulingInfo.schedulingAttempts")
            .and_then(|v| v.as_i64())
            .unwrap_or(0),
        scheduled_at: format_time(text_at(status, "schedulingInfo.assignedTime").as_deref()),
        conditions: task_conditions(array_at(status, "conditions")),
        constraints: lookup(spec, "aircraftRequirement")
            .map(task_constraints)
            .unwrap_or_default(),
        pod_status: text_at(status, "executionStatus.currentPhase")
            .unwrap_or_else(|| phase_label(phase.as_deref())),
        sidecars: weapons.iter().map(|name| format!("weapon-{}", name)).collect(),
    }
}

/// Placement constraints in `key:value` shorthand
fn task_constraints(requirement: &Value) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(kind) = text_at(requirement, "type") {
        out.push(format!("type:{}", kind));
    }
    if let Some(hardpoints) = text_at(requirement, "requiredHardpoints") {
        out.push(format!("hardpoint:{}+", hardpoints));
    }
    if let Some(fuel) = text_at(requirement, "minFuelLevel") {
        out.push(format!("fuel>={}%", fuel));
    }
    if let Some(location) = text_at(requirement, "preferredLocation") {
        out.push(format!("zone:{}", location));
    }
    for capability in array_at(requirement, "capabilities").iter().filter_map(text_of) {
        out.push(format!("cap:{}", capability));
    }
    out
}

fn task_conditions(conditions: &[Value]) -> Vec<TaskCondition> {
    conditions
        .iter()
        .map(|condition| {
            let label = text_at(condition, "type").unwrap_or_else(|| NONE_LABEL.to_string());
            let status = text_at(condition, "status").unwrap_or_default().to_lowercase();
            let reason = text_at(condition, "reason").unwrap_or_default();
            let message = text_at(condition, "message").unwrap_or_default();

            TaskCondition {
                tone: condition_tone(&status, &reason, &label),
                detail: compose_message(&reason, &message),
                label,
            }
        })
        .collect()
}

/// True is healthy; False with a failure reason is an error; anything else
/// is still settling
fn condition_tone(status: &str, reason: &str, kind: &str) -> Tone {
    match status {
        "true" => Tone::Ok,
        "false"
            if reason.to_lowercase().contains("fail") || kind.to_lowercase().contains("fail") =>
        {
            Tone::Err
        }
        _ => Tone::Warn,
    }
}
