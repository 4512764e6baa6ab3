//! Mission normalization

use super::labels::{format_time, mission_type_label, phase_label, priority_label, stage_type_label, title_case};
use super::{array_at, is_k8s_item, lookup, meta_value, normalize_items, strings_at, NULL, text_at, text_of};
use crate::model::{Mission, MissionStageSummary, NONE_LABEL};
use serde_json::Value;
use std::collections::HashMap;

/// Normalize a missions payload (Kubernetes list or gateway records)
pub fn normalize_mission_list(payload: &Value) -> Vec<Mission> {
    normalize_items(payload, "mission", is_k8s_item, normalize_mission)
}

/// Map one `Mission` custom resource to its canonical record
pub fn normalize_mission(item: &Value) -> Mission {
    let spec = lookup(item, "spec").unwrap_or(&NULL);
    let status = lookup(item, "status").unwrap_or(&NULL);

    Mission {
        name: text_at(spec, "missionName")
            .or_else(|| text_at(item, "metadata.name"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        mission_type: mission_type_label(text_at(spec, "missionType").as_deref()),
        priority: priority_label(text_at(spec, "priority").as_deref()),
        status: phase_label(text_at(status, "phase").as_deref()),
        commander: meta_value(item, "commander")
            .or_else(|| meta_value(item, "mission.airforce.mil/commander"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        region: text_at(spec, "objective.targetArea")
            .or_else(|| meta_value(item, "region"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        updated: format_time(
            text_at(status, "lastUpdateTime")
                .or_else(|| text_at(item, "metadata.creationTimestamp"))
                .as_deref(),
        ),
        objective: objective_label(lookup(spec, "objective")),
        failure_policy: title_case(text_at(spec, "config.failurePolicy.stageFailureAction").as_deref()),
        tasks: total_tasks(spec, status),
        stages: stage_summaries(spec, status),
    }
}

/// Reported total, else the sum over the stage templates
fn total_tasks(spec: &Value, status: &Value) -> u64 {
    if let Some(total) = lookup(status, "statistics.totalFlightTasks").and_then(|v| v.as_u64()) {
        return total;
    }
    array_at(spec, "stages")
        .iter()
        .map(|stage| array_at(stage, "flightTasks").len() as u64)
        .sum()
}

fn objective_label(objective: Option<&Value>) -> String {
    let Some(objective) = objective else {
        return NONE_LABEL.to_string();
    };

    if let Some(description) = text_at(objective, "targetDescription") {
        return description;
    }
    if let Some(area) = text_at(objective, "targetArea") {
        return area;
    }

    let latitude = text_at(objective, "targetCoordinates.latitude");
    let longitude = text_at(objective, "targetCoordinates.longitude");
    if latitude.is_none() && longitude.is_none() {
        return NONE_LABEL.to_string();
    }
    format!(
        "{}, {}",
        latitude.as_deref().unwrap_or(NONE_LABEL),
        longitude.as_deref().unwrap_or(NONE_LABEL)
    )
}

fn stage_summaries(spec: &Value, status: &Value) -> Vec<MissionStageSummary> {
    let phases: HashMap<String, String> = array_at(status, "stagesSummary")
        .iter()
        .filter_map(|summary| {
            let name = summary.get("name").and_then(text_of)?;
            let phase = summary.get("phase").and_then(text_of)?;
            Some((name, phase))
        })
        .collect();

    array_at(spec, "stages")
        .iter()
        .map(|stage| {
            let key = text_at(stage, "name");
            let phase = key
                .as_ref()
                .and_then(|k| phases.get(k))
                .map(String::as_str)
                .unwrap_or("Pending");

            MissionStageSummary {
                name: text_at(stage, "displayName")
                    .or(key.clone())
                    .unwrap_or_else(|| NONE_LABEL.to_string()),
                mode: stage_type_label(text_at(stage, "type").as_deref()),
                status: phase_label(Some(phase)),
                tasks: array_at(stage, "flightTasks").len() as u64,
                depends_on: strings_at(stage, "dependsOn"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "metadata": {
                "name": "seastrike-02",
                "creationTimestamp": "2026-03-01T06:00:00Z",
                "labels": {"commander": "Col. Reyes"}
            },
            "spec": {
                "missionName": "SeaStrike-02",
                "missionType": "strike",
                "priority": "medium",
                "objective": {"targetArea": "East Sea"},
                "config": {"failurePolicy": {"stageFailureAction": "ABORT"}},
                "stages": [
                    {"name": "recon", "displayName": "Recon", "type": "sequential",
                     "flightTasks": [{"name": "a"}, {"name": "b"}]},
                    {"name": "strike", "type": "parallel", "dependsOn": ["recon"],
                     "flightTasks": [{"name": "c"}]}
                ]
            },
            "status": {
                "phase": "running",
                "lastUpdateTime": "2026-03-01T08:21:07Z",
                "stagesSummary": [{"name": "recon", "phase": "succeeded"}]
            }
        })
    }

    #[test]
    fn test_normalize_mission_fields() {
        let mission = normalize_mission(&sample());
        assert_eq!(mission.name, "SeaStrike-02");
        assert_eq!(mission.mission_type, "Strike");
        assert_eq!(mission.priority, "Normal");
        assert_eq!(mission.status, "Running");
        assert_eq!(mission.commander, "Col. Reyes");
        assert_eq!(mission.region, "East Sea");
        assert_eq!(mission.updated, "08:21");
        assert_eq!(mission.objective, "East Sea");
        assert_eq!(mission.failure_policy, "Abort");
        assert_eq!(mission.tasks, 3);
    }

    #[test]
    fn test_stage_summaries_use_status_phase() {
        let mission = normalize_mission(&sample());
        assert_eq!(mission.stages.len(), 2);
        assert_eq!(mission.stages[0].name, "Recon");
        assert_eq!(mission.stages[0].status, "Succeeded");
        assert_eq!(mission.stages[0].tasks, 2);
        assert_eq!(mission.stages[1].name, "strike");
        assert_eq!(mission.stages[1].status, "Pending");
        assert_eq!(mission.stages[1].mode, "Parallel");
        assert_eq!(mission.stages[1].depends_on, vec!["recon".to_string()]);
    }

    #[test]
    fn test_reported_total_wins_over_template_sum() {
        let mut item = sample();
        item["status"]["statistics"] = json!({"totalFlightTasks": 7});
        assert_eq!(normalize_mission(&item).tasks, 7);
    }

    #[test]
    fn test_objective_fallbacks() {
        assert_eq!(objective_label(None), "--");
        assert_eq!(
            objective_label(Some(&json!({"targetDescription": "Port", "targetArea": "Bay"}))),
            "Port"
        );
        assert_eq!(
            objective_label(Some(&json!({"targetCoordinates": {"latitude": "21.3"}}))),
            "21.3, --"
        );
        assert_eq!(objective_label(Some(&json!({"targetCoordinates": {}}))), "--");
    }

    #[test]
    fn test_bare_resource_defaults() {
        let mission = normalize_mission(&json!({"metadata": {"name": "m"}, "spec": {}}));
        assert_eq!(mission.name, "m");
        assert_eq!(mission.priority, "--");
        assert_eq!(mission.commander, "--");
        assert_eq!(mission.updated, "--");
        assert_eq!(mission.tasks, 0);
        assert!(mission.stages.is_empty());
    }

    #[test]
    fn test_gateway_list_passes_through() {
        let payload = json!([{"name": "Alpha", "type": "ISR", "priority": "High", "tasks": 2}]);
        let missions = normalize_mission_list(&payload);
        assert_eq!(missions.len(), 1);
        assert_eq!(missions[0].name, "Alpha");
        assert_eq!(missions[0].mission_type, "ISR");
        assert_eq!(missions[0].tasks, 2);
        assert_eq!(missions[0].status, "--");
    }

    #[test]
    fn test_gateway_null_field_keeps_record() {
        let payload = json!([{"name": "Alpha", "priority": "High", "commander": null, "tasks": 3}]);
        let missions = normalize_mission_list(&payload);
        assert_eq!(missions[0].name, "Alpha");
        assert_eq!(missions[0].priority, "High");
        assert_eq!(missions[0].commander, "--");
        assert_eq!(missions[0].tasks, 3);
    }
}
