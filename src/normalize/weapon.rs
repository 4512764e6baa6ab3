//! Weapon normalization

use super::labels::phase_label;
use super::{is_k8s_item, lookup, normalize_items, number_at, strings_at, text_at, NULL};
use crate::model::{Weapon, NONE_LABEL};
use serde_json::Value;

pub fn normalize_weapon_list(payload: &Value) -> Vec<Weapon> {
    normalize_items(payload, "weapon", is_k8s_item, normalize_weapon)
}

pub fn normalize_weapon(item: &Value) -> Weapon {
    let spec = lookup(item, "spec").unwrap_or(&NULL);
    let status = lookup(item, "status").unwrap_or(&NULL);

    Weapon {
        name: text_at(spec, "weaponName")
            .or_else(|| text_at(item, "metadata.name"))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        status: phase_label(text_at(status, "phase").as_deref()),
        image: image_label(lookup(spec, "image")),
        version: text_at(spec, "version.current").unwrap_or_else(|| NONE_LABEL.to_string()),
        usage: usage_label(lookup(status, "usage")),
        aircraft: strings_at(spec, "compatibility.aircraftTypes"),
        hardpoints: strings_at(spec, "compatibility.hardpointTypes"),
        resources: resources_label(lookup(spec, "resources")),
    }
}

fn image_label(image: Option<&Value>) -> String {
    let Some(image) = image else {
        return NONE_LABEL.to_string();
    };
    match (text_at(image, "repository"), text_at(image, "tag")) {
        (Some(repository), Some(tag)) => format!("{}:{}", repository, tag),
        (Some(repository), None) => repository,
        _ => NONE_LABEL.to_string(),
    }
}

fn usage_label(usage: Option<&Value>) -> String {
    let Some(usage) = usage else {
        return NONE_LABEL.to_string();
    };
    if let Some(deployed) = number_at(usage, "totalDeployed") {
        return format!("{} deployed", deployed);
    }
    if let Some(fired) = number_at(usage, "totalFired") {
        return format!("{} fired", fired);
    }
    NONE_LABEL.to_string()
}

/// Footprint summary, e.g. `hp 2 · weight 190 · cooling high`
fn resources_label(resources: Option<&Value>) -> String {
    let Some(resources) = resources else {
        return NONE_LABEL.to_string();
    };

    let mut parts = Vec::new();
    for (key, label) in [("hardpoints", "hp"), ("weight", "weight"), ("power", "power")] {
        if let Some(n) = number_at(resources, key) {
            parts.push(format!("{} {}", label, n));
        }
    }
    if let Some(cooling) = text_at(resources, "cooling") {
        parts.push(format!("cooling {}", cooling));
    }

    if parts.is_empty() {
        NONE_LABEL.to_string()
    } else {
        parts.join(" · ")
    }
}
