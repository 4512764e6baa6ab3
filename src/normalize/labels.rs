//! Display labels for enum-ish fields and timestamps

use crate::model::NONE_LABEL;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Lowercase everything, then capitalize the first character
pub fn title_case(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return NONE_LABEL.to_string();
    };
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => NONE_LABEL.to_string(),
    }
}

pub fn mission_type_label(value: Option<&str>) -> String {
    match value.map(str::to_lowercase).as_deref() {
        Some("isr") => "ISR".to_string(),
        Some(other) => title_case(Some(other)),
        None => NONE_LABEL.to_string(),
    }
}

/// `medium` reads as `Normal` on the board
pub fn priority_label(value: Option<&str>) -> String {
    match value.map(str::to_lowercase).as_deref() {
        Some("medium") => "Normal".to_string(),
        Some("critical") => "Critical".to_string(),
        Some(other) => title_case(Some(other)),
        None => NONE_LABEL.to_string(),
    }
}

pub fn stage_type_label(value: Option<&str>) -> String {
    title_case(value)
}

pub fn phase_label(value: Option<&str>) -> String {
    title_case(value)
}

/// Parse the timestamp shapes the API hands out
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `HH:MM` in UTC, or the sentinel when the value is missing or unparsable
pub fn format_time(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| NONE_LABEL.to_string())
}
