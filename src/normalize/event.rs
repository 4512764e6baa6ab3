//! Cluster event normalization

use super::labels::format_time;
use super::{compose_message, has_metadata, normalize_items, text_at};
use crate::model::{Event, Tone, NONE_LABEL};
use serde_json::Value;

/// Candidate timestamps, most precise first
const TIME_FIELDS: &[&str] = &[
    "eventTime",
    "lastTimestamp",
    "firstTimestamp",
    "metadata.creationTimestamp",
];

const SCOPE_FIELDS: &[&str] = &["source.component", "reportingController", "metadata.namespace"];

pub fn normalize_event_list(payload: &Value) -> Vec<Event> {
    normalize_items(payload, "event", has_metadata, normalize_event)
}

pub fn normalize_event(item: &Value) -> Event {
    let time = TIME_FIELDS.iter().find_map(|path| text_at(item, path));
    let reason = text_at(item, "reason").unwrap_or_default();
    let kind = text_at(item, "type").unwrap_or_else(|| reason.clone());
    let message = text_at(item, "message")
        .or_else(|| text_at(item, "note"))
        .unwrap_or_default();

    Event {
        time: format_time(time.as_deref()),
        scope: SCOPE_FIELDS
            .iter()
            .find_map(|path| text_at(item, path))
            .unwrap_or_else(|| NONE_LABEL.to_string()),
        level: event_tone(&kind, &reason),
        message: compose_message(&reason, &message),
    }
}

/// The event type decides when it is one of the three known values;
/// otherwise a reason mentioning a failure is an error.
pub fn event_tone(kind: &str, reason: &str) -> Tone {
    match kind.to_lowercase().as_str() {
        "normal" => Tone::Ok,
        "warning" => Tone::Warn,
        "error" => Tone::Err,
        _ if reason.to_lowercase().contains("fail") => Tone::Err,
        _ => Tone::Muted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_tone_chain() {
        assert_eq!(event_tone("Warning", "FailedScheduling"), Tone::Warn);
        assert_eq!(event_tone("Normal", "Failed"), Tone::Ok);
        assert_eq!(event_tone("ERROR", ""), Tone::Err);
        assert_eq!(event_tone("", "FailedScheduling"), Tone::Err);
        assert_eq!(event_tone("Info", "Started"), Tone::Muted);
        assert_eq!(event_tone("", ""), Tone::Muted);
    }

    #[test]
    fn test_reason_stands_in_for_missing_type() {
        let event = normalize_event(&json!({
            "metadata": {"namespace": "missions"},
            "reason": "FailedScheduling",
            "message": "0/3 nodes available"
        }));
        assert_eq!(event.level, Tone::Err);
        assert_eq!(event.message, "FailedScheduling: 0/3 nodes available");
        assert_eq!(event.scope, "missions");
        assert_eq!(event.time, "--");
    }

    #[test]
    fn test_time_and_scope_fallbacks() {
        let event = normalize_event(&json!({
            "metadata": {"namespace": "default", "creationTimestamp": "2026-03-01T06:00:00Z"},
            "lastTimestamp": "2026-03-01T07:55:00Z",
            "reportingController": "flighttask-controller",
            "type": "Normal",
            "note": "weapon injected"
        }));
        assert_eq!(event.time, "07:55");
        assert_eq!(event.scope, "flighttask-controller");
        assert_eq!(event.level, Tone::Ok);
        assert_eq!(event.message, "weapon injected");
    }

    #[test]
    fn test_event_time_preferred() {
        let event = normalize_event(&json!({
            "metadata": {},
            "eventTime": "2026-03-01T08:21:00.000000Z",
            "lastTimestamp": "2026-03-01T07:00:00Z",
            "source": {"component": "scheduler"}
        }));
        assert_eq!(event.time, "08:21");
        assert_eq!(event.scope, "scheduler");
        assert_eq!(event.message, "--");
        assert_eq!(event.level, Tone::Muted);
    }

    #[test]
    fn test_gateway_events_pass_through() {
        let payload = json!([{"time": "08:21", "scope": "scheduler", "level": "warn", "message": "x"}]);
        let events = normalize_event_list(&payload);
        assert_eq!(events[0].level, Tone::Warn);
        assert_eq!(events[0].time, "08:21");
    }

    #[test]
    fn test_gateway_null_field_keeps_record() {
        let payload = json!([{"time": null, "scope": "scheduler", "level": "loud", "message": "x"}]);
        let events = normalize_event_list(&payload);
        assert_eq!(events[0].time, "--");
        assert_eq!(events[0].scope, "scheduler");
        assert_eq!(events[0].level, Tone::Muted);
        assert_eq!(events[0].message, "x");
    }
}
