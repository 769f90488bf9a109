//! Inbound sensor event model

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One sensor transmission, as persisted in the event log.
///
/// The receipt timestamp is authoritative: the controller stamps it when
/// the payload arrives, replacing anything the sender supplied. Every other
/// payload field passes through untouched, so a new sensor never needs a
/// schema change here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// RFC 3339 receipt time, assigned at ingestion.
    pub timestamp: String,
    /// Remaining payload fields, verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SensorEvent {
    /// Build an event from a decoded payload, stamping the receipt time now.
    pub fn stamp_now(fields: Map<String, Value>) -> Self {
        Self::with_timestamp(Utc::now().to_rfc3339(), fields)
    }

    /// Build an event with an explicit receipt time.
    pub fn with_timestamp(timestamp: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        // A sender-supplied timestamp must not shadow the receipt time.
        fields.remove("timestamp");
        Self {
            timestamp: timestamp.into(),
            fields,
        }
    }

    /// Numeric value of a named metric, if present and numeric.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    /// Whether every named metric is present with a numeric value.
    pub fn has_metrics(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.metric(name).is_some())
    }
}

/// Point-in-time snapshot of the event log, in arrival order.
pub type EventLog = Vec<SensorEvent>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_receipt_time_replaces_sender_timestamp() {
        let fields = payload(json!({
            "timestamp": "1999-01-01T00:00:00Z",
            "water_level": 42.0,
        }));
        let event = SensorEvent::with_timestamp("2026-08-26T12:00:00+00:00", fields);
        assert_eq!(event.timestamp, "2026-08-26T12:00:00+00:00");
        assert!(!event.fields.contains_key("timestamp"));
        assert_eq!(event.metric("water_level"), Some(42.0));
    }

    #[test]
    fn test_metric_rejects_non_numeric() {
        let fields = payload(json!({
            "water_level": "high",
            "rainfall_intensity": 12.5,
        }));
        let event = SensorEvent::stamp_now(fields);
        assert_eq!(event.metric("water_level"), None);
        assert_eq!(event.metric("rainfall_intensity"), Some(12.5));
        assert_eq!(event.metric("absent"), None);
        assert!(!event.has_metrics(&["water_level", "rainfall_intensity"]));
    }

    #[test]
    fn test_serde_preserves_unknown_fields() {
        let fields = payload(json!({
            "water_level": 10.0,
            "battery_pct": 93,
            "station": "ribeira-03",
        }));
        let event = SensorEvent::with_timestamp("2026-08-26T12:00:00+00:00", fields);

        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: SensorEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.fields["station"], json!("ribeira-03"));
        assert_eq!(decoded.fields["battery_pct"], json!(93));
    }
}
