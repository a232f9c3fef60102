//! Activity summary models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The few summary fields this crate reads; everything else in an
/// activity stays opaque.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActivityRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub sport_type: Option<String>,
    /// ISO 8601 start time, e.g. `2025-06-01T07:12:44Z`
    pub start_date: Option<String>,
    #[serde(default)]
    pub has_heartrate: bool,
}

impl ActivityRef {
    /// Typed view of one activity summary, if it has an integer (or
    /// numeric string) `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Parsed `start_date`, if present and valid RFC 3339.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.start_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// An integer ID, accepting numeric strings as well.
pub fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid activity id: {}", value)))
}

/// Coarse activity classification used in compilation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Run,
    Ride,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Run => "run",
            ActivityKind::Ride => "ride",
        }
    }

    /// Map a Strava `type` / `sport_type` name. Walks count as runs.
    pub fn from_strava_type(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "run" | "walk" => Some(ActivityKind::Run),
            "ride" => Some(ActivityKind::Ride),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_ref_ignores_other_fields() {
        let value = serde_json::json!({
            "id": 16844801853i64,
            "name": "Morning Run",
            "type": "Run",
            "sport_type": "TrailRun",
            "has_heartrate": true
        });
        let activity = ActivityRef::from_value(&value).unwrap();
        assert_eq!(activity.id, 16_844_801_853);
        assert_eq!(activity.activity_type.as_deref(), Some("Run"));
        assert_eq!(activity.sport_type.as_deref(), Some("TrailRun"));
    }

    #[test]
    fn test_activity_ref_string_id_and_hr_fields() {
        let value = serde_json::json!({
            "id": "17",
            "type": "Ride",
            "start_date": "2025-06-01T07:12:44Z",
            "has_heartrate": true
        });
        let activity = ActivityRef::from_value(&value).unwrap();
        assert_eq!(activity.id, 17);
        assert_eq!(activity.activity_type.as_deref(), Some("Ride"));
        assert!(activity.has_heartrate);
        assert_eq!(
            activity.started_at().map(|dt| dt.timestamp()),
            Some(1_748_761_964)
        );
    }

    #[test]
    fn test_activity_ref_defaults() {
        let activity = ActivityRef::from_value(&serde_json::json!({"id": 5})).unwrap();
        assert!(!activity.has_heartrate);
        assert!(activity.started_at().is_none());

        let bad_date = serde_json::json!({"id": 5, "start_date": "yesterday"});
        assert!(ActivityRef::from_value(&bad_date).unwrap().started_at().is_none());
    }

    #[test]
    fn test_activity_ref_requires_id() {
        assert!(ActivityRef::from_value(&serde_json::json!({"type": "Run"})).is_none());
        assert!(ActivityRef::from_value(&serde_json::json!({"id": "abc"})).is_none());
        assert!(ActivityRef::from_value(&serde_json::json!({"id": null})).is_none());
    }

    #[test]
    fn test_kind_from_strava_type() {
        assert_eq!(ActivityKind::from_strava_type("Run"), Some(ActivityKind::Run));
        assert_eq!(ActivityKind::from_strava_type("Walk"), Some(ActivityKind::Run));
        assert_eq!(ActivityKind::from_strava_type("RIDE"), Some(ActivityKind::Ride));
        assert_eq!(ActivityKind::from_strava_type("VirtualRide"), None);
        assert_eq!(ActivityKind::from_strava_type("Swim"), None);
    }
}
