//! Activity streams (`/activities/{id}/streams`)

use anyhow::Result;

use super::client::StravaClient;
use crate::models::StreamBundle;

/// Stream types requested for every activity
pub const STREAM_KEYS: &[&str] = &[
    "time",
    "distance",
    "altitude",
    "velocity_smooth",
    "heartrate",
    "cadence",
    "temp",
    "moving",
    "grade_smooth",
];

/// Fetch all [`STREAM_KEYS`] for one activity, keyed by stream type.
pub async fn fetch_streams(client: &StravaClient, activity_id: i64) -> Result<StreamBundle> {
    let query = [
        ("keys", STREAM_KEYS.join(",")),
        ("key_by_type", "true".to_string()),
    ];
    client
        .get_json(&format!("/activities/{}/streams", activity_id), &query)
        .await
}
