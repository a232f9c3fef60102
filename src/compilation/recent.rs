//! Streams of the most recent activity in a year's list
//!
//! An activity with heart rate is copied out of the local collection; one
//! without is fetched from the API and reduced to a few named series.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::collection::StreamCollection;
use crate::api::{fetch_streams, StravaClient};
use crate::models::{stream_data, ActivityRef};
use crate::storage;

/// Output field and source stream for the reduced export.
const NO_HR_FIELDS: [(&str, &str); 5] = [
    ("cadence", "cadence"),
    ("HR", "heartrate"),
    ("distance", "distance"),
    ("speed", "velocity_smooth"),
    ("elevation", "altitude"),
];

/// The activity with the latest `start_date`. Items without an ID or a
/// parseable date are skipped; on equal dates the first one wins.
pub fn most_recent_activity(items: &[Value]) -> Result<ActivityRef> {
    let mut latest: Option<ActivityRef> = None;
    for item in items {
        let Some(activity) = ActivityRef::from_value(item) else {
            tracing::warn!("Skipping unexpected item in activity list: {}", item);
            continue;
        };
        let Some(started) = activity.started_at() else {
            tracing::warn!("Skipping activity {} without a valid start_date", activity.id);
            continue;
        };
        let newer = latest
            .as_ref()
            .and_then(ActivityRef::started_at)
            .map_or(true, |best| started > best);
        if newer {
            latest = Some(activity);
        }
    }
    latest.context("No activity with a start_date found")
}

/// Copy the activity's entry from the ID-tagged collection to
/// `<out_dir>/<id>_w_HR.json`.
pub fn export_local_streams(
    activity: &ActivityRef,
    collection_path: &Path,
    out_dir: &Path,
) -> Result<PathBuf> {
    let collection = StreamCollection::load(collection_path);
    let Some(entry) = collection.find(activity.id) else {
        bail!(
            "Activity ID {} not found in local stream dump {}",
            activity.id,
            collection_path.display()
        );
    };

    let out = out_dir.join(format!("{}_w_HR.json", activity.id));
    storage::save_json(&out, entry)?;
    Ok(out)
}

/// Fetch the activity's streams and write `{"<id>": {field: data | null}}`
/// to `<out_dir>/<id>_noHR.json`.
pub async fn export_api_streams(
    client: &StravaClient,
    activity: &ActivityRef,
    out_dir: &Path,
) -> Result<PathBuf> {
    let bundle = Value::Object(fetch_streams(client, activity.id).await?);

    let fields: Map<String, Value> = NO_HR_FIELDS
        .iter()
        .map(|(field, stream)| {
            let data = stream_data(&bundle, stream)
                .cloned()
                .map(Value::Array)
                .unwrap_or(Value::Null);
            (field.to_string(), data)
        })
        .collect();

    let mut out_obj = Map::new();
    out_obj.insert(activity.id.to_string(), Value::Object(fields));

    let out = out_dir.join(format!("{}_noHR.json", activity.id));
    storage::save_json(&out, &out_obj)?;
    Ok(out)
}
