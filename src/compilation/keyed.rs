//! Stream compilation keyed by `"<kind>_<id>"`

use anyhow::{bail, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::ids::{activity_ids, dedup_ids};
use crate::api::{fetch_streams, StravaClient};
use crate::models::{numeric_samples, ActivityKind, ActivityRef};
use crate::storage;

/// Max `velocity_smooth` in m/s above which an untyped activity counts as a ride.
const RIDE_SPEED_THRESHOLD: f64 = 7.0;

/// All compiled stream bundles, keyed `"run_<id>"` / `"ride_<id>"`.
#[derive(Debug, Default)]
pub struct StreamCompilation {
    entries: Map<String, Value>,
}

/// Outcome of one [`compile_streams`] run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CompileSummary {
    pub fetched: usize,
    pub failed: usize,
    pub total: usize,
}

impl StreamCompilation {
    /// Load from disk. A missing file is an empty compilation; malformed
    /// JSON is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match storage::load_json_if_exists::<Value>(path)? {
            None => Ok(Self::default()),
            Some(Value::Object(entries)) => Ok(Self { entries }),
            Some(_) => bail!("Expected a JSON object in {}", path.display()),
        }
    }

    /// Write with keys in sorted order.
    pub fn save(&self, path: &Path) -> Result<()> {
        storage::save_json(path, &self.entries)
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Activity IDs already present, read from the part after the first `_`.
    pub fn existing_ids(&self) -> HashSet<i64> {
        self.entries
            .keys()
            .filter_map(|key| key.split('_').nth(1)?.parse().ok())
            .collect()
    }

    /// IDs not yet compiled, in input order without repeats.
    pub fn missing_ids(&self, ids: &[i64]) -> Vec<i64> {
        let existing = self.existing_ids();
        dedup_ids(ids)
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect()
    }

    pub fn insert(&mut self, kind: ActivityKind, id: i64, bundle: Value) {
        self.entries.insert(format!("{}_{}", kind, id), bundle);
    }
}

/// Classify an activity: the summary's `type`, then `sport_type`, then the
/// speed heuristic on its streams.
pub fn activity_kind(bundle: &Value, summary: Option<&ActivityRef>) -> ActivityKind {
    if let Some(summary) = summary {
        let named = [&summary.activity_type, &summary.sport_type]
            .into_iter()
            .flatten()
            .find_map(|name| ActivityKind::from_strava_type(name));
        if let Some(kind) = named {
            return kind;
        }
    }

    let max_speed = numeric_samples(bundle, "velocity_smooth")
        .map(|speeds| speeds.into_iter().fold(0.0, f64::max))
        .unwrap_or(0.0);
    if max_speed > RIDE_SPEED_THRESHOLD {
        ActivityKind::Ride
    } else {
        ActivityKind::Run
    }
}

/// Fetch streams for every activity in `activities_path` that is not yet in
/// the compilation at `compilation_path`, then save the compilation.
///
/// A failed fetch is logged and skipped; the rest of the batch continues.
pub async fn compile_streams(
    client: &StravaClient,
    activities_path: &Path,
    compilation_path: &Path,
) -> Result<CompileSummary> {
    let activities: Value = storage::load_json(activities_path)?;
    let Value::Array(items) = activities else {
        bail!("Expected a JSON array in {}", activities_path.display());
    };

    let summaries: HashMap<i64, ActivityRef> = items
        .iter()
        .filter_map(ActivityRef::from_value)
        .map(|a| (a.id, a))
        .collect();

    let mut compilation = StreamCompilation::load(compilation_path)?;
    let missing = compilation.missing_ids(&activity_ids(&items));
    if missing.is_empty() {
        println!("All activities are already in the compilation file.");
        return Ok(CompileSummary {
            total: compilation.len(),
            ..CompileSummary::default()
        });
    }

    println!("{} activities missing, fetching streams...", missing.len());

    let mut summary = CompileSummary::default();
    for id in missing {
        let bundle = match fetch_streams(client, id).await {
            Ok(bundle) => Value::Object(bundle),
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", id, e);
                summary.failed += 1;
                continue;
            }
        };

        let kind = activity_kind(&bundle, summaries.get(&id));
        compilation.insert(kind, id, bundle);
        summary.fetched += 1;
        println!("Stored {} streams for activity {}", kind, id);
    }

    compilation.save(compilation_path)?;
    summary.total = compilation.len();
    println!("Saved updated compilation to {}", compilation_path.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary(activity_type: Option<&str>, sport_type: Option<&str>) -> ActivityRef {
        ActivityRef {
            id: 1,
            activity_type: activity_type.map(String::from),
            sport_type: sport_type.map(String::from),
            ..ActivityRef::default()
        }
    }

    #[test]
    fn test_kind_prefers_type_then_sport_type() {
        let fast = serde_json::json!({"velocity_smooth": {"data": [12.0]}});
        assert_eq!(
            activity_kind(&fast, Some(&summary(Some("Run"), Some("Ride")))),
            ActivityKind::Run
        );
        assert_eq!(
            activity_kind(&fast, Some(&summary(Some("Workout"), Some("Walk")))),
            ActivityKind::Run
        );
    }

    #[test]
    fn test_kind_falls_back_to_speed() {
        let fast = serde_json::json!({"velocity_smooth": {"data": [3.0, 7.5, 6.0]}});
        let slow = serde_json::json!({"velocity_smooth": {"data": [3.0, 7.0]}});
        let none = serde_json::json!({"heartrate": {"data": [140]}});
        assert_eq!(activity_kind(&fast, None), ActivityKind::Ride);
        assert_eq!(activity_kind(&slow, None), ActivityKind::Run);
        assert_eq!(activity_kind(&none, None), ActivityKind::Run);
        assert_eq!(
            activity_kind(&fast, Some(&summary(Some("Swim"), None))),
            ActivityKind::Ride
        );
    }

    #[test]
    fn test_existing_and_missing_ids() {
        let mut compilation = StreamCompilation::default();
        compilation.insert(ActivityKind::Run, 10, serde_json::json!({}));
        compilation.insert(ActivityKind::Ride, 20, serde_json::json!({}));
        compilation
            .entries
            .insert("notes".to_string(), serde_json::json!({}));
        compilation
            .entries
            .insert("run_abc".to_string(), serde_json::json!({}));

        assert_eq!(compilation.existing_ids(), HashSet::from([10, 20]));
        assert_eq!(compilation.missing_ids(&[30, 10, 40, 30, 20]), vec![30, 40]);
    }

    #[test]
    fn test_load_missing_and_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StreamCompilation::load(&dir.path().join("none.json"))
            .unwrap()
            .is_empty());

        let list = dir.path().join("list.json");
        std::fs::write(&list, "[]").unwrap();
        assert!(StreamCompilation::load(&list).is_err());
    }

    #[tokio::test]
    async fn test_compile_twice_does_not_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/activities/101/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "heartrate": {"data": [120, 150]},
                "velocity_smooth": {"data": [9.0]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/activities/202/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "heartrate": {"data": [130]},
                "velocity_smooth": {"data": [3.1]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let activities = dir.path().join("activities_2025.json");
        let compiled = dir.path().join("Comprehensive_stream_data.json");
        storage::save_json(
            &activities,
            &serde_json::json!([{"id": 101, "type": "Ride"}, {"id": 202, "type": "Run"}, 202]),
        )
        .unwrap();

        let client = StravaClient::new(&server.uri(), "tok").unwrap();
        let first = compile_streams(&client, &activities, &compiled).await.unwrap();
        assert_eq!(
            first,
            CompileSummary {
                fetched: 2,
                failed: 0,
                total: 2
            }
        );

        let second = compile_streams(&client, &activities, &compiled).await.unwrap();
        assert_eq!(second.fetched, 0);
        assert_eq!(second.total, 2);

        let saved = StreamCompilation::load(&compiled).unwrap();
        let keys: Vec<&String> = saved.entries().keys().collect();
        assert_eq!(keys, vec!["ride_101", "run_202"]);
    }

    #[tokio::test]
    async fn test_string_id_keeps_summary_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/activities/17/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "velocity_smooth": {"data": [3.0]}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let activities = dir.path().join("activities.json");
        let compiled = dir.path().join("compiled.json");
        storage::save_json(&activities, &serde_json::json!([{"id": "17", "type": "Ride"}]))
            .unwrap();

        let client = StravaClient::new(&server.uri(), "tok").unwrap();
        compile_streams(&client, &activities, &compiled).await.unwrap();

        let saved = StreamCompilation::load(&compiled).unwrap();
        let keys: Vec<&String> = saved.entries().keys().collect();
        assert_eq!(keys, vec!["ride_17"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/activities/1/streams"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Record Not Found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/activities/2/streams$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let activities = dir.path().join("activities.json");
        let compiled = dir.path().join("compiled.json");
        storage::save_json(&activities, &serde_json::json!([1, 2])).unwrap();

        let client = StravaClient::new(&server.uri(), "tok").unwrap();
        let summary = compile_streams(&client, &activities, &compiled).await.unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            StreamCompilation::load(&compiled).unwrap().existing_ids(),
            HashSet::from([2])
        );
    }
}
