//! List-shaped stream collection, each entry tagged with its activity `id`

use anyhow::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use super::ids::dedup_ids;
use crate::api::{fetch_streams, StravaClient};
use crate::models::id_value;
use crate::storage;

#[derive(Debug, Default)]
pub struct StreamCollection {
    entries: Vec<Value>,
}

/// Outcome of one [`collect_streams`] run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub already_stored: usize,
    pub fetched: usize,
    pub failed: usize,
}

impl StreamCollection {
    /// Load from disk. A missing file is empty; an unreadable or non-list
    /// file is replaced by a fresh collection after a warning.
    pub fn load(path: &Path) -> Self {
        match storage::load_json_if_exists::<Value>(path) {
            Ok(None) => Self::default(),
            Ok(Some(Value::Array(entries))) => Self { entries },
            Ok(Some(_)) => {
                tracing::warn!("{} is not a JSON list. Starting fresh.", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{:#}. Starting fresh.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        storage::save_json(path, &self.entries)
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn existing_ids(&self) -> HashSet<i64> {
        self.entries
            .iter()
            .filter_map(|entry| entry.get("id").and_then(id_value))
            .collect()
    }

    /// The stored bundle tagged with `id`.
    pub fn find(&self, id: i64) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.get("id").and_then(id_value) == Some(id))
    }

    /// IDs not yet collected, in input order without repeats.
    pub fn new_ids(&self, ids: &[i64]) -> Vec<i64> {
        let existing = self.existing_ids();
        dedup_ids(ids)
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect()
    }

    /// Append a stream bundle, tagging it with `id`.
    pub fn push(&mut self, id: i64, mut bundle: Value) {
        if let Some(obj) = bundle.as_object_mut() {
            obj.insert("id".to_string(), Value::from(id));
        }
        self.entries.push(bundle);
    }
}

/// Fetch streams for each ID not yet in the collection at `path`, appending
/// and saving after every successful fetch.
pub async fn collect_streams(
    client: &StravaClient,
    ids: &[i64],
    path: &Path,
) -> Result<CollectSummary> {
    let mut collection = StreamCollection::load(path);
    let existing = collection.existing_ids().len();
    println!("Loaded {} already-stored activity IDs.", existing);

    let new_ids = collection.new_ids(ids);
    println!("{} new IDs to process.", new_ids.len());

    let mut summary = CollectSummary {
        already_stored: dedup_ids(ids).len() - new_ids.len(),
        ..CollectSummary::default()
    };

    for (idx, id) in new_ids.iter().enumerate() {
        println!(
            "[{}/{}] Fetching streams for activity {}...",
            idx + 1,
            new_ids.len(),
            id
        );
        match fetch_streams(client, *id).await {
            Ok(bundle) => {
                collection.push(*id, Value::Object(bundle));
                collection.save(path)?;
                summary.fetched += 1;
                println!("Stored streams for activity {}.", id);
            }
            Err(e) => {
                tracing::warn!("Error fetching activity {}: {:#}", id, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
