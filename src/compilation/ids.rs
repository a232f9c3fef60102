//! Activity ID extraction and ID list input

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::models::{id_value, ActivityRef};

/// IDs from an activity array whose items are integers or objects with an
/// `id` field. Anything else is skipped with a warning.
pub fn activity_ids(items: &[Value]) -> Vec<i64> {
    items
        .iter()
        .filter_map(|item| {
            let id = match item {
                Value::Object(obj) => obj.get("id").and_then(id_value),
                other => id_value(other),
            };
            if id.is_none() {
                tracing::warn!("Skipping unexpected item in activity list: {}", item);
            }
            id
        })
        .collect()
}

/// Keep the first occurrence of each ID.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Run and ride IDs of activities that recorded heart rate
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct HrActivityIds {
    pub runs_with_hr: Vec<i64>,
    pub rides_with_hr: Vec<i64>,
}

/// Split activities with `has_heartrate` into runs and rides by their exact
/// `type`. Other types, and activities without heart rate, are left out.
pub fn hr_activity_ids(items: &[Value]) -> HrActivityIds {
    let mut ids = HrActivityIds::default();
    for item in items {
        let Some(activity) = ActivityRef::from_value(item) else {
            tracing::warn!("Skipping unexpected item in activity list: {}", item);
            continue;
        };
        if !activity.has_heartrate {
            continue;
        }
        match activity.activity_type.as_deref() {
            Some("Run") => ids.runs_with_hr.push(activity.id),
            Some("Ride") => ids.rides_with_hr.push(activity.id),
            _ => {}
        }
    }
    ids
}

/// Parse IDs from text: commas or newlines separate them, blanks are
/// ignored, non-numeric entries are skipped with a warning.
pub fn parse_id_list(text: &str) -> Vec<i64> {
    text.split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Skipping non-numeric activity ID: {}", s);
                None
            }
        })
        .collect()
}

/// Resolve an ID argument: `-` reads stdin, an existing file is read one ID
/// per line, anything else is a comma-separated list.
pub fn read_id_input(arg: &str) -> Result<Vec<i64>> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read activity IDs from stdin")?;
        return Ok(parse_id_list(&text));
    }

    let path = Path::new(arg);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(parse_id_list(&text));
    }

    Ok(parse_id_list(arg))
}
