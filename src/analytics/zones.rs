//! Heart-rate training zones and time-in-zone accumulation

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::stream_data;
use crate::storage;

/// Zone bands as percentages of maximum heart rate: (lower, upper).
/// The lower bound is inclusive; the upper bound is exclusive except for
/// the top zone.
const PERCENT_BANDS: [(f64, f64); 5] = [
    (68.25, 74.0),
    (74.0, 80.5),
    (80.5, 87.0),
    (87.0, 93.5),
    (93.5, 100.0),
];

/// Absolute bpm zones, all bounds inclusive; the top zone is open-ended.
const ABSOLUTE_ZONES: [(f64, Option<f64>); 5] = [
    (0.0, Some(119.0)),
    (120.0, Some(144.0)),
    (145.0, Some(165.0)),
    (166.0, Some(177.0)),
    (178.0, None),
];

/// Smallest step of a rendered bound (bpm).
const STEP: f64 = 0.1;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Inclusive bpm range of one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ZoneBounds {
    pub fn contains(&self, hr: f64) -> bool {
        hr >= self.min && self.max.map_or(true, |max| hr <= max)
    }
}

/// Ordered zones; classification takes the first zone that matches.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTable {
    zones: Vec<(String, ZoneBounds)>,
}

fn zone_name(n: usize) -> String {
    format!("Zone {}", n)
}

impl ZoneTable {
    /// The five percentage zones for `max_hr`, each bound rounded to 0.1 bpm.
    /// A zone's max sits one step below the next zone's min.
    pub fn from_max_hr(max_hr: f64) -> Result<Self> {
        ensure!(
            max_hr.is_finite() && max_hr > 0.0,
            "Maximum heart rate must be a positive number, got {}",
            max_hr
        );

        let last = PERCENT_BANDS.len() - 1;
        let zones = PERCENT_BANDS
            .iter()
            .enumerate()
            .map(|(i, &(lower, upper))| {
                let min = round1(max_hr * lower / 100.0);
                let top = round1(max_hr * upper / 100.0);
                let max = if i == last { top } else { round1(top - STEP) };
                (zone_name(i + 1), ZoneBounds { min, max: Some(max) })
            })
            .collect();
        Ok(Self { zones })
    }

    /// Fixed bpm zones: 0-119, 120-144, 145-165, 166-177, 178+.
    pub fn absolute() -> Self {
        let zones = ABSOLUTE_ZONES
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| (zone_name(i + 1), ZoneBounds { min, max }))
            .collect();
        Self { zones }
    }

    /// Load a zone-definition file `{"Zone N": {"min": x, "max": y}}`.
    /// Zones are ordered by their number.
    pub fn load(path: &Path) -> Result<Self> {
        let file: BTreeMap<String, ZoneBounds> = storage::load_json(path)?;
        ensure!(!file.is_empty(), "No zones defined in {}", path.display());

        let mut zones: Vec<(String, ZoneBounds)> = file.into_iter().collect();
        zones.sort_by_key(|(name, _)| {
            (
                name.rsplit(' ')
                    .next()
                    .and_then(|n| n.parse::<u32>().ok())
                    .unwrap_or(u32::MAX),
                name.clone(),
            )
        });
        Ok(Self { zones })
    }

    /// Write the zone-definition file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file: BTreeMap<&str, &ZoneBounds> = self
            .zones
            .iter()
            .map(|(name, bounds)| (name.as_str(), bounds))
            .collect();
        storage::save_json(path, &file)
    }

    pub fn zones(&self) -> &[(String, ZoneBounds)] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Index of the first zone containing `hr`.
    pub fn classify(&self, hr: f64) -> Option<usize> {
        self.zones.iter().position(|(_, bounds)| bounds.contains(hr))
    }
}

/// Seconds attributed to each zone of a table
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTime {
    pub per_zone: Vec<(String, i64)>,
    /// Seconds whose closing sample fell outside every zone
    pub unclassified: i64,
}

impl ZoneTime {
    /// Seconds across all zones, excluding unclassified time.
    pub fn zoned_total(&self) -> i64 {
        self.per_zone.iter().map(|(_, secs)| secs).sum()
    }

    pub fn total(&self) -> i64 {
        self.zoned_total() + self.unclassified
    }
}

/// Accumulate elapsed time per zone. Each interval `time[i-1]..time[i]` is
/// attributed to the zone of `heartrate[i]`.
pub fn time_in_zones(time: &[i64], heartrate: &[f64], zones: &ZoneTable) -> Result<ZoneTime> {
    ensure!(
        time.len() == heartrate.len(),
        "Time and heart-rate series are not the same length ({} vs {})",
        time.len(),
        heartrate.len()
    );

    let mut seconds = vec![0i64; zones.len()];
    let mut unclassified = 0;
    for i in 1..time.len() {
        let bucket = match zones.classify(heartrate[i]) {
            Some(zone) => &mut seconds[zone],
            None => &mut unclassified,
        };
        *bucket = time[i]
            .checked_sub(time[i - 1])
            .and_then(|dt| bucket.checked_add(dt))
            .with_context(|| {
                format!(
                    "Time samples {} and {} at index {} overflow",
                    time[i - 1],
                    time[i],
                    i
                )
            })?;
    }

    let per_zone = zones
        .zones()
        .iter()
        .zip(seconds)
        .map(|((name, _), secs)| (name.clone(), secs))
        .collect();
    Ok(ZoneTime {
        per_zone,
        unclassified,
    })
}

/// The `time` and `heartrate` series of one compiled activity. Every sample
/// must be numeric so the two series stay aligned.
pub fn activity_series(compilation: &Value, key: &str) -> Result<(Vec<i64>, Vec<f64>)> {
    let activity = compilation
        .get(key)
        .with_context(|| format!("Activity '{}' not found", key))?;

    let time = stream_data(activity, "time")
        .with_context(|| format!("Activity '{}' has no time stream", key))?
        .iter()
        .map(Value::as_i64)
        .collect::<Option<Vec<_>>>()
        .with_context(|| format!("Activity '{}' has non-integer time samples", key))?;
    let heartrate = stream_data(activity, "heartrate")
        .with_context(|| format!("Activity '{}' has no heartrate stream", key))?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()
        .with_context(|| format!("Activity '{}' has non-numeric heartrate samples", key))?;

    Ok((time, heartrate))
}

/// `"M min SS sec"`, with a leading `-` for negative durations.
pub fn format_duration(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let abs = secs.unsigned_abs();
    format!("{}{} min {:02} sec", sign, abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(table: &ZoneTable) -> Vec<(f64, Option<f64>)> {
        table.zones().iter().map(|(_, b)| (b.min, b.max)).collect()
    }

    #[test]
    fn test_zones_for_200() {
        let table = ZoneTable::from_max_hr(200.0).unwrap();
        assert_eq!(
            bounds(&table),
            vec![
                (136.5, Some(147.9)),
                (148.0, Some(160.9)),
                (161.0, Some(173.9)),
                (174.0, Some(186.9)),
                (187.0, Some(200.0)),
            ]
        );
        assert_eq!(table.zones()[0].0, "Zone 1");
        assert_eq!(table.zones()[4].0, "Zone 5");
    }

    #[test]
    fn test_zone_bounds_are_contiguous_at_one_decimal() {
        for max_hr in [163.0, 185.0, 191.5, 207.0] {
            let table = ZoneTable::from_max_hr(max_hr).unwrap();
            for pair in table.zones().windows(2) {
                let upper = pair[0].1.max.unwrap();
                assert_eq!(round1(upper + STEP), pair[1].1.min, "max_hr {}", max_hr);
            }
            assert_eq!(table.zones()[4].1.max, Some(round1(max_hr)));
        }
    }

    #[test]
    fn test_invalid_max_hr() {
        assert!(ZoneTable::from_max_hr(0.0).is_err());
        assert!(ZoneTable::from_max_hr(-10.0).is_err());
        assert!(ZoneTable::from_max_hr(f64::NAN).is_err());
    }

    #[test]
    fn test_definition_file_roundtrip_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr_zones.json");
        let table = ZoneTable::from_max_hr(200.0).unwrap();
        table.save(&path).unwrap();

        let written: Value = storage::load_json(&path).unwrap();
        assert_eq!(
            written["Zone 1"],
            serde_json::json!({"min": 136.5, "max": 147.9})
        );
        assert_eq!(ZoneTable::load(&path).unwrap(), table);
    }

    #[test]
    fn test_load_orders_by_zone_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        let file = (1..=10)
            .map(|n| (zone_name(n), serde_json::json!({"min": n as f64 * 10.0})))
            .collect::<serde_json::Map<_, _>>();
        storage::save_json(&path, &file).unwrap();

        let table = ZoneTable::load(&path).unwrap();
        let names: Vec<&str> = table.zones().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.first(), Some(&"Zone 1"));
        assert_eq!(names.get(1), Some(&"Zone 2"));
        assert_eq!(names.last(), Some(&"Zone 10"));
    }

    #[test]
    fn test_absolute_classification_edges() {
        let table = ZoneTable::absolute();
        assert_eq!(table.classify(0.0), Some(0));
        assert_eq!(table.classify(119.0), Some(0));
        assert_eq!(table.classify(120.0), Some(1));
        assert_eq!(table.classify(165.0), Some(2));
        assert_eq!(table.classify(177.0), Some(3));
        assert_eq!(table.classify(178.0), Some(4));
        assert_eq!(table.classify(230.0), Some(4));
        assert_eq!(table.classify(119.5), None);
        assert_eq!(table.classify(-1.0), None);
    }

    #[test]
    fn test_time_attributed_to_later_sample() {
        let zt = time_in_zones(
            &[0, 10, 20, 30],
            &[100.0, 150.0, 170.0, 190.0],
            &ZoneTable::absolute(),
        )
        .unwrap();
        let secs: Vec<i64> = zt.per_zone.iter().map(|(_, s)| *s).collect();
        assert_eq!(secs, vec![0, 0, 10, 10, 10]);
        assert_eq!(zt.unclassified, 0);
        assert_eq!(zt.total(), 30);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let table = ZoneTable {
            zones: vec![
                ("Zone 1".to_string(), ZoneBounds { min: 100.0, max: Some(150.0) }),
                ("Zone 2".to_string(), ZoneBounds { min: 140.0, max: Some(160.0) }),
            ],
        };
        let zt = time_in_zones(&[0, 5, 12], &[90.0, 145.0, 155.0], &table).unwrap();
        assert_eq!(zt.per_zone[0].1, 5);
        assert_eq!(zt.per_zone[1].1, 7);
    }

    #[test]
    fn test_unclassified_keeps_total() {
        let zt = time_in_zones(&[0, 4, 9, 15], &[60.0, 119.5, 130.0, -5.0], &ZoneTable::absolute())
            .unwrap();
        assert_eq!(zt.unclassified, 4 + 6);
        assert_eq!(zt.zoned_total(), 5);
        assert_eq!(zt.total(), 15);
    }

    #[test]
    fn test_time_overflow_is_an_error() {
        let zones = ZoneTable::absolute();
        let err = time_in_zones(&[i64::MIN, i64::MAX], &[150.0, 150.0], &zones).unwrap_err();
        assert!(err.to_string().contains("overflow"));

        let hr = [150.0, 150.0, 150.0];
        assert!(time_in_zones(&[0, i64::MAX, i64::MAX], &hr, &zones).is_ok());
        assert!(time_in_zones(&[-10, i64::MAX - 20, i64::MAX], &hr, &zones).is_err());
    }

    #[test]
    fn test_non_monotonic_time_goes_negative() {
        let zt = time_in_zones(&[0, 20, 5], &[150.0, 150.0, 119.5], &ZoneTable::absolute())
            .unwrap();
        assert_eq!(zt.per_zone[2].1, 20);
        assert_eq!(zt.unclassified, -15);
        assert_eq!(zt.total(), 5);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(time_in_zones(&[0, 1], &[100.0], &ZoneTable::absolute()).is_err());
    }

    #[test]
    fn test_short_series() {
        let zt = time_in_zones(&[], &[], &ZoneTable::absolute()).unwrap();
        assert_eq!(zt.total(), 0);
        let zt = time_in_zones(&[5], &[150.0], &ZoneTable::absolute()).unwrap();
        assert_eq!(zt.total(), 0);
    }

    #[test]
    fn test_activity_series() {
        let compilation = serde_json::json!({
            "run_16844801853": {
                "time": {"data": [0, 1, 2]},
                "heartrate": {"data": [120, 121.5, 123]}
            },
            "ride_1": {"time": {"data": [0, 1.5]}, "heartrate": {"data": [1, 2]}}
        });
        let (time, hr) = activity_series(&compilation, "run_16844801853").unwrap();
        assert_eq!(time, vec![0, 1, 2]);
        assert_eq!(hr, vec![120.0, 121.5, 123.0]);

        assert!(activity_series(&compilation, "ride_1").is_err());
        assert!(activity_series(&compilation, "run_2").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 min 00 sec");
        assert_eq!(format_duration(605), "10 min 05 sec");
        assert_eq!(format_duration(-75), "-1 min 15 sec");
    }
}
