//! Global maximum heart rate across a stream compilation

use serde_json::{Map, Value};

use crate::models::numeric_samples;

#[derive(Debug, Clone, PartialEq)]
pub struct MaxHeartRate {
    pub bpm: f64,
    /// Compilation key of the activity where the maximum was recorded
    pub activity: String,
}

/// Highest `heartrate` sample over all activities. Activities without a
/// heart-rate list, or with an empty one, are skipped. On ties the first
/// activity in key order wins.
pub fn find_global_max_hr(compilation: &Map<String, Value>) -> Option<MaxHeartRate> {
    let mut best: Option<MaxHeartRate> = None;

    for (key, activity) in compilation {
        let Some(local_max) = numeric_samples(activity, "heartrate")
            .and_then(|samples| samples.into_iter().reduce(f64::max))
        else {
            continue;
        };

        if best.as_ref().map_or(true, |b| local_max > b.bpm) {
            best = Some(MaxHeartRate {
                bpm: local_max,
                activity: key.clone(),
            });
        }
    }

    best
}
