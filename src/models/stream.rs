//! Stream bundle helpers

use serde_json::{Map, Value};

/// Streams of one activity keyed by stream type, e.g.
/// `{"heartrate": {"data": [...]}, "time": {"data": [...]}}`.
pub type StreamBundle = Map<String, Value>;

/// The `data` array of one stream, if present.
pub fn stream_data<'a>(bundle: &'a Value, stream: &str) -> Option<&'a Vec<Value>> {
    bundle.get(stream)?.get("data")?.as_array()
}

/// Numeric samples of one stream; non-numeric samples are dropped.
pub fn numeric_samples(bundle: &Value, stream: &str) -> Option<Vec<f64>> {
    stream_data(bundle, stream).map(|data| data.iter().filter_map(Value::as_f64).collect())
}
