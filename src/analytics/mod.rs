//! Descriptive heart-rate calculations over downloaded streams

mod max_hr;
mod zones;

pub use max_hr::{find_global_max_hr, MaxHeartRate};
pub use zones::{
    activity_series, format_duration, time_in_zones, ZoneBounds, ZoneTable, ZoneTime,
};
