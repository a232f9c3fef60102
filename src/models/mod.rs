//! Data models for Strava entities

mod activity;
mod stream;

pub use activity::*;
pub use stream::*;
