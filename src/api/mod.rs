//! API client module for Strava

pub mod activities;
pub mod client;
pub mod streams;

pub use activities::{fetch_activities, year_window};
pub use client::{ApiError, StravaClient};
pub use streams::{fetch_streams, STREAM_KEYS};
