//! strava-hr - Strava activity download and heart-rate zone tools
//!
//! Shared library behind the individual command-line tools in `src/bin`.

pub mod analytics;
pub mod api;
pub mod auth;
pub mod compilation;
pub mod config;
pub mod logging;
pub mod models;
pub mod storage;
