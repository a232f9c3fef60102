//! recent-streams - export the streams of a year's most recent activity

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use strava_hr::api::StravaClient;
use strava_hr::auth;
use strava_hr::compilation;
use strava_hr::config::Config;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "recent-streams")]
#[command(about = "Export the streams of the most recent activity of a year", long_about = None)]
struct Cli {
    /// Calendar year of the activity list (default: current year)
    year: Option<i32>,

    /// Strava OAuth access token, only needed for activities without heart rate
    /// (default: stored token, authorizing if needed)
    #[arg(long, env = "STRAVA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Activity list (default: <data_dir>/activities_<year>.json)
    #[arg(short, long)]
    activities: Option<PathBuf>,

    /// ID-tagged stream collection
    /// (default: <data_dir>/activity_stream_compilation.json)
    #[arg(short, long)]
    collection: Option<PathBuf>,

    /// Output directory (default: <data_dir>)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let config = Config::load()?;
    let year = cli.year.unwrap_or_else(|| Utc::now().year());
    let activities_path = cli
        .activities
        .unwrap_or_else(|| config.activities_path(year));
    let out_dir = cli.output_dir.unwrap_or_else(|| config.data_dir.clone());

    let items: Vec<Value> = storage::load_json(&activities_path)?;
    let recent = compilation::most_recent_activity(&items)?;
    println!(
        "Most recent activity: ID={}, name='{}'",
        recent.id,
        recent.name.as_deref().unwrap_or("")
    );
    println!("Has heart-rate data: {}", recent.has_heartrate);

    let out = if recent.has_heartrate {
        let collection = cli.collection.unwrap_or_else(|| config.collection_path());
        compilation::export_local_streams(&recent, &collection, &out_dir)?
    } else {
        let token = match cli.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => auth::valid_access_token(&config).await?,
        };
        let client = StravaClient::from_config(&config, &token)?;
        compilation::export_api_streams(&client, &recent, &out_dir).await?
    };

    println!("Saved streams to {}", out.display());
    Ok(())
}
