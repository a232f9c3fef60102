//! fetch-activities - download one year of activities to `activities_<year>.json`

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use std::path::PathBuf;

use strava_hr::api::{self, StravaClient};
use strava_hr::config::Config;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "fetch-activities")]
#[command(about = "Fetch a year of Strava activities and write them to a JSON file", long_about = None)]
struct Cli {
    /// Strava OAuth access token
    #[arg(long, env = "STRAVA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Calendar year to fetch (default: current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output file (default: <data_dir>/activities_<year>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let token = cli
        .token
        .filter(|t| !t.trim().is_empty())
        .context("No Strava token provided. Use --token or set STRAVA_TOKEN.")?;

    let config = Config::load()?;
    let client = StravaClient::from_config(&config, &token)?;

    let now = Utc::now();
    let year = cli.year.unwrap_or_else(|| now.year());
    let activities = api::fetch_activities(&client, year, now).await?;

    let output = cli.output.unwrap_or_else(|| config.activities_path(year));
    storage::save_json(&output, &activities)?;
    println!(
        "Successfully wrote {} activities to '{}'.",
        activities.len(),
        output.display()
    );
    Ok(())
}
