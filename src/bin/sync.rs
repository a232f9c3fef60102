//! sync - authorize if needed, fetch this year's activities, compile streams

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::Parser;

use strava_hr::api::{self, StravaClient};
use strava_hr::auth;
use strava_hr::compilation;
use strava_hr::config::Config;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "sync")]
#[command(about = "Refresh local activity and stream data from Strava", long_about = None)]
struct Cli {
    /// Only fetch the activity list, skip stream compilation
    #[arg(long)]
    skip_streams: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let config = Config::load()?;
    let token = auth::valid_access_token(&config).await?;
    let client = StravaClient::from_config(&config, &token)?;

    let now = Utc::now();
    let activities = api::fetch_activities(&client, now.year(), now).await?;
    let activities_path = config.activities_path(now.year());
    storage::save_json(&activities_path, &activities)?;
    println!(
        "Wrote {} activities to {}",
        activities.len(),
        activities_path.display()
    );

    if cli.skip_streams {
        return Ok(());
    }

    compilation::compile_streams(&client, &activities_path, &config.compilation_path()).await?;
    Ok(())
}
