//! compile-streams - fetch streams for activities missing from the compilation

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::Parser;
use std::path::PathBuf;

use strava_hr::api::StravaClient;
use strava_hr::compilation;
use strava_hr::config::Config;

#[derive(Parser)]
#[command(name = "compile-streams")]
#[command(about = "Fetch missing activity streams into the compilation file", long_about = None)]
struct Cli {
    /// Strava OAuth access token
    token: String,

    /// Activity list (default: <data_dir>/activities_<current year>.json)
    #[arg(short, long)]
    activities: Option<PathBuf>,

    /// Compilation file (default: <data_dir>/Comprehensive_stream_data.json)
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

    let config = Config::load()?;
    let client = StravaClient::from_config(&config, &cli.token)?;

    let activities = cli
        .activities
        .unwrap_or_else(|| config.activities_path(Utc::now().year()));
    let output = cli.output.unwrap_or_else(|| config.compilation_path());

    let summary = compilation::compile_streams(&client, &activities, &output).await?;
    tracing::info!(
        "{} fetched, {} failed, {} activities compiled",
        summary.fetched,
        summary.failed,
        summary.total
    );
    Ok(())
}
