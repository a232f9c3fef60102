//! collect-streams - fetch streams for an explicit list of activity IDs

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use strava_hr::api::StravaClient;
use strava_hr::compilation;
use strava_hr::config::Config;

#[derive(Parser)]
#[command(name = "collect-streams")]
#[command(about = "Collect Strava activity streams not yet in the collection file", long_about = None)]
struct Cli {
    /// Strava OAuth bearer token (a leading "Bearer " is accepted)
    token: String,

    /// Comma-separated activity IDs, a file with one ID per line, or '-' for stdin
    ids: String,

    /// Collection file (default: <data_dir>/activity_stream_compilation.json)
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

    let ids = compilation::read_id_input(&cli.ids)?;
    if ids.is_empty() {
        bail!("No activity IDs provided.");
    }

    let config = Config::load()?;
    let client = StravaClient::from_config(&config, &cli.token)?;
    let output = cli.output.unwrap_or_else(|| config.collection_path());

    let summary = compilation::collect_streams(&client, &ids, &output).await?;
    println!(
        "All done! {} stored, {} failed, {} already present.",
        summary.fetched, summary.failed, summary.already_stored
    );
    Ok(())
}
