//! hr-activity-ids - run and ride IDs that recorded heart rate

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use strava_hr::compilation;
use strava_hr::config::Config;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "hr-activity-ids")]
#[command(about = "Collect Run and Ride IDs with heart-rate data", long_about = None)]
struct Cli {
    /// Activity list JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (default: <data_dir>/activity_ids.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let items: Vec<Value> = storage::load_json(&cli.input)?;
    let ids = compilation::hr_activity_ids(&items);
    tracing::info!(
        "{} runs and {} rides with heart rate",
        ids.runs_with_hr.len(),
        ids.rides_with_hr.len()
    );

    let output = match cli.output {
        Some(path) => path,
        None => Config::load()?.activity_ids_path(),
    };
    storage::save_json(&output, &ids)?;
    println!("Saved activity IDs to {}", output.display());
    Ok(())
}
