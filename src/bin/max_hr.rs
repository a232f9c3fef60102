//! max-hr - highest recorded heart rate in a stream compilation

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use std::path::PathBuf;

use strava_hr::analytics;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "max-hr")]
#[command(about = "Find the highest heart rate across compiled activities", long_about = None)]
struct Cli {
    /// Stream compilation file (activity key -> streams)
    path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let data: Map<String, Value> = storage::load_json(&cli.path)
        .with_context(|| format!("Expected an object of activities in {}", cli.path.display()))?;

    match analytics::find_global_max_hr(&data) {
        Some(max) => {
            println!("Highest recorded heart-rate: {} bpm", max.bpm);
            println!("   (found in activity id: {})", max.activity);
        }
        None => println!("No heart-rate data found in the file."),
    }
    Ok(())
}
