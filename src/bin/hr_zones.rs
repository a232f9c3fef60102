//! hr-zones - five training zones from a maximum heart rate

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use std::path::PathBuf;

use strava_hr::analytics::{self, ZoneTable};
use strava_hr::config::Config;
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "hr-zones")]
#[command(about = "Compute heart-rate zones and write the zone-definition file", long_about = None)]
struct Cli {
    /// Maximum heart rate in bpm; read from the compilation when omitted
    #[arg(short, long)]
    max_hr: Option<f64>,

    /// Stream compilation used to find the maximum
    /// (default: <data_dir>/Comprehensive_stream_data.json)
    #[arg(short, long)]
    compilation: Option<PathBuf>,

    /// Zone-definition output (default: <data_dir>/hr_zones.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let config = Config::load()?;

    let max_hr = match cli.max_hr {
        Some(max_hr) => max_hr,
        None => {
            let path = cli.compilation.unwrap_or_else(|| config.compilation_path());
            let data: Map<String, Value> = storage::load_json(&path)?;
            let max = analytics::find_global_max_hr(&data)
                .with_context(|| format!("No heart-rate data found in {}", path.display()))?;
            tracing::info!("Using max heart rate {} bpm from {}", max.bpm, max.activity);
            max.bpm
        }
    };

    let table = ZoneTable::from_max_hr(max_hr)?;
    println!("\n=== Heart-rate zones (max {} bpm) ===", max_hr);
    for (name, bounds) in table.zones() {
        let max = bounds.max.map(|m| format!("{:.1}", m)).unwrap_or_default();
        println!("{:8}: {:.1} - {}", name, bounds.min, max);
    }

    let output = cli.output.unwrap_or_else(|| config.zones_path());
    table.save(&output)?;
    println!("\nSaved zone definitions to {}", output.display());
    Ok(())
}
