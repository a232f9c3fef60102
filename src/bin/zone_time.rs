//! zone-time - time spent in each heart-rate zone for one activity

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use strava_hr::analytics::{self, format_duration, ZoneTable};
use strava_hr::storage;

#[derive(Parser)]
#[command(name = "zone-time")]
#[command(about = "Compute the time spent in each heart-rate zone", long_about = None)]
struct Cli {
    /// Stream compilation file
    path: PathBuf,

    /// Activity key in the compilation, e.g. run_16844801853
    activity: String,

    /// Zone-definition file to use instead of the fixed bpm zones
    #[arg(short, long)]
    zones: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let zones = match &cli.zones {
        Some(path) => ZoneTable::load(path)?,
        None => ZoneTable::absolute(),
    };

    let data: Value = storage::load_json(&cli.path)?;
    let (time, heartrate) = analytics::activity_series(&data, &cli.activity)?;
    let zone_time = analytics::time_in_zones(&time, &heartrate, &zones)?;

    println!("\n=== Time spent in each zone ===");
    for ((name, secs), (_, bounds)) in zone_time.per_zone.iter().zip(zones.zones()) {
        let label = match bounds.max {
            Some(max) => format!("{} ({}-{} bpm)", name, bounds.min, max),
            None => format!("{} (>={} bpm)", name, bounds.min),
        };
        println!("{:28}: {}", label, format_duration(*secs));
    }
    if zone_time.unclassified != 0 {
        println!("{:28}: {}", "Outside all zones", format_duration(zone_time.unclassified));
    }

    println!(
        "\nTotal zone time: {}\n",
        format_duration(zone_time.zoned_total())
    );
    Ok(())
}
