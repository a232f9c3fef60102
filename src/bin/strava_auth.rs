//! strava-auth - authorize with Strava and store the token record
//!
//! Opens the consent page in the browser, catches the redirect on the local
//! callback listener and exchanges the code for tokens.

use anyhow::Result;
use clap::Parser;

use strava_hr::auth::tokens::format_timestamp;
use strava_hr::auth::{self, FileTokenStore, TokenStore};
use strava_hr::config::Config;

#[derive(Parser)]
#[command(name = "strava-auth")]
#[command(about = "Authorize with Strava and store an access token", long_about = None)]
struct Cli {
    /// Show the stored token's status instead of authorizing
    #[arg(short, long)]
    status: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    strava_hr::logging::init(cli.verbose);

    let config = Config::load()?;

    if cli.status {
        let store = FileTokenStore::new(config.token_path());
        match store.load() {
            Some(token) if token.is_valid() => {
                println!("Access token: valid");
                println!("  expires_at: {}", format_timestamp(token.expires_at));
            }
            Some(token) => {
                println!("Access token: expired");
                println!("  expires_at: {}", format_timestamp(token.expires_at));
            }
            None => {
                println!("Access token: none");
                println!("\nRun 'strava-auth' to authenticate.");
            }
        }
        return Ok(());
    }

    tracing::info!("Starting authorization flow...");
    auth::authorize(&config).await?;
    Ok(())
}
