//! Moovit Route Scraper
//!
//! HTTP service that extracts route-option fragments from Moovit pages.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────────┐
//!                         │                   ROUTE SCRAPER                    │
//!                         │                                                    │
//!   POST /scrape          │  ┌─────────┐    ┌──────────────┐    ┌───────────┐  │
//!   ──────────────────────┼─▶│  http   │───▶│ orchestrator │───▶│   fetch   │──┼──▶ moovitapp.com
//!                         │  │ server  │    │ (validate)   │    │ http /    │  │
//!                         │  └─────────┘    └──────┬───────┘    │ rendered  │  │
//!                         │                        │            └─────┬─────┘  │
//!                         │                        ▼                  │        │
//!   {"routes": [...]}     │  ┌─────────┐    ┌──────────────┐          │        │
//!   ◀─────────────────────┼──│response │◀───│   matcher    │◀─────────┘        │
//!                         │  │         │    │ + dedupe     │   FetchedPage     │
//!                         │  └─────────┘    └──────────────┘                   │
//!                         │                                                    │
//!                         │  config · observability · resilience · lifecycle   │
//!                         └────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use route_scraper::config::{apply_env_overrides, load_config, validate_config, ConfigError};
use route_scraper::lifecycle::startup;
use route_scraper::ScraperConfig;

#[derive(Parser)]
#[command(name = "route-scraper")]
#[command(about = "HTTP API that extracts route fragments from Moovit pages", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ScraperConfig::default(),
    };
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    startup::run(config).await?;
    Ok(())
}
