use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use route_scraper::extraction::{FragmentMatcher, FragmentSet, MatchInput, DEFAULT_MARKER};

#[derive(Parser)]
#[command(name = "scrape-cli")]
#[command(about = "Client and offline tools for the route scraper", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the scraper API is running
    Status,
    /// Ask the running API to scrape a Moovit URL
    Scrape {
        /// Moovit route URL
        target: String,
        /// Use the headless-browser path
        #[arg(long)]
        rendered: bool,
    },
    /// Run the matcher over a saved HTML file without any network access
    Match {
        /// HTML file to scan
        file: PathBuf,
        /// Marker class to look for
        #[arg(long, default_value = DEFAULT_MARKER)]
        marker: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let res = reqwest::Client::new().get(format!("{}/", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Scrape { target, rendered } => {
            let path = if rendered { "scrape/rendered" } else { "scrape" };
            let res = reqwest::Client::new()
                .post(format!("{}/{}", cli.url, path))
                .json(&json!({ "url": target }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Match { file, marker } => {
            let markup = std::fs::read_to_string(&file)?;
            let matcher = FragmentMatcher::new(&marker)?;
            let (strategy, routes) = match matcher.run(&MatchInput::markup(&markup)) {
                Some(outcome) => (Some(outcome.strategy), FragmentSet::dedupe(outcome.fragments)),
                None => (None, FragmentSet::empty()),
            };
            let out = json!({
                "file": file.display().to_string(),
                "strategy": strategy,
                "count": routes.len(),
                "routes": routes,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;

    match serde_json::from_str::<Value>(&body) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", body);
        }
    }
    Ok(())
}
