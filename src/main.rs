use clap::{Parser, Subcommand};
use race_tracker::{report, Client};
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "race-tracker", about = "Refreshes race data snapshots for the website")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the per-race primary polling tracker
    Tracker {
        #[arg(long, default_value = "data/alabama_tracker.json")]
        out: PathBuf,
    },
    /// Build the swing-state Senate race file
    Races {
        #[arg(long, default_value = "data/races.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let client = Client::new()?;

    match cli.command {
        Command::Tracker { out } => {
            let payload = report::build_tracker(&client).await;
            report::write_json(&out, &payload)?;
            println!("Wrote {} with {} races", out.display(), payload.races.len());
        }
        Command::Races { out } => {
            let payload = report::build_races(&client).await;
            report::write_json(&out, &payload)?;
            println!(
                "Wrote {} with {} states",
                out.display(),
                payload.swing_states.len()
            );
        }
    }

    Ok(())
}
