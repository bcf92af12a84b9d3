use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Settings;

#[derive(Debug, Parser)]
#[command(name = "tabsplit", version, about = "Read receipt OCR output and split the bill")]
struct Cli {
    /// TOML settings file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a receipt draft from a JSON list of OCR fragments.
    Extract { fragments: PathBuf },
    /// Compute what each participant owes from a JSON split request.
    Split { request: PathBuf },
    /// Scan a synthetic receipt from the seeded demo recognizer.
    Demo {
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let output = match cli.command {
        Command::Extract { fragments } => {
            tracing::info!("Extracting receipt: {}", fragments.display());
            serde_json::to_string_pretty(&commands::extract(&settings, &fragments)?)?
        }
        Command::Split { request } => {
            tracing::info!("Splitting bill: {}", request.display());
            serde_json::to_string_pretty(&commands::split(&settings, &request)?)?
        }
        Command::Demo { seed } => serde_json::to_string_pretty(&commands::demo(&settings, seed).await?)?,
    };

    println!("{output}");
    Ok(())
}
