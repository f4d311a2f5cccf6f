//! Sitat CLI entry point.

use anyhow::Result;
use clap::Parser;
use sitat::cli::{commands, Cli, Commands};
use sitat::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("sitat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Ingest { file, name } => {
            commands::run_ingest(file, name.clone(), &cli.user, settings).await?;
        }

        Commands::Ask {
            transcript_id,
            question,
        } => {
            commands::run_ask(transcript_id, question, &cli.user, settings).await?;
        }

        Commands::List => {
            commands::run_list(&cli.user, settings).await?;
        }

        Commands::History {
            transcript_id,
            limit,
        } => {
            commands::run_history(transcript_id.as_deref(), *limit, &cli.user, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
