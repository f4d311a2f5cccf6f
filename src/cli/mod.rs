//! CLI module for Sitat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sitat - Transcript Q&A with timestamp citations
///
/// Ingest timestamped transcripts and ask questions answered from their
/// content, with citations back to the time ranges involved. The name
/// "Sitat" is the Norwegian word for "quotation."
#[derive(Parser, Debug)]
#[command(name = "sitat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// User identifier operations run as
    #[arg(short, long, global = true, env = "SITAT_USER", default_value = "default")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a transcript file (.txt with [HH:MM:SS] markers)
    Ingest {
        /// Path to the transcript file
        file: String,

        /// Display name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Ask a question about an ingested transcript
    Ask {
        /// Transcript ID to query
        transcript_id: String,

        /// The question to ask
        question: String,
    },

    /// List your ingested transcripts
    List,

    /// Show recent query history
    History {
        /// Limit history to a specific transcript
        #[arg(short, long)]
        transcript_id: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
