//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SitatError;
use crate::ingest::{IngestJob, IngestQueue};
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Run the ingest command.
///
/// The transcript id is issued and printed before processing finishes;
/// the command then waits for the background worker to drain so a one-shot
/// CLI invocation leaves the index complete.
pub async fn run_ingest(
    file: &str,
    name: Option<String>,
    user_id: &str,
    settings: Settings,
) -> Result<()> {
    let path = Path::new(file);

    if path.extension().and_then(|e| e.to_str()) != Some("txt") {
        return Err(SitatError::InvalidInput("Only text files are supported".to_string()).into());
    }

    let content = std::fs::read_to_string(path)?;
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("transcript")
            .to_string()
    });

    let transcript_id = Uuid::new_v4().to_string();

    let pipeline = Arc::new(Pipeline::new(settings)?);
    let queue = IngestQueue::spawn(pipeline.clone());

    queue.submit(IngestJob {
        user_id: user_id.to_string(),
        transcript_id: transcript_id.clone(),
        name: name.clone(),
        content,
    })?;

    Output::success(&format!("Processing started: {}", transcript_id));

    let spinner = Output::spinner("Parsing, chunking, and indexing...");
    queue.close().await?;
    spinner.finish_and_clear();

    // Report the recorded outcome; failures live in the error log, not here.
    let processed = pipeline
        .store()
        .get_user_transcripts(user_id)
        .await?
        .into_iter()
        .find(|t| t.transcript_id == transcript_id);

    match processed {
        Some(meta) => {
            Output::success(&format!(
                "Indexed '{}' with {} chunks",
                meta.name, meta.chunk_count
            ));
            Output::kv("transcript_id", &transcript_id);
        }
        None => {
            Output::error("Processing failed; the error was recorded for this transcript.");
        }
    }

    Ok(())
}
