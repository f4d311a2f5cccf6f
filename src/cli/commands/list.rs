//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(user_id: &str, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let transcripts = pipeline.store().get_user_transcripts(user_id).await?;

    if transcripts.is_empty() {
        Output::info("No transcripts ingested yet. Use 'sitat ingest <file>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Transcripts ({})", transcripts.len()));
    for transcript in &transcripts {
        Output::transcript_info(
            &transcript.name,
            &transcript.transcript_id,
            transcript.chunk_count,
            &transcript.upload_date.format("%Y-%m-%d %H:%M").to_string(),
        );
    }

    Ok(())
}
