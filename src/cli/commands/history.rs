//! History command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the history command.
pub async fn run_history(
    transcript_id: Option<&str>,
    limit: usize,
    user_id: &str,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let history = pipeline
        .store()
        .get_query_history(user_id, transcript_id, limit)
        .await?;

    if history.is_empty() {
        Output::info("No query history yet.");
        return Ok(());
    }

    Output::header(&format!("Query history ({})", history.len()));
    for record in &history {
        println!(
            "\n  [{}] {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.query
        );
        Output::kv("transcript", &record.transcript_id);
        Output::kv("answer", &record.response.answer);
    }

    Ok(())
}
