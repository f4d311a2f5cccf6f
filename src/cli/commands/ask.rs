//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    transcript_id: &str,
    question: &str,
    user_id: &str,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Searching transcript...");

    match pipeline.query(user_id, transcript_id, question).await {
        Ok(result) => {
            spinner.finish_and_clear();

            println!("\n{}\n", result.answer);

            if !result.timestamps.is_empty() {
                Output::header("Sources");
                for (range, chunk) in result.timestamps.iter().zip(&result.source_chunks) {
                    Output::citation(&range.start, &range.end, chunk);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer question: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
