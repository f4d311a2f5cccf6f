//! Background ingestion queue.
//!
//! Transcript processing is decoupled from the request that triggers it:
//! `submit` returns immediately and a worker task runs the pipeline. A
//! failed job is recorded as a per-transcript processing error, never
//! surfaced to the submitter. No retries.

use crate::error::{Result, SitatError};
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A transcript processing job.
#[derive(Debug)]
pub struct IngestJob {
    /// Owning user.
    pub user_id: String,
    /// Transcript identifier the job processes.
    pub transcript_id: String,
    /// Display name.
    pub name: String,
    /// Raw transcript text.
    pub content: String,
}

/// Fire-and-forget ingest queue with a single worker task.
pub struct IngestQueue {
    tx: mpsc::UnboundedSender<IngestJob>,
    worker: JoinHandle<()>,
}

impl IngestQueue {
    /// Spawn the worker and return a handle for submitting jobs.
    pub fn spawn(pipeline: Arc<Pipeline>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<IngestJob>();

        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                info!("Processing transcript {}", job.transcript_id);

                let outcome = pipeline
                    .process_transcript(&job.content, &job.user_id, &job.transcript_id, &job.name)
                    .await;

                if let Err(e) = outcome {
                    error!("Error processing transcript {}: {}", job.transcript_id, e);
                    if let Err(save_err) = pipeline
                        .store()
                        .save_processing_error(&job.user_id, &job.transcript_id, &e.to_string())
                        .await
                    {
                        error!("Failed to record processing error: {}", save_err);
                    }
                }
            }
        });

        Self { tx, worker }
    }

    /// Submit a job. Returns as soon as the job is enqueued.
    pub fn submit(&self, job: IngestJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| SitatError::Ingest("Worker has shut down".to_string()))
    }

    /// Stop accepting jobs, drain the queue, and wait for the worker.
    pub async fn close(self) -> Result<()> {
        drop(self.tx);
        self.worker
            .await
            .map_err(|e| SitatError::Ingest(format!("Worker panicked: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::embedding::Embedder;
    use crate::pipeline::Pipeline;
    use crate::store::SqliteStore;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    struct StubEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            if self.fail {
                Err(crate::error::SitatError::Embedding("provider down".to_string()))
            } else {
                Ok(vec![1.0, 0.0])
            }
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            if self.fail {
                return Err(crate::error::SitatError::Embedding("provider down".to_string()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn pipeline_with(fail: bool) -> Arc<Pipeline> {
        Arc::new(Pipeline::with_components(
            Settings::default(),
            Arc::new(StubEmbedder { fail }),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(SqliteStore::in_memory().unwrap()),
        ))
    }

    fn job(transcript_id: &str) -> IngestJob {
        IngestJob {
            user_id: "alice".to_string(),
            transcript_id: transcript_id.to_string(),
            name: "meeting".to_string(),
            content: "[00:00:00] Hello world. [00:00:05] Goodbye now.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submitted_job_is_processed() {
        let pipeline = pipeline_with(false);
        let queue = IngestQueue::spawn(pipeline.clone());

        queue.submit(job("t1")).unwrap();
        queue.close().await.unwrap();

        let transcripts = pipeline.store().get_user_transcripts("alice").await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].transcript_id, "t1");
    }

    #[tokio::test]
    async fn test_failed_job_records_error_instead_of_surfacing() {
        let pipeline = pipeline_with(true);
        let queue = IngestQueue::spawn(pipeline.clone());

        // submit succeeds even though processing will fail
        queue.submit(job("t2")).unwrap();
        queue.close().await.unwrap();

        // The failure left no metadata record behind.
        let transcripts = pipeline.store().get_user_transcripts("alice").await.unwrap();
        assert!(transcripts.is_empty());
    }
}
