//! Processing pipeline for Sitat.
//!
//! Coordinates parse → chunk → embed → persist at ingest time, and
//! access check → cache → answer → record at query time. All collaborators
//! are constructed once and injected; nothing is looked up globally.

use crate::chunking::chunk_segments;
use crate::config::{Settings, StoreBackend};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SitatError};
use crate::rag::{QueryResult, RagEngine};
use crate::store::{JsonFileStore, MetadataStore, SqliteStore, TranscriptMetadata};
use crate::transcript::parse_transcript;
use crate::vector_store::{collection_id, Document, SqliteVectorStore, VectorStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main Sitat pipeline.
pub struct Pipeline {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    store: Arc<dyn MetadataStore>,
    engine: RagEngine,
}

impl Pipeline {
    /// Create a pipeline with collaborators built from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let vector_store: Arc<dyn VectorStore> =
            Arc::new(SqliteVectorStore::new(&settings.vector_sqlite_path())?);

        let store = open_metadata_store(&settings)?;

        let engine = RagEngine::new(
            vector_store.clone(),
            embedder.clone(),
            &settings.rag.model,
            settings.rag.top_k,
        );

        Ok(Self {
            settings,
            embedder,
            vector_store,
            store,
            engine,
        })
    }

    /// Create a pipeline with custom collaborators (used by tests and
    /// embedders of the library).
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        store: Arc<dyn MetadataStore>,
    ) -> Self {
        let engine = RagEngine::new(
            vector_store.clone(),
            embedder.clone(),
            &settings.rag.model,
            settings.rag.top_k,
        );

        Self {
            settings,
            embedder,
            vector_store,
            store,
            engine,
        }
    }

    /// Get the metadata store handle.
    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a raw transcript: parse, chunk, embed, and persist.
    ///
    /// Returns the number of chunks indexed. A transcript with no
    /// recognizable markers produces zero chunks and is still recorded as
    /// processed.
    #[instrument(skip(self, content), fields(transcript_id = %transcript_id))]
    pub async fn process_transcript(
        &self,
        content: &str,
        user_id: &str,
        transcript_id: &str,
        name: &str,
    ) -> Result<usize> {
        let segments = parse_transcript(content);
        info!("Parsed {} segments", segments.len());

        let chunks = chunk_segments(
            &segments,
            self.settings.chunking.chunk_size,
            self.settings.chunking.chunk_overlap,
        );
        info!("Created {} chunks", chunks.len());

        let collection = collection_id(user_id, transcript_id);
        let chunk_count = chunks.len();

        if !chunks.is_empty() {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            let documents: Vec<Document> = chunks
                .into_iter()
                .zip(embeddings)
                .enumerate()
                .map(|(order, (chunk, embedding))| {
                    Document::new(
                        collection.clone(),
                        chunk.text,
                        chunk.start_time,
                        chunk.end_time,
                        embedding,
                        order as i32,
                    )
                })
                .collect();

            // Re-ingest replaces any previous index for this transcript.
            self.vector_store.delete_collection(&collection).await?;
            self.vector_store.upsert_batch(&documents).await?;
        }

        self.store
            .save_transcript_metadata(&TranscriptMetadata {
                user_id: user_id.to_string(),
                transcript_id: transcript_id.to_string(),
                name: name.to_string(),
                upload_date: Utc::now(),
                chunk_count,
                status: "processed".to_string(),
            })
            .await?;

        info!("Processed transcript with {} chunks", chunk_count);
        Ok(chunk_count)
    }

    /// Answer a query against a transcript the user owns.
    ///
    /// The access check runs before any retrieval work. Cached responses
    /// within the configured TTL are returned verbatim. Failures to record
    /// the result never fail the query itself.
    #[instrument(skip(self), fields(transcript_id = %transcript_id))]
    pub async fn query(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
    ) -> Result<QueryResult> {
        if !self.store.has_access(user_id, transcript_id).await? {
            return Err(SitatError::AccessDenied(transcript_id.to_string()));
        }

        let ttl = self.settings.cache_ttl();
        if let Some(cached) = self
            .store
            .get_cached_response(user_id, transcript_id, query, ttl)
            .await?
        {
            info!("Returning cached response");
            return Ok(cached);
        }

        let collection = collection_id(user_id, transcript_id);
        let result = self.engine.answer(&collection, query).await?;

        if let Err(e) = self
            .store
            .cache_response(user_id, transcript_id, query, &result)
            .await
        {
            warn!("Failed to cache response: {}", e);
        }
        if let Err(e) = self
            .store
            .save_query_history(user_id, transcript_id, query, &result)
            .await
        {
            warn!("Failed to save query history: {}", e);
        }

        Ok(result)
    }
}

/// Open the configured metadata store backend.
///
/// A SQLite backend that cannot be opened is a supported state, not an
/// error: the pipeline falls back to the file-backed store.
fn open_metadata_store(settings: &Settings) -> Result<Arc<dyn MetadataStore>> {
    match settings.store.backend {
        StoreBackend::Json => Ok(Arc::new(JsonFileStore::new(&settings.store_json_path())?)),
        StoreBackend::Sqlite => match SqliteStore::new(&settings.store_sqlite_path()) {
            Ok(store) => Ok(Arc::new(store)),
            Err(e) => {
                warn!(
                    "SQLite store unavailable ({}), falling back to JSON file store",
                    e
                );
                Ok(Arc::new(JsonFileStore::new(&settings.store_json_path())?))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::store::SqliteStore;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Deterministic embedder: maps text to a tiny bag-of-letters vector.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            let mut v = vec![0.0f32; 4];
            for (i, b) in text.bytes().enumerate() {
                v[i % 4] += b as f32;
            }
            Ok(v)
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            4
        }
    }

    fn test_pipeline() -> Pipeline {
        Pipeline::with_components(
            Settings::default(),
            Arc::new(StubEmbedder),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(SqliteStore::in_memory().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_process_transcript_indexes_chunks_and_metadata() {
        let pipeline = test_pipeline();

        let count = pipeline
            .process_transcript(
                "[00:00:00] Hello world. [00:00:05] Goodbye now.",
                "alice",
                "t1",
                "greeting",
            )
            .await
            .unwrap();

        assert_eq!(count, 1);

        let transcripts = pipeline.store().get_user_transcripts("alice").await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].chunk_count, 1);
        assert_eq!(transcripts[0].status, "processed");
    }

    #[tokio::test]
    async fn test_process_transcript_without_markers_is_not_an_error() {
        let pipeline = test_pipeline();

        let count = pipeline
            .process_transcript("plain notes, no timestamps", "alice", "t2", "notes")
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(pipeline.store().has_access("alice", "t2").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_rejects_foreign_transcripts_before_retrieval() {
        let pipeline = test_pipeline();

        pipeline
            .process_transcript("[00:00:00] secret content", "alice", "t1", "private")
            .await
            .unwrap();

        let err = pipeline.query("bob", "t1", "what is said?").await.unwrap_err();
        assert!(matches!(err, SitatError::AccessDenied(_)));
    }
}
