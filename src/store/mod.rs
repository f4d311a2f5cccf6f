//! Metadata and query store abstraction.
//!
//! Key-value persistence for transcript metadata, TTL-cached query
//! responses, query history, and processing errors, plus per-user access
//! checks. Two backends (a local JSON file and a SQLite document store)
//! are interchangeable; callers must not be able to tell them apart.

mod json_file;
mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::rag::QueryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Metadata recorded for each processed transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Owning user.
    pub user_id: String,
    /// Transcript identifier.
    pub transcript_id: String,
    /// Display name given at upload.
    pub name: String,
    /// When the transcript was uploaded.
    pub upload_date: DateTime<Utc>,
    /// Number of chunks produced by the chunker.
    pub chunk_count: usize,
    /// Processing status ("processed").
    pub status: String,
}

/// A recorded query with its response, used for both the cache and the
/// history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Unique record ID.
    pub query_id: Uuid,
    /// User who asked.
    pub user_id: String,
    /// Transcript queried.
    pub transcript_id: String,
    /// The query text, verbatim (cache keys are exact-match).
    pub query: String,
    /// The generated response.
    pub response: QueryResult,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

impl QueryRecord {
    /// Create a record stamped with the current time.
    pub fn new(user_id: &str, transcript_id: &str, query: &str, response: &QueryResult) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            transcript_id: transcript_id.to_string(),
            query: query.to_string(),
            response: response.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// A per-transcript processing failure, recorded by the ingest worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingError {
    /// Owning user.
    pub user_id: String,
    /// Transcript that failed.
    pub transcript_id: String,
    /// Error message.
    pub error: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Trait for metadata store implementations.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Record metadata for a processed transcript.
    async fn save_transcript_metadata(&self, metadata: &TranscriptMetadata) -> Result<()>;

    /// Whether `user_id` owns `transcript_id`.
    async fn has_access(&self, user_id: &str, transcript_id: &str) -> Result<bool>;

    /// Look up a cached response for the exact (user, transcript, query)
    /// triple, returning it only if younger than `ttl`.
    async fn get_cached_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        ttl: Duration,
    ) -> Result<Option<QueryResult>>;

    /// Cache a query response.
    async fn cache_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        response: &QueryResult,
    ) -> Result<()>;

    /// Append to the query history log.
    async fn save_query_history(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        response: &QueryResult,
    ) -> Result<()>;

    /// Query history for a user, most recent first, optionally filtered by
    /// transcript.
    async fn get_query_history(
        &self,
        user_id: &str,
        transcript_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QueryRecord>>;

    /// Record a processing failure for a transcript.
    async fn save_processing_error(
        &self,
        user_id: &str,
        transcript_id: &str,
        error: &str,
    ) -> Result<()>;

    /// All transcripts owned by a user.
    async fn get_user_transcripts(&self, user_id: &str) -> Result<Vec<TranscriptMetadata>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::TimestampRange;

    fn sample_response(answer: &str) -> QueryResult {
        QueryResult {
            answer: answer.to_string(),
            timestamps: vec![TimestampRange {
                start: "00:00:00".to_string(),
                end: "00:00:05".to_string(),
            }],
            source_chunks: vec!["Hello world.".to_string()],
        }
    }

    fn sample_metadata(user_id: &str, transcript_id: &str) -> TranscriptMetadata {
        TranscriptMetadata {
            user_id: user_id.to_string(),
            transcript_id: transcript_id.to_string(),
            name: "standup".to_string(),
            upload_date: Utc::now(),
            chunk_count: 3,
            status: "processed".to_string(),
        }
    }

    /// Both backends must produce identical observable behavior; every
    /// assertion here runs against each of them.
    async fn exercise_store(store: &dyn MetadataStore) {
        // Metadata and access control.
        store
            .save_transcript_metadata(&sample_metadata("alice", "t1"))
            .await
            .unwrap();

        assert!(store.has_access("alice", "t1").await.unwrap());
        assert!(!store.has_access("bob", "t1").await.unwrap());
        assert!(!store.has_access("alice", "missing").await.unwrap());

        let transcripts = store.get_user_transcripts("alice").await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].name, "standup");
        assert_eq!(transcripts[0].chunk_count, 3);
        assert!(store.get_user_transcripts("bob").await.unwrap().is_empty());

        // Cache: exact-match hit within TTL, miss on different query,
        // expiry at TTL zero.
        let response = sample_response("the answer");
        store
            .cache_response("alice", "t1", "what was said?", &response)
            .await
            .unwrap();

        let hit = store
            .get_cached_response("alice", "t1", "what was said?", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(hit.unwrap().answer, "the answer");

        let miss = store
            .get_cached_response("alice", "t1", "a different query", Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(miss.is_none());

        let expired = store
            .get_cached_response("alice", "t1", "what was said?", Duration::from_secs(0))
            .await
            .unwrap();
        assert!(expired.is_none());

        // History: recency order and limit.
        store
            .save_query_history("alice", "t1", "first question", &sample_response("a1"))
            .await
            .unwrap();
        store
            .save_query_history("alice", "t1", "second question", &sample_response("a2"))
            .await
            .unwrap();
        store
            .save_query_history("alice", "t2", "other transcript", &sample_response("a3"))
            .await
            .unwrap();

        let history = store.get_query_history("alice", None, 50).await.unwrap();
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }

        let filtered = store
            .get_query_history("alice", Some("t1"), 50)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);

        let limited = store.get_query_history("alice", None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        // Processing errors are recorded state.
        store
            .save_processing_error("alice", "t3", "embedding provider unreachable")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_json_file_store_behavior() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(&dir.path().join("store.json")).unwrap();
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_behavior() {
        let store = SqliteStore::in_memory().unwrap();
        exercise_store(&store).await;
    }
}
