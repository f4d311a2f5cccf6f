//! Vector store abstraction.
//!
//! Embedded chunks are partitioned by an opaque collection identifier
//! derived from `(user_id, transcript_id)`; retrieval never crosses
//! collections.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derive the collection identifier a transcript's chunks are stored under.
pub fn collection_id(user_id: &str, transcript_id: &str) -> String {
    format!("{}_{}", user_id, transcript_id)
}

/// An embedded chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Collection this document belongs to.
    pub collection: String,
    /// Chunk text.
    pub content: String,
    /// Start of the chunk's time range (`HH:MM:SS`).
    pub start_time: String,
    /// End of the chunk's time range (`HH:MM:SS`).
    pub end_time: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk in the transcript.
    pub chunk_order: i32,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(
        collection: String,
        content: String,
        start_time: String,
        end_time: String,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection,
            content,
            start_time,
            end_time,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a document with its embedding.
    async fn upsert(&self, doc: &Document) -> Result<()>;

    /// Bulk upsert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Return the `limit` documents nearest to `query_embedding` within a
    /// collection, ranked by similarity.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Delete all documents in a collection. Returns the number removed.
    async fn delete_collection(&self, collection: &str) -> Result<usize>;

    /// Number of documents in a collection.
    async fn collection_count(&self, collection: &str) -> Result<usize>;

    /// Total document count across all collections.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_collection_id_derivation() {
        assert_eq!(collection_id("alice", "t-123"), "alice_t-123");
    }
}
