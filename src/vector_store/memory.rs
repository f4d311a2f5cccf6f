//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let mut docs = self.documents.write().unwrap();
        docs.insert(doc.id.to_string(), doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().unwrap();
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<SearchResult> = docs
            .values()
            .filter(|doc| doc.collection == collection)
            .map(|doc| SearchResult {
                document: doc.clone(),
                score: cosine_similarity(query_embedding, &doc.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_collection(&self, collection: &str) -> Result<usize> {
        let mut docs = self.documents.write().unwrap();
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.collection != collection);
        Ok(initial_len - docs.len())
    }

    async fn collection_count(&self, collection: &str) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.values().filter(|d| d.collection == collection).count())
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(collection: &str, content: &str, embedding: Vec<f32>, order: i32) -> Document {
        Document::new(
            collection.to_string(),
            content.to_string(),
            "00:00:00".to_string(),
            "00:01:00".to_string(),
            embedding,
            order,
        )
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                doc("alice_t1", "Hello world", vec![1.0, 0.0, 0.0], 0),
                doc("alice_t1", "Goodbye world", vec![0.0, 1.0, 0.0], 1),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search("alice_t1", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].document.content, "Hello world");
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_collection() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                doc("alice_t1", "alice content", vec![1.0, 0.0], 0),
                doc("bob_t2", "bob content", vec![1.0, 0.0], 0),
            ])
            .await
            .unwrap();

        let results = store.search("alice_t1", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.collection, "alice_t1");

        assert_eq!(store.delete_collection("alice_t1").await.unwrap(), 1);
        assert_eq!(store.collection_count("alice_t1").await.unwrap(), 0);
        assert_eq!(store.collection_count("bob_t2").await.unwrap(), 1);
    }
}
