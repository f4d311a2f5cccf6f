//! Local JSON-file metadata store.
//!
//! The whole store is one JSON document read and rewritten per operation.
//! Fine for a single process and modest volumes; the SQLite backend covers
//! anything beyond that.

use super::{MetadataStore, ProcessingError, QueryRecord, TranscriptMetadata};
use crate::error::Result;
use crate::rag::QueryResult;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    transcripts: HashMap<String, TranscriptMetadata>,
    queries: HashMap<String, QueryRecord>,
    query_history: HashMap<String, QueryRecord>,
    errors: HashMap<String, ProcessingError>,
}

/// File-backed metadata store.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the backing file.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the given file, creating parent
    /// directories as needed.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Local JSON store path: {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    fn read_data(&self) -> StoreData {
        // A missing or unreadable file is an empty store.
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => StoreData::default(),
        }
    }

    fn write_data(&self, data: &StoreData) -> Result<()> {
        let content = serde_json::to_string(data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn with_data<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.read_data();
        let result = f(&mut data);
        self.write_data(&data)?;
        Ok(result)
    }

    fn read_only<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        f(&self.read_data())
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn save_transcript_metadata(&self, metadata: &TranscriptMetadata) -> Result<()> {
        self.with_data(|data| {
            data.transcripts
                .insert(metadata.transcript_id.clone(), metadata.clone());
        })?;
        debug!("Saved transcript metadata: {}", metadata.transcript_id);
        Ok(())
    }

    async fn has_access(&self, user_id: &str, transcript_id: &str) -> Result<bool> {
        Ok(self.read_only(|data| {
            data.transcripts
                .get(transcript_id)
                .is_some_and(|t| t.user_id == user_id)
        }))
    }

    async fn get_cached_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        ttl: Duration,
    ) -> Result<Option<QueryResult>> {
        let now = Utc::now();
        Ok(self.read_only(|data| {
            data.queries
                .values()
                .filter(|record| {
                    record.user_id == user_id
                        && record.transcript_id == transcript_id
                        && record.query == query
                })
                .max_by_key(|record| record.timestamp)
                .filter(|record| {
                    now.signed_duration_since(record.timestamp)
                        .to_std()
                        .map(|age| age < ttl)
                        .unwrap_or(false)
                })
                .map(|record| record.response.clone())
        }))
    }

    async fn cache_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        response: &QueryResult,
    ) -> Result<()> {
        let record = QueryRecord::new(user_id, transcript_id, query, response);
        let query_id = record.query_id;
        self.with_data(|data| {
            data.queries.insert(query_id.to_string(), record);
        })?;
        debug!("Cached response: {}", query_id);
        Ok(())
    }

    async fn save_query_history(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        response: &QueryResult,
    ) -> Result<()> {
        let record = QueryRecord::new(user_id, transcript_id, query, response);
        let query_id = record.query_id;
        self.with_data(|data| {
            data.query_history.insert(query_id.to_string(), record);
        })?;
        debug!("Saved query history: {}", query_id);
        Ok(())
    }

    async fn get_query_history(
        &self,
        user_id: &str,
        transcript_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QueryRecord>> {
        Ok(self.read_only(|data| {
            let mut history: Vec<QueryRecord> = data
                .query_history
                .values()
                .filter(|record| {
                    record.user_id == user_id
                        && transcript_id.map_or(true, |t| record.transcript_id == t)
                })
                .cloned()
                .collect();

            history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            history.truncate(limit);
            history
        }))
    }

    async fn save_processing_error(
        &self,
        user_id: &str,
        transcript_id: &str,
        error: &str,
    ) -> Result<()> {
        let record = ProcessingError {
            user_id: user_id.to_string(),
            transcript_id: transcript_id.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        };
        self.with_data(|data| {
            data.errors.insert(transcript_id.to_string(), record);
        })?;
        debug!("Saved processing error: {}", transcript_id);
        Ok(())
    }

    async fn get_user_transcripts(&self, user_id: &str) -> Result<Vec<TranscriptMetadata>> {
        Ok(self.read_only(|data| {
            let mut transcripts: Vec<TranscriptMetadata> = data
                .transcripts
                .values()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect();

            transcripts.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
            transcripts
        }))
    }
}
