//! SQLite document-store backend for metadata, cache, and history.
//!
//! Plays the role the managed document store plays in a hosted deployment;
//! observable behavior matches [`super::JsonFileStore`] exactly.

use super::{MetadataStore, QueryRecord, TranscriptMetadata};
use crate::error::{Result, SitatError};
use crate::rag::QueryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transcripts (
    transcript_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    upload_date TEXT NOT NULL,
    chunk_count INTEGER NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transcripts_user ON transcripts(user_id);

CREATE TABLE IF NOT EXISTS query_cache (
    query_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    transcript_id TEXT NOT NULL,
    query TEXT NOT NULL,
    response TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_query_cache_key ON query_cache(user_id, transcript_id, query);

CREATE TABLE IF NOT EXISTS query_history (
    query_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    transcript_id TEXT NOT NULL,
    query TEXT NOT NULL,
    response TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_query_history_user ON query_history(user_id, timestamp);

CREATE TABLE IF NOT EXISTS processing_errors (
    transcript_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    error TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
"#;

/// SQLite-backed metadata store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite metadata store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SitatError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        raw.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now())
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueryRecord> {
        let query_id: String = row.get(0)?;
        let response_json: String = row.get(4)?;
        let timestamp: String = row.get(5)?;

        let response: QueryResult = serde_json::from_str(&response_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(QueryRecord {
            query_id: query_id.parse::<Uuid>().unwrap_or_default(),
            user_id: row.get(1)?,
            transcript_id: row.get(2)?,
            query: row.get(3)?,
            response,
            timestamp: Self::parse_timestamp(&timestamp),
        })
    }

    fn insert_record(&self, table: &str, record: &QueryRecord) -> Result<()> {
        let conn = self.lock()?;
        let response_json = serde_json::to_string(&record.response)?;

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {table}
                 (query_id, user_id, transcript_id, query, response, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                record.query_id.to_string(),
                record.user_id,
                record.transcript_id,
                record.query,
                response_json,
                record.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    #[instrument(skip(self, metadata), fields(transcript_id = %metadata.transcript_id))]
    async fn save_transcript_metadata(&self, metadata: &TranscriptMetadata) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO transcripts
            (transcript_id, user_id, name, upload_date, chunk_count, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                metadata.transcript_id,
                metadata.user_id,
                metadata.name,
                metadata.upload_date.to_rfc3339(),
                metadata.chunk_count as i64,
                metadata.status,
            ],
        )?;

        debug!("Saved transcript metadata");
        Ok(())
    }

    async fn has_access(&self, user_id: &str, transcript_id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let owner: Option<String> = conn
            .query_row(
                "SELECT user_id FROM transcripts WHERE transcript_id = ?1",
                params![transcript_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(owner.as_deref() == Some(user_id))
    }

    async fn get_cached_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        ttl: Duration,
    ) -> Result<Option<QueryResult>> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                r#"
                SELECT response, timestamp FROM query_cache
                WHERE user_id = ?1 AND transcript_id = ?2 AND query = ?3
                ORDER BY timestamp DESC LIMIT 1
                "#,
                params![user_id, transcript_id, query],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((response_json, timestamp)) = row else {
            return Ok(None);
        };

        let cached_at = Self::parse_timestamp(&timestamp);
        let fresh = Utc::now()
            .signed_duration_since(cached_at)
            .to_std()
            .map(|age| age < ttl)
            .unwrap_or(false);

        if !fresh {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&response_json)?))
    }

    async fn cache_response(
        &self,
        user_id: &str,
        transcript_id: &str,
        query: &str,
        response: &QueryResult,
    ) -> Result<()> {
        let record = QueryRecord::new(user_id, transcript_id, query, response);
        self.insert_record("query_cache", &record)?;
        debug!("Cached response: {}", record.query_id);
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
        self.insert_record("query_history", &record)?;
        debug!("Saved query history: {}", record.query_id);
        Ok(())
    }

    async fn get_query_history(
        &self,
        user_id: &str,
        transcript_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QueryRecord>> {
        let conn = self.lock()?;

        let mut records = Vec::new();

        match transcript_id {
            Some(transcript_id) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT query_id, user_id, transcript_id, query, response, timestamp
                    FROM query_history
                    WHERE user_id = ?1 AND transcript_id = ?2
                    ORDER BY timestamp DESC LIMIT ?3
                    "#,
                )?;
                let rows = stmt.query_map(
                    params![user_id, transcript_id, limit as i64],
                    Self::row_to_record,
                )?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT query_id, user_id, transcript_id, query, response, timestamp
                    FROM query_history
                    WHERE user_id = ?1
                    ORDER BY timestamp DESC LIMIT ?2
                    "#,
                )?;
                let rows = stmt.query_map(params![user_id, limit as i64], Self::row_to_record)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }

        Ok(records)
    }

    async fn save_processing_error(
        &self,
        user_id: &str,
        transcript_id: &str,
        error: &str,
    ) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO processing_errors
            (transcript_id, user_id, error, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![transcript_id, user_id, error, Utc::now().to_rfc3339()],
        )?;

        debug!("Saved processing error: {}", transcript_id);
        Ok(())
    }

    async fn get_user_transcripts(&self, user_id: &str) -> Result<Vec<TranscriptMetadata>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT transcript_id, user_id, name, upload_date, chunk_count, status
            FROM transcripts WHERE user_id = ?1
            ORDER BY upload_date DESC
            "#,
        )?;

        let transcripts = stmt
            .query_map(params![user_id], |row| {
                let upload_date: String = row.get(3)?;
                let chunk_count: i64 = row.get(4)?;
                Ok(TranscriptMetadata {
                    transcript_id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    upload_date: Self::parse_timestamp(&upload_date),
                    chunk_count: chunk_count as usize,
                    status: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(transcripts)
    }
}
