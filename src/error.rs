//! Error types for Sitat.

use thiserror::Error;

/// Library-level error type for Sitat operations.
#[derive(Error, Debug)]
pub enum SitatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Metadata store error: {0}")]
    Store(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Access denied to transcript: {0}")]
    AccessDenied(String),

    #[error("Ingest queue error: {0}")]
    Ingest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Sitat operations.
pub type Result<T> = std::result::Result<T, SitatError>;
