//! Retrieval-augmented answering with timestamp citations.

mod engine;

pub use engine::{RagEngine, DEFAULT_TOP_K};

use serde::{Deserialize, Serialize};

/// A cited time range, in retrieval-rank order within a [`QueryResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampRange {
    /// Range start (`HH:MM:SS`).
    pub start: String,
    /// Range end (`HH:MM:SS`).
    pub end: String,
}

/// The answer to a query, with the timestamp ranges and raw texts of the
/// chunks that grounded it. Immutable once created; cached and logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Generated answer text.
    pub answer: String,
    /// Time ranges of the contributing chunks, retrieval-rank order.
    pub timestamps: Vec<TimestampRange>,
    /// Raw texts of the contributing chunks, same order.
    pub source_chunks: Vec<String>,
}
