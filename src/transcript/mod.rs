//! Transcript segmentation.
//!
//! Turns raw timestamped text into ordered segments that the chunker can
//! consume.

mod parser;

pub use parser::parse_transcript;

use serde::{Deserialize, Serialize};

/// A parser-produced unit of transcript text, one per timestamp marker.
///
/// Timestamps are fixed-width `HH:MM:SS` strings carried as opaque,
/// order-comparable labels. Lexicographic ordering matches chronological
/// ordering only within a 24-hour span; there is no day rollover handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Timestamp of the marker that introduced this segment.
    pub start_time: String,
    /// Timestamp of the next marker, or `start_time` for the last segment.
    pub end_time: String,
    /// Text between this marker and the next, whitespace-trimmed.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new segment.
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }
}
