//! Timestamp-aware chunking.
//!
//! Merges parsed segments into one addressable buffer, applies size-bounded
//! overlapping splitting, and re-attaches a timestamp range to every
//! resulting chunk.

mod splitter;

pub use splitter::RecursiveSplitter;

use crate::transcript::TranscriptSegment;
use serde::{Deserialize, Serialize};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Sentinel used when a chunk overlaps no segment (empty buffer only).
const FALLBACK_TIMESTAMP: &str = "00:00:00";

/// A size-bounded, timestamp-annotated piece of transcript text, the
/// durable unit handed to the embedding/storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Chunk text, whitespace-trimmed.
    pub text: String,
    /// Start of the time range this chunk covers (`HH:MM:SS`).
    pub start_time: String,
    /// End of the time range this chunk covers (`HH:MM:SS`).
    pub end_time: String,
}

/// Binds a half-open character range `[start_pos, end_pos)` of the
/// assembled buffer to the segment that produced it. Built once per
/// chunking pass and discarded after chunk assembly.
struct TimestampMapEntry<'a> {
    start_pos: usize,
    end_pos: usize,
    start_time: &'a str,
    end_time: &'a str,
}

/// Split segments into overlapping, size-bounded chunks with timestamps.
///
/// Each segment's text is concatenated into a single buffer (one space
/// after every segment) while recording the character range it occupies.
/// The buffer is split with [`RecursiveSplitter`], each chunk is located at
/// its true position in the buffer, and each chunk takes its `start_time`
/// from the first segment it overlaps and its `end_time` from the last. A
/// chunk overlapping many short segments gets a correspondingly wide range;
/// that is intentional.
///
/// Deterministic for fixed inputs and parameters; no I/O; never fails.
pub fn chunk_segments(
    segments: &[TranscriptSegment],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<TranscriptChunk> {
    if segments.is_empty() {
        return Vec::new();
    }

    // Step 1: buffer assembly. Ranges are contiguous and non-decreasing:
    // entry i's end_pos equals entry i+1's start_pos.
    let mut buffer = String::new();
    let mut buffer_chars = 0usize;
    let mut timestamp_map = Vec::with_capacity(segments.len());

    for segment in segments {
        let start_pos = buffer_chars;
        buffer.push_str(&segment.text);
        buffer.push(' ');
        buffer_chars += segment.text.chars().count() + 1;

        timestamp_map.push(TimestampMapEntry {
            start_pos,
            end_pos: buffer_chars,
            start_time: &segment.start_time,
            end_time: &segment.end_time,
        });
    }

    // Step 2: size-bounded splitting.
    let splitter = RecursiveSplitter::new(chunk_size, chunk_overlap);
    let pieces = splitter.split(&buffer);

    // Step 3: timestamp re-attachment. Consecutive pieces share up to
    // chunk_overlap characters, so positions cannot be derived by summing
    // lengths; each piece is located at its true offset in the buffer. The
    // search resumes just past the previous piece's start, which is enough
    // because piece starts are strictly increasing. Map entries are never
    // mutated.
    let mut chunks = Vec::with_capacity(pieces.len());
    let mut search_from = 0usize;

    for piece in pieces {
        let byte_start = buffer[search_from..]
            .find(piece.as_str())
            .map(|rel| search_from + rel)
            .unwrap_or(search_from);
        let chunk_start = buffer[..byte_start].chars().count();
        let chunk_end = chunk_start + piece.chars().count();
        search_from = byte_start
            + buffer[byte_start..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());

        let overlapping: Vec<&TimestampMapEntry<'_>> = timestamp_map
            .iter()
            .filter(|entry| entry.start_pos < chunk_end && entry.end_pos > chunk_start)
            .collect();

        let (start_time, end_time) = match (overlapping.first(), overlapping.last()) {
            (Some(first), Some(last)) => {
                (first.start_time.to_string(), last.end_time.to_string())
            }
            _ => (FALLBACK_TIMESTAMP.to_string(), FALLBACK_TIMESTAMP.to_string()),
        };

        chunks.push(TranscriptChunk {
            text: piece.trim().to_string(),
            start_time,
            end_time,
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_transcript;

    fn timed(start: &str, end: &str, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    #[test]
    fn test_empty_segments_yield_no_chunks() {
        assert!(chunk_segments(&[], DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn test_two_segments_fit_in_one_chunk() {
        let segments = parse_transcript("[00:00:00] Hello world. [00:00:05] Goodbye now.");
        let chunks = chunk_segments(&segments, 1000, 200);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_time, "00:00:00");
        assert_eq!(chunks[0].end_time, "00:00:05");
        assert!(chunks[0].text.contains("Hello world."));
        assert!(chunks[0].text.contains("Goodbye now."));
    }

    #[test]
    fn test_short_buffer_spans_full_timestamp_range() {
        let segments = vec![
            timed("00:00:00", "00:01:00", "intro remarks"),
            timed("00:01:00", "00:02:00", "middle discussion"),
            timed("00:02:00", "00:02:00", "closing words"),
        ];

        let chunks = chunk_segments(&segments, 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_time, "00:00:00");
        assert_eq!(chunks[0].end_time, "00:02:00");
    }

    #[test]
    fn test_long_transcript_produces_bounded_ordered_chunks() {
        let segments: Vec<TranscriptSegment> = (0..30)
            .map(|i| {
                let words: Vec<String> = (0..12).map(|w| format!("seg{i:02}word{w:02}")).collect();
                timed(
                    &format!("00:{i:02}:00"),
                    &format!("00:{:02}:00", i + 1),
                    &words.join(" "),
                )
            })
            .collect();

        let chunks = chunk_segments(&segments, 1000, 200);
        assert!(chunks.len() > 1);

        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
            assert!(!chunk.text.is_empty());
        }

        // Chunk start times follow buffer order.
        for pair in chunks.windows(2) {
            assert!(pair[0].start_time <= pair[1].start_time);
        }

        // Every segment's content survives into some chunk (modulo overlap).
        for i in 0..30 {
            let marker = format!("seg{i:02}word00");
            assert!(
                chunks.iter().any(|c| c.text.contains(&marker)),
                "segment {i} content lost"
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap_for_long_buffers() {
        let segments: Vec<TranscriptSegment> = (0..20)
            .map(|i| {
                let words: Vec<String> = (0..15).map(|w| format!("s{i:02}w{w:02}")).collect();
                timed(
                    &format!("00:{i:02}:00"),
                    &format!("00:{:02}:00", i + 1),
                    &words.join(" "),
                )
            })
            .collect();

        let chunks = chunk_segments(&segments, 400, 100);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let head: String = pair[1].text.chars().take(6).collect();
            assert!(
                pair[0].text.contains(&head),
                "chunks do not overlap: {:?} / {:?}",
                pair[0].text,
                pair[1].text
            );
        }
    }

    #[test]
    fn test_chunk_covering_many_segments_takes_widest_range() {
        // Many short segments merge into one chunk; the chunk's range runs
        // from the first segment's start to the last segment's end.
        let segments: Vec<TranscriptSegment> = (0..10)
            .map(|i| {
                timed(
                    &format!("00:00:{i:02}"),
                    &format!("00:00:{:02}", i + 1),
                    &format!("utterance number {i}"),
                )
            })
            .collect();

        let chunks = chunk_segments(&segments, 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_time, "00:00:00");
        assert_eq!(chunks[0].end_time, "00:00:10");
    }

    #[test]
    fn test_overlapping_chunks_keep_real_segment_times() {
        // Merged chunks share overlap characters; re-attachment must not
        // desynchronize from the buffer because of that. Every chunk maps
        // back to real segment times, and the last chunk still reaches the
        // final segment.
        let segments: Vec<TranscriptSegment> = (0..30)
            .map(|i| {
                let words: Vec<String> = (0..12).map(|w| format!("seg{i:02}word{w:02}")).collect();
                timed(
                    &format!("00:{i:02}:00"),
                    &format!("00:{:02}:00", i + 1),
                    &words.join(" "),
                )
            })
            .collect();

        let chunks = chunk_segments(&segments, 1000, 200);
        assert!(chunks.len() > 1);

        for chunk in &chunks {
            assert!(
                !(chunk.start_time == FALLBACK_TIMESTAMP && chunk.end_time == FALLBACK_TIMESTAMP),
                "chunk lost its timestamps: {:?}",
                chunk.text
            );
        }

        assert_eq!(chunks.last().unwrap().end_time, "00:30:00");
    }

    #[test]
    fn test_chunking_is_idempotent() {
        let segments: Vec<TranscriptSegment> = (0..25)
            .map(|i| {
                timed(
                    &format!("01:{i:02}:00"),
                    &format!("01:{:02}:30", i),
                    &format!("deterministic content block number {i} with several words"),
                )
            })
            .collect();

        let first = chunk_segments(&segments, 300, 60);
        let second = chunk_segments(&segments, 300, 60);
        assert_eq!(first, second);
    }

    #[test]
    fn test_segments_with_empty_text_fall_back_cleanly() {
        let segments = vec![timed("00:00:00", "00:00:00", "")];
        let chunks = chunk_segments(&segments, 1000, 200);

        // A single empty segment assembles to a whitespace-only buffer,
        // which splits into nothing.
        assert!(chunks.is_empty());
    }
}
