//! Timestamp marker parsing.
//!
//! Splits raw transcript text on `[HH:MM:SS]` markers. Everything between
//! one marker and the next (or end of input) is that marker's payload,
//! newlines included.

use super::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

/// Marker pattern: `[HH:MM:SS]`, 24-hour, zero-padded.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[(\d{2}:\d{2}:\d{2})\]").unwrap())
}

/// Parse raw transcript text into ordered segments.
///
/// For segment *i*, `end_time` is the timestamp of segment *i+1* if one
/// exists, else the segment's own `start_time` (a zero-width interval; the
/// transcript carries no upper bound for the final marker).
///
/// Content with zero markers yields an empty Vec; callers treat that as
/// "nothing to chunk", not an error. Timestamps are not validated for
/// monotonicity, malformed orderings pass through verbatim.
pub fn parse_transcript(content: &str) -> Vec<TranscriptSegment> {
    struct Marker<'a> {
        start: usize,
        end: usize,
        timestamp: &'a str,
    }

    let markers: Vec<Marker<'_>> = marker_regex()
        .captures_iter(content)
        .map(|cap| {
            let m = cap.get(0).unwrap();
            Marker {
                start: m.start(),
                end: m.end(),
                timestamp: cap.get(1).unwrap().as_str(),
            }
        })
        .collect();

    let mut segments = Vec::with_capacity(markers.len());

    for (i, marker) in markers.iter().enumerate() {
        let next = markers.get(i + 1);
        let text_end = next.map(|m| m.start).unwrap_or(content.len());
        let end_time = next.map(|m| m.timestamp).unwrap_or(marker.timestamp);

        segments.push(TranscriptSegment::new(
            marker.timestamp,
            end_time,
            content[marker.end..text_end].trim(),
        ));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_segments() {
        let segments = parse_transcript("[00:00:00] Hello world. [00:00:05] Goodbye now.");

        assert_eq!(
            segments,
            vec![
                TranscriptSegment::new("00:00:00", "00:00:05", "Hello world."),
                TranscriptSegment::new("00:00:05", "00:00:05", "Goodbye now."),
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_unmarked_input() {
        assert!(parse_transcript("").is_empty());
        assert!(parse_transcript("no markers here").is_empty());
    }

    #[test]
    fn test_segment_count_matches_marker_count() {
        let content = "[00:00:00] a [00:01:00] b [00:02:00] c [00:03:00] d";
        let segments = parse_transcript(content);
        assert_eq!(segments.len(), 4);

        for segment in &segments {
            assert_eq!(segment.start_time.len(), 8);
            assert_eq!(segment.end_time.len(), 8);
        }
    }

    #[test]
    fn test_end_time_chains_to_next_start() {
        let segments = parse_transcript("[00:00:10] one [00:00:20] two [00:00:30] three");

        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        let last = segments.last().unwrap();
        assert_eq!(last.end_time, last.start_time);
    }

    #[test]
    fn test_multiline_payload_is_preserved() {
        let segments = parse_transcript("[00:00:00] first line\nsecond line\n\n[00:00:09] next");

        assert_eq!(segments[0].text, "first line\nsecond line");
        assert_eq!(segments[1].text, "next");
    }

    #[test]
    fn test_out_of_order_timestamps_pass_through() {
        // No chronological validation happens here.
        let segments = parse_transcript("[00:05:00] later [00:01:00] earlier");

        assert_eq!(segments[0].start_time, "00:05:00");
        assert_eq!(segments[0].end_time, "00:01:00");
        assert_eq!(segments[1].start_time, "00:01:00");
    }

    #[test]
    fn test_leading_text_before_first_marker_is_ignored() {
        let segments = parse_transcript("preamble text [00:00:00] body");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "body");
    }

    #[test]
    fn test_marker_with_empty_payload() {
        let segments = parse_transcript("[00:00:00][00:00:05] tail");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "");
        assert_eq!(segments[1].text, "tail");
    }
}
