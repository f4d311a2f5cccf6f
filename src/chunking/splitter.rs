//! Recursive size-bounded text splitting.
//!
//! Splits text into pieces of at most `chunk_size` characters with up to
//! `chunk_overlap` characters shared between consecutive pieces. Split
//! points are chosen preferentially at paragraph boundaries, then line
//! boundaries, then spaces, then arbitrary character boundaries, so a word
//! is only ever cut when nothing larger fits.

use std::collections::VecDeque;

/// Recursive character splitter with overlap.
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter with the standard separator ladder
    /// (`"\n\n"`, `"\n"`, `" "`, `""`).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }

    /// Split `text` into overlapping, size-bounded pieces.
    ///
    /// Lengths are measured in characters. Each returned piece is
    /// whitespace-trimmed; empty pieces are dropped. Fully deterministic.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // The first separator that occurs in the text wins; the empty
        // separator always matches and splits into single characters.
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = &separators[position];
        let remaining = &separators[position + 1..];

        let pieces = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
            } else {
                if !pending.is_empty() {
                    chunks.extend(self.merge(&pending));
                    pending.clear();
                }
                if remaining.is_empty() {
                    // Forced: a single unbreakable run longer than the bound.
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Greedy window merge: pack pieces until the next one would exceed
    /// `chunk_size`, emit the window, then slide it forward keeping at most
    /// `chunk_overlap` characters of tail as the start of the next chunk.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<&String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                let doc = join_window(&window);
                if !doc.is_empty() {
                    docs.push(doc);
                }
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        let doc = join_window(&window);
        if !doc.is_empty() {
            docs.push(doc);
        }

        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_window(window: &VecDeque<&String>) -> String {
    window
        .iter()
        .map(|s| s.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split on `separator`, keeping the separator attached to the piece that
/// follows it, so that concatenating the pieces reconstructs the input.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let parts: Vec<&str> = text.split(separator).collect();
    let mut pieces = Vec::with_capacity(parts.len());

    for (i, part) in parts.iter().enumerate() {
        let piece = if i == 0 {
            (*part).to_string()
        } else {
            format!("{separator}{part}")
        };
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }

    pieces
}
