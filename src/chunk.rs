//! Token-window text chunker.
//!
//! Splits document body text into overlapping windows of at most
//! `max_tokens` tokens, measured with the `cl100k_base` BPE. Windows start
//! at offsets `0, S-O, 2(S-O), …` where `S` is the window size and `O` the
//! overlap, and generation stops once a window reaches the end of the token
//! stream.
//!
//! # Guarantees
//!
//! - Every token belongs to at least one chunk.
//! - Consecutive chunks share exactly `O` tokens.
//! - Only the final chunk may be shorter than `S`.
//! - An empty body produces no chunks.
//!
//! # Example
//!
//! ```rust
//! use note_recall::chunk::window_ranges;
//!
//! let windows = window_ranges(10, 4, 1);
//! assert_eq!(windows, vec![0..4, 3..7, 6..10]);
//! ```

use std::ops::Range;
use tiktoken_rs::CoreBPE;

use crate::config::ChunkingConfig;
use crate::error::{RecallError, Result};

/// A window of a document body, decoded back to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Ordinal of the chunk within its document, starting at 0.
    pub index: usize,
    pub text: String,
    /// Token offsets covered by this chunk.
    pub tokens: Range<usize>,
}

pub struct Chunker {
    bpe: CoreBPE,
    max_tokens: usize,
    overlap_tokens: usize,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        if config.max_tokens == 0 || config.overlap_tokens >= config.max_tokens {
            return Err(RecallError::Tokenizer(format!(
                "invalid window: max_tokens={} overlap_tokens={}",
                config.max_tokens, config.overlap_tokens
            )));
        }
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| RecallError::Tokenizer(e.to_string()))?;
        Ok(Self {
            bpe,
            max_tokens: config.max_tokens,
            overlap_tokens: config.overlap_tokens,
        })
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split `text` into overlapping token windows.
    pub fn chunk_text(&self, text: &str) -> Vec<TextChunk> {
        let tokens = self.bpe.encode_ordinary(text);

        window_ranges(tokens.len(), self.max_tokens, self.overlap_tokens)
            .into_iter()
            .enumerate()
            .map(|(index, range)| TextChunk {
                index,
                text: self.decode(&tokens[range.clone()]),
                tokens: range,
            })
            .collect()
    }

    /// Decode a window at the byte level. Only a character cut by the
    /// window edge itself becomes U+FFFD; everything inside stays intact.
    fn decode(&self, tokens: &[usize]) -> String {
        String::from_utf8_lossy(&self.bpe._decode_native(tokens)).into_owned()
    }
}

/// Compute token windows of `size` with `overlap` over `len` tokens.
///
/// Panics in debug builds if `overlap >= size`; [`Chunker::new`] rejects
/// such configurations up front.
pub fn window_ranges(len: usize, size: usize, overlap: usize) -> Vec<Range<usize>> {
    debug_assert!(overlap < size, "overlap must be smaller than window size");
    let step = size - overlap;

    let mut windows = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + size).min(len);
        windows.push(start..end);
        if end == len {
            break;
        }
        start += step;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max_tokens: usize, overlap_tokens: usize) -> Chunker {
        Chunker::new(&ChunkingConfig {
            max_tokens,
            overlap_tokens,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_input_yields_no_windows() {
        assert!(window_ranges(0, 300, 50).is_empty());
        assert!(chunker(300, 50).chunk_text("").is_empty());
    }

    #[test]
    fn test_short_input_single_window() {
        assert_eq!(window_ranges(120, 300, 50), vec![0..120]);
    }

    #[test]
    fn test_exact_fit_single_window() {
        assert_eq!(window_ranges(300, 300, 50), vec![0..300]);
    }

    #[test]
    fn test_windows_cover_and_overlap_exactly() {
        for &(len, size, overlap) in &[(1000, 300, 50), (551, 300, 50), (37, 8, 3), (9, 2, 1)] {
            let windows = window_ranges(len, size, overlap);

            assert_eq!(windows.first().unwrap().start, 0);
            assert_eq!(windows.last().unwrap().end, len);

            for pair in windows.windows(2) {
                assert_eq!(pair[0].end - pair[1].start, overlap, "len={len}");
                assert_eq!(pair[0].len(), size);
            }
            for w in &windows {
                assert!(w.len() <= size);
            }
        }
    }

    #[test]
    fn test_zero_overlap_partitions() {
        assert_eq!(window_ranges(7, 3, 0), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn test_chunk_indices_contiguous() {
        let text = (0..400)
            .map(|i| format!("set {} of squats", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunker(40, 10).chunk_text(&text);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i, "Index mismatch at position {}", i);
            assert!(!c.text.is_empty());
        }
    }

    #[test]
    fn test_chunks_follow_token_windows() {
        let c = chunker(16, 4);
        let text = "Bench press 5x5 at 80kg, then overhead press 3x8, dips to failure, \
                    cable flyes 3x12 and triceps pushdowns 4x10 to finish the session.";
        let total = c.count_tokens(text);
        let chunks = c.chunk_text(text);
        let expected = window_ranges(total, 16, 4);
        assert_eq!(chunks.len(), expected.len());
        for (chunk, range) in chunks.iter().zip(expected) {
            assert_eq!(chunk.tokens, range);
        }
    }

    #[test]
    fn test_single_window_round_trips_text() {
        let text = "Bench press 5x5";
        let chunks = chunker(300, 50).chunk_text(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_multibyte_characters_survive_window_edges() {
        let text = format!("Felt strong today {} then stretched", "💪".repeat(12));
        let chunks = chunker(8, 2).chunk_text(&text);
        assert!(chunks.len() > 1);

        for c in &chunks {
            let core = c.text.trim_matches(char::REPLACEMENT_CHARACTER);
            assert!(
                !core.contains(char::REPLACEMENT_CHARACTER),
                "chunk {} corrupted inside: {:?}",
                c.index,
                c.text
            );
            assert!(text.contains(core), "chunk {} not in source: {:?}", c.index, core);
        }
        assert!(chunks.iter().any(|c| c.text.contains('💪')));
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let c = chunker(5, 2);
        assert_eq!(c.chunk_text(text), c.chunk_text(text));
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = Chunker::new(&ChunkingConfig {
            max_tokens: 10,
            overlap_tokens: 10,
        });
        assert!(err.is_err());
    }
}
