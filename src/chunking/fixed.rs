//! Fixed-size positional chunking.
//!
//! Splits text into consecutive, non-overlapping slices of at most
//! `max_chars` bytes. Boundaries are purely positional and may fall in the
//! middle of a word or sentence, but never inside a multi-byte character.

use crate::chunking::DEFAULT_MAX_CHUNK_CHARS;
use crate::core::Chunk;
use crate::io::{find_char_boundary, find_char_boundary_forward};

/// Fixed-size chunker that splits text at byte positions.
///
/// Concatenating the produced chunks in order always reproduces the input
/// exactly. A limit of `0` disables splitting.
///
/// # Examples
///
/// ```
/// use pagequery::chunking::FixedChunker;
///
/// let chunker = FixedChunker::with_size(10);
/// let chunks = chunker.split("0123456789ABCDEFGHIJ!");
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].content, "!");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedChunker {
    /// Maximum chunk size in bytes (0 = unlimited).
    max_chars: usize,
}

impl Default for FixedChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedChunker {
    /// Creates a chunker with the default limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }

    /// Creates a chunker with a custom limit (0 disables splitting).
    #[must_use]
    pub const fn with_size(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Returns the configured limit.
    #[must_use]
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Splits `text` into ordered chunks.
    ///
    /// Returns exactly one chunk holding `text` unmodified when splitting is
    /// disabled or the text fits, including the empty string.
    ///
    /// Chunk ends snap back to a character start, so chunks of non-ASCII text
    /// may be shorter than `max_chars`. The byte bound is exceeded only when
    /// `max_chars` is smaller than one character, in which case that chunk
    /// holds exactly one character.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let max = self.max_chars;
        if max == 0 || text.len() <= max {
            return vec![Chunk::new(0, text.to_string(), 0..text.len())];
        }

        let mut chunks = Vec::with_capacity(text.len().div_ceil(max));
        let mut start = 0;

        while start < text.len() {
            let target_end = start.saturating_add(max).min(text.len());
            let mut end = find_char_boundary(text, target_end);

            // Limit smaller than a single character: take the whole character
            if end <= start {
                end = find_char_boundary_forward(text, start + 1);
            }

            chunks.push(Chunk::new(
                chunks.len(),
                text[start..end].to_string(),
                start..end,
            ));
            start = end;
        }

        chunks
    }
}
