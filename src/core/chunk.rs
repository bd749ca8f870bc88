//! Page chunks.
//!
//! A [`Chunk`] is one positional slice of page text, sized so that a single
//! generation request can carry it. Chunks keep their byte range in the
//! source so callers can report where an answer came from.

use crate::io::find_char_boundary;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One slice of page text.
///
/// # Examples
///
/// ```
/// use pagequery::core::Chunk;
///
/// let chunk = Chunk::new(2, "tail".to_string(), 8..12);
/// assert_eq!(chunk.size(), 4);
/// assert_eq!(chunk.start(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the run (0-based).
    pub index: usize,

    /// The slice itself, unmodified.
    pub content: String,

    /// Where `content` sits in the source text.
    pub byte_range: Range<usize>,
}

impl Chunk {
    /// Creates a chunk at `index` covering `byte_range` of the source.
    #[must_use]
    pub const fn new(index: usize, content: String, byte_range: Range<usize>) -> Self {
        Self {
            index,
            content,
            byte_range,
        }
    }

    /// Length of the content in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// True for the single chunk produced from empty content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Source offset of the first byte.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.byte_range.start
    }

    /// Source offset one past the last byte.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.byte_range.end
    }

    /// Leading slice of at most `max_len` bytes, cut on a character start.
    #[must_use]
    pub fn preview(&self, max_len: usize) -> &str {
        &self.content[..find_char_boundary(&self.content, max_len)]
    }
}

/// Reassembles chunk contents in index order.
///
/// For the output of the chunker this is exactly the original text.
#[must_use]
pub fn join_chunks(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.index);
    ordered.iter().map(|c| c.content.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_chunk() -> Chunk {
        Chunk::new(1, "Opening hours: 9-17".to_string(), 40..59)
    }

    #[test]
    fn test_offsets_and_size() {
        let chunk = page_chunk();
        assert_eq!(chunk.start(), 40);
        assert_eq!(chunk.end(), 59);
        assert_eq!(chunk.size(), chunk.end() - chunk.start());
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_preview_cuts_on_char_start() {
        let chunk = Chunk::new(0, "Menü: soup".to_string(), 0..11);
        // byte 4 is the second half of 'ü'
        assert_eq!(chunk.preview(4), "Men");
        assert_eq!(chunk.preview(6), "Menü:");
        assert_eq!(chunk.preview(500), "Menü: soup");
    }

    #[test]
    fn test_join_restores_order() {
        let chunks = vec![
            Chunk::new(2, "!".to_string(), 10..11),
            Chunk::new(0, "page ".to_string(), 0..5),
            Chunk::new(1, "text".to_string(), 5..10),
        ];
        assert_eq!(join_chunks(&chunks), "page text!");
        assert_eq!(join_chunks(&[]), "");
    }

    #[test]
    fn test_serializes_byte_range() {
        let json = serde_json::to_value(page_chunk()).unwrap();
        assert_eq!(json["index"], 1);
        assert_eq!(json["byte_range"]["start"], 40);
        assert_eq!(json["byte_range"]["end"], 59);
    }
}
