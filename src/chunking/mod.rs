//! Chunking for pagequery.
//!
//! Page content is split positionally into size-bounded chunks so that each
//! chunk fits in a single generation request. See [`FixedChunker`].

pub mod fixed;

pub use fixed::FixedChunker;

use crate::core::Chunk;

/// Default chunk size in bytes when a request does not set one.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 100_000;

/// Splits `text` into chunks of at most `max_chars` bytes (0 = unlimited).
///
/// # Examples
///
/// ```
/// use pagequery::chunking::chunk_text;
///
/// let chunks = chunk_text("abcdef", 4);
/// assert_eq!(chunks.len(), 2);
/// ```
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<Chunk> {
    FixedChunker::with_size(max_chars).split(text)
}

/// Resolves a request-supplied limit, falling back to `default` for
/// missing or non-positive values.
#[must_use]
pub fn resolve_max_chunk_chars(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => default,
    }
}
