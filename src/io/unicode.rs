//! UTF-8 boundary helpers.
//!
//! Chunk sizes are measured in bytes, but a `str` can only be sliced where a
//! character starts. These helpers move a byte offset onto the closest
//! character start, either backwards or forwards. Offsets past the end clamp
//! to the string length.

/// Moves `pos` back to the nearest character start.
///
/// # Examples
///
/// ```
/// use pagequery::io::find_char_boundary;
///
/// let s = "naïve"; // 'ï' occupies bytes 2..4
/// assert_eq!(find_char_boundary(s, 3), 2);
/// assert_eq!(find_char_boundary(s, 4), 4);
/// ```
#[must_use]
pub fn find_char_boundary(s: &str, pos: usize) -> usize {
    let mut at = pos.min(s.len());
    while !s.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Moves `pos` forward to the nearest character start.
#[must_use]
pub fn find_char_boundary_forward(s: &str, pos: usize) -> usize {
    let mut at = pos.min(s.len());
    while !s.is_char_boundary(at) {
        at += 1;
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    // "a€b": 'a' 0..1, '€' 1..4, 'b' 4..5
    #[test_case(0, 0, 0 ; "start")]
    #[test_case(1, 1, 1 ; "on boundary")]
    #[test_case(2, 1, 4 ; "inside multibyte")]
    #[test_case(3, 1, 4 ; "last continuation byte")]
    #[test_case(5, 5, 5 ; "end")]
    #[test_case(99, 5, 5 ; "past end")]
    fn test_boundaries(pos: usize, back: usize, forward: usize) {
        let s = "a\u{20ac}b";
        assert_eq!(find_char_boundary(s, pos), back);
        assert_eq!(find_char_boundary_forward(s, pos), forward);
    }

    #[test]
    fn test_four_byte_character() {
        let s = "\u{1f30d}!";
        assert_eq!(find_char_boundary(s, 3), 0);
        assert_eq!(find_char_boundary_forward(s, 1), 4);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(find_char_boundary("", 3), 0);
        assert_eq!(find_char_boundary_forward("", 0), 0);
    }
}
