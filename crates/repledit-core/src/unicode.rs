//! Unicode utilities for text buffer operations.
//!
//! All editing operations use rune-based indexing (character count) rather
//! than byte indexing, so cursor positions stay valid across multi-byte
//! characters. Byte indices only appear at the boundary where a rune position
//! has to be converted for `String` surgery.

use unicode_width::UnicodeWidthStr;

/// Count the number of Unicode characters (runes) in a string.
///
/// This is different from byte length and is used for cursor positioning.
///
/// # Examples
///
/// ```
/// use repledit_core::unicode::rune_count;
///
/// assert_eq!(rune_count("hello"), 5);
/// assert_eq!(rune_count("こんにちは"), 5);
/// assert_eq!(rune_count("🦀🚀"), 2);
/// ```
pub fn rune_count(s: &str) -> usize {
    s.chars().count()
}

/// Get the display width of a string, accounting for wide characters.
///
/// Some characters (like CJK) take up two terminal columns.
///
/// # Examples
///
/// ```
/// use repledit_core::unicode::display_width;
///
/// assert_eq!(display_width("hello"), 5);
/// assert_eq!(display_width("こんにちは"), 10);
/// ```
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Extract a substring by rune indices (not byte indices).
///
/// Safe on character boundaries. An invalid range (end < start) yields an
/// empty string.
///
/// # Examples
///
/// ```
/// use repledit_core::unicode::rune_slice;
///
/// assert_eq!(rune_slice("hello", 1, 4), "ell");
/// assert_eq!(rune_slice("こんにちは", 1, 3), "んに");
/// ```
pub fn rune_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }

    let start_byte = s
        .char_indices()
        .nth(start)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let end_byte = s
        .char_indices()
        .nth(end)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[start_byte..end_byte]
}

/// Get the character at a specific rune index, or `None` past the end.
///
/// # Examples
///
/// ```
/// use repledit_core::unicode::char_at_rune_index;
///
/// assert_eq!(char_at_rune_index("hello", 1), Some('e'));
/// assert_eq!(char_at_rune_index("hello", 10), None);
/// ```
pub fn char_at_rune_index(s: &str, index: usize) -> Option<char> {
    s.chars().nth(index)
}

/// Convert a rune index to a byte index.
///
/// Indices past the end clamp to the string's byte length, which makes this
/// directly usable with `String::insert_str`.
///
/// # Examples
///
/// ```
/// use repledit_core::unicode::byte_index_from_rune_index;
///
/// assert_eq!(byte_index_from_rune_index("hello", 2), 2);
/// assert_eq!(byte_index_from_rune_index("こんにちは", 2), 6);
/// ```
pub fn byte_index_from_rune_index(s: &str, rune_index: usize) -> usize {
    s.char_indices()
        .nth(rune_index)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}
