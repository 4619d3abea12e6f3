//! Word boundary scanning within a single line.
//!
//! Both scans share the same shape: skip any whitespace in the travel
//! direction first, then run to the far edge of the word. Positions are rune
//! indices, consistent with the rest of the engine.

/// Rune index of the start of the word at or before `column`.
///
/// Scanning backward from `column`, whitespace is skipped first, then the
/// word itself. At column 0 this returns 0.
///
/// # Examples
///
/// ```
/// use repledit_core::word::find_word_start;
///
/// assert_eq!(find_word_start("foo bar", 7), 4);
/// assert_eq!(find_word_start("foo bar", 4), 0);
/// assert_eq!(find_word_start("foo   ", 6), 0);
/// ```
pub fn find_word_start(line: &str, column: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut i = column.min(chars.len());

    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    while i > 0 && !chars[i - 1].is_whitespace() {
        i -= 1;
    }
    i
}

/// Rune index just past the end of the word at or after `column`.
///
/// Scanning forward from `column`, whitespace is skipped first, then the
/// word itself. At the end of the line this returns the line's rune count.
///
/// # Examples
///
/// ```
/// use repledit_core::word::find_word_end;
///
/// assert_eq!(find_word_end("foo bar", 0), 3);
/// assert_eq!(find_word_end("foo bar", 3), 7);
/// assert_eq!(find_word_end("foo bar", 4), 7);
/// ```
pub fn find_word_end(line: &str, column: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut i = column.min(chars.len());

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    while i < chars.len() && !chars[i].is_whitespace() {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_start_basic() {
        let line = "foo bar baz";

        assert_eq!(find_word_start(line, 11), 8);
        assert_eq!(find_word_start(line, 8), 4);
        assert_eq!(find_word_start(line, 7), 4);
        assert_eq!(find_word_start(line, 4), 0);
        assert_eq!(find_word_start(line, 0), 0);
    }

    #[test]
    fn test_word_start_mid_word() {
        // From inside a word, travels to that word's start only
        assert_eq!(find_word_start("foo bar", 6), 4);
        assert_eq!(find_word_start("foo bar", 5), 4);
    }

    #[test]
    fn test_word_start_skips_whitespace_runs() {
        assert_eq!(find_word_start("foo    bar", 7), 0);
        assert_eq!(find_word_start("   ", 3), 0);
        assert_eq!(find_word_start("", 0), 0);
    }

    #[test]
    fn test_word_end_basic() {
        let line = "foo bar baz";

        assert_eq!(find_word_end(line, 0), 3);
        assert_eq!(find_word_end(line, 3), 7);
        assert_eq!(find_word_end(line, 4), 7);
        assert_eq!(find_word_end(line, 8), 11);
        assert_eq!(find_word_end(line, 11), 11);
    }

    #[test]
    fn test_word_end_mid_word() {
        assert_eq!(find_word_end("foo bar", 1), 3);
        assert_eq!(find_word_end("foo bar", 5), 7);
    }

    #[test]
    fn test_word_end_skips_whitespace_runs() {
        assert_eq!(find_word_end("foo    bar", 3), 10);
        assert_eq!(find_word_end("   ", 0), 3);
        assert_eq!(find_word_end("", 0), 0);
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(find_word_start("世界 こんにちは", 8), 3);
        assert_eq!(find_word_end("世界 こんにちは", 0), 2);
        assert_eq!(find_word_end("世界 こんにちは", 2), 8);
    }

    #[test]
    fn test_out_of_range_column_clamps() {
        assert_eq!(find_word_start("foo", 99), 0);
        assert_eq!(find_word_end("foo", 99), 3);
    }
}
