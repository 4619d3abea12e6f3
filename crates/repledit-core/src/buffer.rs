//! Multi-line submission buffer for editing operations.
//!
//! The buffer holds the lines of one in-progress submission together with a
//! logical cursor (line index, column). Columns are rune indices, never bytes
//! and never screen columns; the renderer owns the mapping to the screen.
//!
//! Editing operations return `true` when they changed something the caller
//! needs to react to. Movement operations return `true` when the cursor needs
//! repositioning, which for some of them is unconditional.

use crate::unicode;
use crate::word;

/// Separator used when joining or splitting submission text.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Tab stops are every four columns.
const TAB_STOP: usize = 4;

/// A mutable multi-line text buffer with a logical cursor.
///
/// # Examples
///
/// ```
/// use repledit_core::buffer::SubmissionBuffer;
///
/// let mut buffer = SubmissionBuffer::new();
/// buffer.insert_text("let x = 1");
/// assert_eq!(buffer.text(), "let x = 1");
/// assert_eq!(buffer.column(), 9);
/// ```
#[derive(Debug, Clone)]
pub struct SubmissionBuffer {
    /// Lines of the in-progress submission, always at least one.
    lines: Vec<String>,
    /// Index of the line the cursor is on.
    line_index: usize,
    /// Cursor column as a rune index into the current line.
    column: usize,
}

impl SubmissionBuffer {
    /// Create a buffer holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            line_index: 0,
            column: 0,
        }
    }

    /// All lines of the submission.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line the cursor is on.
    pub fn current_line(&self) -> &str {
        &self.lines[self.line_index]
    }

    /// Index of the line the cursor is on.
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    /// Cursor column as a rune index.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of lines in the submission.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The full submission text with lines joined by [`LINE_SEPARATOR`].
    pub fn text(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }

    /// Insert printable text at the cursor.
    ///
    /// Control characters (code points below 32) are dropped; they arrive as
    /// key events, not text. Returns `false` when nothing printable remained.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let printable: String = text.chars().filter(|&c| c >= ' ').collect();
        if printable.is_empty() {
            return false;
        }

        let inserted = unicode::rune_count(&printable);
        let byte_index = unicode::byte_index_from_rune_index(self.current_line(), self.column);
        self.lines[self.line_index].insert_str(byte_index, &printable);
        self.column += inserted;
        true
    }

    /// Split the current line at the cursor, moving the remainder to a new
    /// line below. The cursor lands at the start of that new line.
    pub fn insert_newline(&mut self) -> bool {
        let byte_index = unicode::byte_index_from_rune_index(self.current_line(), self.column);
        let remainder = self.lines[self.line_index].split_off(byte_index);
        self.lines.insert(self.line_index + 1, remainder);
        self.line_index += 1;
        self.column = 0;
        true
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self) -> bool {
        let count = TAB_STOP - self.column % TAB_STOP;
        self.insert_text(&" ".repeat(count))
    }

    /// Delete the rune before the cursor, or merge with the previous line
    /// when the cursor is at column 0 and a previous line exists.
    pub fn delete_left(&mut self) -> bool {
        if self.column == 0 {
            if self.line_index == 0 {
                return false;
            }
            let removed = self.lines.remove(self.line_index);
            self.line_index -= 1;
            self.column = unicode::rune_count(&self.lines[self.line_index]);
            self.lines[self.line_index].push_str(&removed);
            true
        } else {
            self.remove_runes(self.column - 1, self.column);
            self.column -= 1;
            true
        }
    }

    /// Delete the rune under the cursor. Never merges lines; at the end of a
    /// line this does nothing even when more lines follow.
    pub fn delete_right(&mut self) -> bool {
        if self.column == unicode::rune_count(self.current_line()) {
            return false;
        }
        self.remove_runes(self.column, self.column + 1);
        true
    }

    /// Delete from the start of the word before the cursor to the cursor.
    pub fn delete_word_left(&mut self) -> bool {
        if self.column == 0 {
            return false;
        }
        let start = word::find_word_start(self.current_line(), self.column);
        self.remove_runes(start, self.column);
        self.column = start;
        true
    }

    /// Delete from the cursor to the end of the word after it.
    pub fn delete_word_right(&mut self) -> bool {
        if self.column == unicode::rune_count(self.current_line()) {
            return false;
        }
        let end = word::find_word_end(self.current_line(), self.column);
        self.remove_runes(self.column, end);
        true
    }

    /// Replace the current line with an empty one. The other lines and the
    /// line index are untouched.
    pub fn clear_line(&mut self) -> bool {
        self.lines[self.line_index] = String::new();
        self.column = 0;
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.column == 0 {
            return false;
        }
        self.column -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.column >= unicode::rune_count(self.current_line()) {
            return false;
        }
        self.column += 1;
        true
    }

    /// Move to the previous line, clamping the column to its length.
    pub fn move_up(&mut self) -> bool {
        if self.line_index == 0 {
            return false;
        }
        self.line_index -= 1;
        self.column = self.column.min(unicode::rune_count(self.current_line()));
        true
    }

    /// Move to the next line, clamping the column to its length.
    pub fn move_down(&mut self) -> bool {
        if self.line_index + 1 >= self.lines.len() {
            return false;
        }
        self.line_index += 1;
        self.column = self.column.min(unicode::rune_count(self.current_line()));
        true
    }

    /// Move to column 0. Always reports a cursor update, even from column 0.
    pub fn move_home(&mut self) -> bool {
        self.column = 0;
        true
    }

    /// Move past the last rune of the line. Always reports a cursor update.
    pub fn move_end(&mut self) -> bool {
        self.column = unicode::rune_count(self.current_line());
        true
    }

    pub fn move_word_left(&mut self) -> bool {
        if self.column == 0 {
            return false;
        }
        self.column = word::find_word_start(self.current_line(), self.column);
        true
    }

    /// Move past the end of the next word. Always reports a cursor update;
    /// at the end of the line the cursor stays put but is still refreshed.
    pub fn move_word_right(&mut self) -> bool {
        self.column = word::find_word_end(self.current_line(), self.column);
        true
    }

    /// Replace the whole buffer with `text` split on [`LINE_SEPARATOR`],
    /// cursor at the very end. Used for history recall.
    pub fn load_text(&mut self, text: &str) {
        self.lines = text.split(LINE_SEPARATOR).map(String::from).collect();
        self.line_index = self.lines.len() - 1;
        self.column = unicode::rune_count(&self.lines[self.line_index]);
    }

    /// Append an empty line and put the cursor at its start. Used when a
    /// submission continues past Enter.
    pub fn append_line(&mut self) {
        self.lines.push(String::new());
        self.line_index = self.lines.len() - 1;
        self.column = 0;
    }

    /// Park the cursor after the last rune of the last line.
    pub fn move_to_submission_end(&mut self) {
        self.line_index = self.lines.len() - 1;
        self.column = unicode::rune_count(&self.lines[self.line_index]);
    }

    fn remove_runes(&mut self, start: usize, end: usize) {
        let line = &self.lines[self.line_index];
        let start_byte = unicode::byte_index_from_rune_index(line, start);
        let end_byte = unicode::byte_index_from_rune_index(line, end);
        self.lines[self.line_index].replace_range(start_byte..end_byte, "");
    }
}

impl Default for SubmissionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_one_empty_line() {
        let buffer = SubmissionBuffer::new();
        assert_eq!(buffer.lines(), &[String::new()]);
        assert_eq!(buffer.line_index(), 0);
        assert_eq!(buffer.column(), 0);
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_insert_text() {
        let mut buffer = SubmissionBuffer::new();

        assert!(buffer.insert_text("hello"));
        assert_eq!(buffer.current_line(), "hello");
        assert_eq!(buffer.column(), 5);

        buffer.move_home();
        assert!(buffer.insert_text(">"));
        assert_eq!(buffer.current_line(), ">hello");
        assert_eq!(buffer.column(), 1);
    }

    #[test]
    fn test_insert_text_filters_control_characters() {
        let mut buffer = SubmissionBuffer::new();

        assert!(!buffer.insert_text("\x01\x02\x1b"));
        assert_eq!(buffer.current_line(), "");

        assert!(buffer.insert_text("a\x07b"));
        assert_eq!(buffer.current_line(), "ab");
        assert_eq!(buffer.column(), 2);
    }

    #[test]
    fn test_insert_unicode_counts_runes() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("日本語");
        assert_eq!(buffer.column(), 3);

        buffer.move_left();
        buffer.insert_text("x");
        assert_eq!(buffer.current_line(), "日本x語");
        assert_eq!(buffer.column(), 3);
    }

    #[test]
    fn test_insert_tab_pads_to_next_stop() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("a");
        buffer.insert_tab();
        assert_eq!(buffer.current_line(), "a   ");
        assert_eq!(buffer.column(), 4);

        // From a stop, a full tab of spaces
        buffer.insert_tab();
        assert_eq!(buffer.column(), 8);
    }

    #[test]
    fn test_insert_newline_splits_line() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("headtail");
        buffer.move_home();
        for _ in 0..4 {
            buffer.move_right();
        }

        assert!(buffer.insert_newline());
        assert_eq!(buffer.lines(), &["head".to_string(), "tail".to_string()]);
        assert_eq!(buffer.line_index(), 1);
        assert_eq!(buffer.column(), 0);
    }

    #[test]
    fn test_delete_left_removes_rune() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("abc");
        assert!(buffer.delete_left());
        assert_eq!(buffer.current_line(), "ab");
        assert_eq!(buffer.column(), 2);
    }

    #[test]
    fn test_delete_left_merges_lines() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("first");
        buffer.insert_newline();
        buffer.insert_text("second");
        buffer.move_home();

        assert!(buffer.delete_left());
        assert_eq!(buffer.lines(), &["firstsecond".to_string()]);
        assert_eq!(buffer.line_index(), 0);
        // Cursor sits at the join point
        assert_eq!(buffer.column(), 5);
    }

    #[test]
    fn test_delete_left_at_origin_is_noop() {
        let mut buffer = SubmissionBuffer::new();
        assert!(!buffer.delete_left());

        buffer.insert_text("x");
        buffer.move_home();
        assert!(!buffer.delete_left());
        assert_eq!(buffer.current_line(), "x");
    }

    #[test]
    fn test_delete_right_never_merges() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("ab");
        buffer.insert_newline();
        buffer.insert_text("cd");

        // End of first line, second line exists: still a no-op
        buffer.move_up();
        buffer.move_end();
        assert!(!buffer.delete_right());
        assert_eq!(buffer.lines(), &["ab".to_string(), "cd".to_string()]);
    }

    #[test]
    fn test_delete_right_removes_rune_under_cursor() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("abc");
        buffer.move_home();
        assert!(buffer.delete_right());
        assert_eq!(buffer.current_line(), "bc");
        assert_eq!(buffer.column(), 0);
    }

    #[test]
    fn test_delete_word_left() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("foo bar");
        assert!(buffer.delete_word_left());
        assert_eq!(buffer.current_line(), "foo ");
        assert_eq!(buffer.column(), 4);

        // Trailing whitespace and the word before it go together
        assert!(buffer.delete_word_left());
        assert_eq!(buffer.current_line(), "");

        assert!(!buffer.delete_word_left());
    }

    #[test]
    fn test_delete_word_right() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("foo bar");
        buffer.move_home();
        assert!(buffer.delete_word_right());
        assert_eq!(buffer.current_line(), " bar");
        assert_eq!(buffer.column(), 0);

        assert!(buffer.delete_word_right());
        assert_eq!(buffer.current_line(), "");

        assert!(!buffer.delete_word_right());
    }

    #[test]
    fn test_clear_line_touches_only_current_line() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("keep");
        buffer.insert_newline();
        buffer.insert_text("wipe");

        assert!(buffer.clear_line());
        assert_eq!(buffer.lines(), &["keep".to_string(), String::new()]);
        assert_eq!(buffer.line_index(), 1);
        assert_eq!(buffer.column(), 0);

        // Clearing an already-empty line still reports a change
        assert!(buffer.clear_line());
    }

    #[test]
    fn test_horizontal_movement_guards() {
        let mut buffer = SubmissionBuffer::new();

        assert!(!buffer.move_left());
        assert!(!buffer.move_right());

        buffer.insert_text("ab");
        assert!(!buffer.move_right());
        assert!(buffer.move_left());
        assert_eq!(buffer.column(), 1);
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("longest line");
        buffer.insert_newline();
        buffer.insert_text("ab");
        buffer.move_end();

        assert!(buffer.move_up());
        assert_eq!(buffer.line_index(), 0);
        assert_eq!(buffer.column(), 2);

        buffer.move_end();
        assert!(buffer.move_down());
        assert_eq!(buffer.column(), 2);

        assert!(!buffer.move_down());
        buffer.move_up();
        assert!(!buffer.move_up());
    }

    #[test]
    fn test_home_and_end_always_report_movement() {
        let mut buffer = SubmissionBuffer::new();

        assert!(buffer.move_home());
        assert!(buffer.move_end());

        buffer.insert_text("text");
        assert!(buffer.move_end());
        assert_eq!(buffer.column(), 4);
        assert!(buffer.move_home());
        assert_eq!(buffer.column(), 0);
    }

    #[test]
    fn test_word_movement() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("one two three");
        buffer.move_home();

        assert!(!buffer.move_word_left());

        assert!(buffer.move_word_right());
        assert_eq!(buffer.column(), 3);
        assert!(buffer.move_word_right());
        assert_eq!(buffer.column(), 7);

        // At the very end the cursor stays, but the move still reports
        buffer.move_end();
        assert!(buffer.move_word_right());
        assert_eq!(buffer.column(), 13);

        assert!(buffer.move_word_left());
        assert_eq!(buffer.column(), 8);
    }

    #[test]
    fn test_load_text_places_cursor_at_end() {
        let mut buffer = SubmissionBuffer::new();

        buffer.load_text(&format!("alpha{LINE_SEPARATOR}beta"));
        assert_eq!(buffer.lines(), &["alpha".to_string(), "beta".to_string()]);
        assert_eq!(buffer.line_index(), 1);
        assert_eq!(buffer.column(), 4);

        buffer.load_text("");
        assert_eq!(buffer.lines(), &[String::new()]);
        assert_eq!(buffer.column(), 0);
    }

    #[test]
    fn test_append_line() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("if x {");
        buffer.append_line();
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.line_index(), 1);
        assert_eq!(buffer.column(), 0);
        assert_eq!(buffer.text(), format!("if x {{{LINE_SEPARATOR}"));
    }

    #[test]
    fn test_move_to_submission_end() {
        let mut buffer = SubmissionBuffer::new();

        buffer.load_text(&format!("ab{LINE_SEPARATOR}cdef"));
        buffer.move_up();
        buffer.move_home();

        buffer.move_to_submission_end();
        assert_eq!(buffer.line_index(), 1);
        assert_eq!(buffer.column(), 4);
    }

    #[test]
    fn test_text_joins_with_separator() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("a");
        buffer.append_line();
        buffer.insert_text("b");
        assert_eq!(buffer.text(), format!("a{LINE_SEPARATOR}b"));
    }

    #[test]
    fn test_delete_left_unicode() {
        let mut buffer = SubmissionBuffer::new();

        buffer.insert_text("日本");
        assert!(buffer.delete_left());
        assert_eq!(buffer.current_line(), "日");
        assert_eq!(buffer.column(), 1);
    }
}
