//! Diff-aware repainting of the submission and cursor placement.
//!
//! Every mutation repaints the whole submission in place, padding each
//! logical line to the full terminal width so shorter new content overwrites
//! longer old content. Whole rows vacated since the previous paint (a
//! shrinking submission, say a shorter history entry) are blanked by
//! comparing end positions, never by clearing the screen.
//!
//! All positions are computed from the buffer model, not read back from the
//! terminal. A logical line with `len` runes occupies
//! `1 + (prefix + len) / width` rows; when `prefix + len` is an exact
//! multiple of the width, the padding really does emit one full blank row,
//! so the cursor math uses the same formula and stays in step.

use crate::buffer::SubmissionBuffer;
use crate::console::{Color, ConsoleOutput, ConsoleResult, TextStyle};
use crate::unicode;

/// Prefix painted before the first logical line.
pub const PROMPT_PREFIX: &str = "» ";
/// Prefix painted before every continuation line.
pub const CONTINUATION_PREFIX: &str = "· ";
/// Screen columns both prefixes occupy.
pub const PREFIX_WIDTH: usize = 2;

/// Paints one submission and tracks the screen region it covers.
///
/// Created fresh for each submission at the coordinates where that
/// submission begins; discarded when the submission finalizes.
pub struct Renderer {
    /// Where the submission's first line starts painting.
    start: (u16, u16),
    /// Where the previous paint's content ended.
    last_end: (u16, u16),
    /// Terminal width in columns, at least 1.
    width: u16,
}

impl Renderer {
    pub fn new(start: (u16, u16), width: u16) -> Self {
        Self {
            start,
            last_end: start,
            width: width.max(1),
        }
    }

    /// Update the terminal width used for wrapping math. Takes effect on the
    /// next repaint.
    pub fn set_window_width(&mut self, width: u16) {
        self.width = width.max(1);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn start(&self) -> (u16, u16) {
        self.start
    }

    pub fn last_end(&self) -> (u16, u16) {
        self.last_end
    }

    /// Repaint the whole submission.
    ///
    /// `paint_line` emits the text of one logical line and may style it
    /// however it likes, as long as what it writes occupies exactly the
    /// line's rune count in columns.
    pub fn render<F>(
        &mut self,
        output: &dyn ConsoleOutput,
        buffer: &SubmissionBuffer,
        mut paint_line: F,
    ) -> ConsoleResult<()>
    where
        F: FnMut(&dyn ConsoleOutput, &str) -> ConsoleResult<()>,
    {
        output.set_cursor_visible(false)?;

        let width = self.width as usize;
        let prefix_style = TextStyle::foreground(Color::Green);
        let mut row = self.start.0;

        for (i, line) in buffer.lines().iter().enumerate() {
            let (col, prefix) = if i == 0 {
                (self.start.1, PROMPT_PREFIX)
            } else {
                (0, CONTINUATION_PREFIX)
            };
            output.move_cursor_to(row, col)?;
            output.write_styled_text(prefix, &prefix_style)?;
            paint_line(output, line)?;

            let cells = PREFIX_WIDTH + unicode::rune_count(line);
            let rows = 1 + cells / width;
            output.write_text(&" ".repeat(rows * width - cells))?;
            row += rows as u16;
        }

        let new_end = (row, 0);
        self.fill_blanks(output, new_end, self.last_end)?;
        self.last_end = new_end;

        output.set_cursor_visible(true)?;
        output.flush()
    }

    /// Put the terminal cursor where the buffer's logical cursor is.
    ///
    /// Column is `(prefix + column) mod width`; row is the start row plus
    /// the wrapped-row count of every logical line before the current one.
    pub fn update_cursor(
        &self,
        output: &dyn ConsoleOutput,
        buffer: &SubmissionBuffer,
    ) -> ConsoleResult<()> {
        let width = self.width as usize;
        let col = ((PREFIX_WIDTH + buffer.column()) % width) as u16;

        let mut row = self.start.0;
        for line in &buffer.lines()[..buffer.line_index()] {
            let cells = PREFIX_WIDTH + unicode::rune_count(line);
            row += (1 + cells / width) as u16;
        }

        output.move_cursor_to(row, col)?;
        output.flush()
    }

    /// Blank whatever the previous paint covered beyond the new one.
    fn fill_blanks(
        &self,
        output: &dyn ConsoleOutput,
        new_end: (u16, u16),
        old_end: (u16, u16),
    ) -> ConsoleResult<()> {
        let width = self.width as usize;

        if new_end.0 > old_end.0 {
            // The new paint reaches further down; nothing stale remains
            return Ok(());
        }

        if new_end.0 == old_end.0 {
            if old_end.1 > new_end.1 {
                output.move_cursor_to(new_end.0, new_end.1)?;
                output.write_text(&" ".repeat((old_end.1 - new_end.1) as usize))?;
            }
            return Ok(());
        }

        output.move_cursor_to(new_end.0, new_end.1)?;
        output.write_text(&" ".repeat(width - new_end.1 as usize))?;
        for row in new_end.0 + 1..old_end.0 {
            output.move_cursor_to(row, 0)?;
            output.write_text(&" ".repeat(width))?;
        }
        output.move_cursor_to(old_end.0, 0)?;
        output.write_text(&" ".repeat(old_end.1 as usize))?;
        Ok(())
    }
}
