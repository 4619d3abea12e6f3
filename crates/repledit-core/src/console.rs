//! Console input/output abstraction traits and types.
//!
//! The engine talks to the terminal exclusively through [`ConsoleInput`] and
//! [`ConsoleOutput`] handles passed in by the embedder. There is no global
//! console state; two sessions on two terminals can coexist in one process.

use crate::key::KeyEvent;

/// Blocking-with-timeout console input interface.
pub trait ConsoleInput {
    /// Enable raw terminal mode with automatic restoration on drop.
    fn enable_raw_mode(&self) -> ConsoleResult<RawModeGuard>;

    /// Read the next key event, waiting up to `timeout_ms` for one.
    ///
    /// `Ok(None)` means the timeout elapsed with no complete event. A `None`
    /// timeout blocks until input arrives. Implementations resolve pending
    /// partial escape sequences on timeout, which is how a lone ESC press
    /// becomes [`crate::Key::Escape`].
    fn read_key_timeout(&self, timeout_ms: Option<u32>) -> ConsoleResult<Option<KeyEvent>>;

    /// Current terminal window size as (columns, rows).
    ///
    /// Values are in character cells. The API is 0-based for coordinates
    /// even though ANSI sequences are 1-based.
    fn get_window_size(&self) -> ConsoleResult<(u16, u16)>;

    /// Platform capabilities of this backend.
    fn get_capabilities(&self) -> ConsoleCapabilities;
}

/// Console output interface.
pub trait ConsoleOutput {
    /// Write text at the current cursor position.
    fn write_text(&self, text: &str) -> ConsoleResult<()>;

    /// Write text with specific styling, then restore the previous style.
    fn write_styled_text(&self, text: &str, style: &TextStyle) -> ConsoleResult<()>;

    /// Move cursor to a specific position (0-based coordinates: row, col).
    /// ANSI sequences are 1-based; implementations convert.
    fn move_cursor_to(&self, row: u16, col: u16) -> ConsoleResult<()>;

    /// Clear the screen or part of it.
    fn clear(&self, clear_type: ClearType) -> ConsoleResult<()>;

    /// Set text styling for subsequent writes.
    fn set_style(&self, style: &TextStyle) -> ConsoleResult<()>;

    /// Reset all styling to default.
    fn reset_style(&self) -> ConsoleResult<()>;

    /// Flush buffered output to the terminal.
    fn flush(&self) -> ConsoleResult<()>;

    /// Show or hide the cursor.
    fn set_cursor_visible(&self, visible: bool) -> ConsoleResult<()>;

    /// Current cursor position as (row, col), 0-based.
    ///
    /// On VT backends this round-trips a cursor position report through the
    /// terminal, so it is comparatively expensive; the engine queries it once
    /// per submission, not per keystroke.
    fn get_cursor_position(&self) -> ConsoleResult<(u16, u16)>;

    /// Output capabilities of this backend.
    fn get_capabilities(&self) -> OutputCapabilities;
}

/// RAII guard for terminal raw mode.
///
/// Dropping the guard restores the previous terminal state. [`restore`] does
/// the same eagerly and reports errors instead of swallowing them.
///
/// [`restore`]: RawModeGuard::restore
pub struct RawModeGuard {
    restore_fn: Option<Box<dyn FnOnce()>>,
    platform_info: String,
}

impl RawModeGuard {
    pub fn new<F>(restore_fn: F, platform_info: String) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            restore_fn: Some(Box::new(restore_fn)),
            platform_info,
        }
    }

    pub fn platform_info(&self) -> &str {
        &self.platform_info
    }

    pub fn is_active(&self) -> bool {
        self.restore_fn.is_some()
    }

    /// Restore terminal mode now instead of at drop time.
    pub fn restore(mut self) -> ConsoleResult<()> {
        match self.restore_fn.take() {
            Some(restore_fn) => {
                restore_fn();
                Ok(())
            }
            None => Err(ConsoleError::RawModeError("already restored".to_string())),
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Some(restore_fn) = self.restore_fn.take() {
            restore_fn();
        }
    }
}

/// Input backend capabilities.
#[derive(Debug, Clone)]
pub struct ConsoleCapabilities {
    pub supports_raw_mode: bool,
    pub supports_unicode: bool,
    pub platform_name: String,
    pub backend_type: BackendType,
}

/// Output backend capabilities.
#[derive(Debug, Clone)]
pub struct OutputCapabilities {
    pub supports_colors: bool,
    pub supports_styling: bool,
    /// Whether [`ConsoleOutput::get_cursor_position`] reflects a real cursor.
    pub supports_cursor_reports: bool,
    pub platform_name: String,
    pub backend_type: BackendType,
}

/// Backend implementation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    UnixVt,
    Mock,
}

/// Text styling configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub dim: bool,
    pub reverse: bool,
}

impl TextStyle {
    /// Style with only a foreground color set.
    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }
}

/// Color specification for text styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
    Ansi256(u8),
}

/// Screen clearing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearType {
    /// Clear entire screen
    All,
    /// Clear from cursor to end of screen
    FromCursor,
    /// Clear from beginning of screen to cursor
    ToCursor,
    /// Clear current line
    CurrentLine,
    /// Clear from cursor to end of line
    FromCursorToEndOfLine,
    /// Clear from beginning of line to cursor
    FromBeginningOfLineToCursor,
}

/// Console operation errors.
#[derive(Debug, Clone)]
pub enum ConsoleError {
    /// Platform-specific I/O error
    IoError(String),
    /// Raw mode setup or teardown error
    RawModeError(String),
    /// Standard input or output is not attached to a terminal
    NotATerminal,
    /// Feature not supported on this platform
    UnsupportedFeature { feature: String, platform: String },
    /// The input stream reached end of file or was disconnected
    InputClosed,
    /// The terminal's cursor position report could not be read
    InvalidCursorReport(String),
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleError::IoError(msg) => write!(f, "I/O error: {msg}"),
            ConsoleError::RawModeError(msg) => write!(f, "Raw mode error: {msg}"),
            ConsoleError::NotATerminal => write!(f, "Not attached to a terminal"),
            ConsoleError::UnsupportedFeature { feature, platform } => {
                write!(
                    f,
                    "Feature '{feature}' not supported on platform '{platform}'"
                )
            }
            ConsoleError::InputClosed => write!(f, "Input stream closed"),
            ConsoleError::InvalidCursorReport(msg) => {
                write!(f, "Invalid cursor position report: {msg}")
            }
        }
    }
}

impl std::error::Error for ConsoleError {}

/// Result type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_raw_mode_guard_restores_on_drop() {
        let restored = Rc::new(Cell::new(false));
        let flag = Rc::clone(&restored);

        {
            let guard = RawModeGuard::new(move || flag.set(true), "test".to_string());
            assert!(guard.is_active());
            assert!(!restored.get());
        }

        assert!(restored.get());
    }

    #[test]
    fn test_raw_mode_guard_manual_restore() {
        let restored = Rc::new(Cell::new(0));
        let counter = Rc::clone(&restored);

        let guard = RawModeGuard::new(move || counter.set(counter.get() + 1), "test".to_string());
        guard.restore().unwrap();

        // Drop already happened inside restore; the closure ran exactly once
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_style_helper() {
        let style = TextStyle::foreground(Color::Green);
        assert_eq!(style.foreground, Some(Color::Green));
        assert_eq!(style.background, None);
        assert!(!style.bold);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConsoleError::IoError("broken pipe".to_string()).to_string(),
            "I/O error: broken pipe"
        );
        assert_eq!(
            ConsoleError::NotATerminal.to_string(),
            "Not attached to a terminal"
        );
        let err = ConsoleError::UnsupportedFeature {
            feature: "raw_mode".to_string(),
            platform: "unknown".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Feature 'raw_mode' not supported on platform 'unknown'"
        );
    }
}
