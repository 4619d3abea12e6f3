//! Line editing engine for interactive REPLs.
//!
//! This crate owns raw keystroke interpretation, a multi-line submission
//! buffer, cursor-to-screen translation with line wrapping, diff-aware
//! incremental repainting, and command history recall. Language concerns
//! (evaluation, completeness, coloring, meta commands) stay behind the
//! [`ReplHandler`] trait; terminal concerns stay behind the [`ConsoleInput`]
//! and [`ConsoleOutput`] traits, implemented by the companion io crate.

pub mod key;
pub mod key_parser;
pub mod sequence_matcher;

// Text editing
pub mod buffer;
pub mod unicode;
pub mod word;

// Console I/O abstraction
pub mod console;

// Key dispatch
pub mod key_handler;

// Rendering
pub mod renderer;

// History
pub mod history;

// Session loop
pub mod repl;

// Re-export commonly used types for convenience
pub use key::{Key, KeyEvent};
pub use key_parser::{KeyParser, ParserState};
pub use sequence_matcher::{LongestMatchResult, MatchResult, SequenceMatcher};

pub use buffer::{SubmissionBuffer, LINE_SEPARATOR};
pub use unicode::{
    byte_index_from_rune_index, char_at_rune_index, display_width, rune_count, rune_slice,
};
pub use word::{find_word_end, find_word_start};

pub use console::{
    BackendType, ClearType, Color, ConsoleCapabilities, ConsoleError, ConsoleInput, ConsoleOutput,
    ConsoleResult, OutputCapabilities, RawModeGuard, TextStyle,
};

pub use history::History;
pub use key_handler::{EditAction, KeyDispatcher, KeyResult};
pub use renderer::{Renderer, CONTINUATION_PREFIX, PREFIX_WIDTH, PROMPT_PREFIX};
pub use repl::{Repl, ReplHandler};
