//! Terminal backends for the repledit line editing engine.
//!
//! This crate supplies concrete implementations of the console traits from
//! `repledit_core`:
//! - [`UnixConsoleInput`] / [`UnixConsoleOutput`]: POSIX termios raw mode and
//!   VT100 escape sequences (Linux, macOS, BSDs).
//! - [`mock::MockConsoleInput`] / [`mock::MockConsoleOutput`]: scripted input
//!   and a virtual screen for driving full editing sessions in tests.

use std::io;

// Re-export core types so backend consumers need only this crate.
pub use repledit_core::{
    BackendType, ClearType, Color, ConsoleCapabilities, ConsoleError, ConsoleInput, ConsoleOutput,
    ConsoleResult, Key, KeyEvent, KeyParser, OutputCapabilities, RawModeGuard, TextStyle,
};

pub fn io_error_to_console_error(e: io::Error) -> ConsoleError {
    ConsoleError::IoError(e.to_string())
}

/// Create both console input and output for the current platform.
pub fn create_console_io() -> ConsoleResult<(Box<dyn ConsoleInput>, Box<dyn ConsoleOutput>)> {
    let input = create_console_input()?;
    let output = create_console_output()?;
    Ok((input, output))
}

/// Create console input for the current platform.
pub fn create_console_input() -> ConsoleResult<Box<dyn ConsoleInput>> {
    #[cfg(unix)]
    {
        let input = unix::UnixConsoleInput::new()?;
        Ok(Box::new(input))
    }

    #[cfg(not(unix))]
    {
        Err(ConsoleError::UnsupportedFeature {
            feature: "console input".to_string(),
            platform: std::env::consts::OS.to_string(),
        })
    }
}

/// Create console output for the current platform.
pub fn create_console_output() -> ConsoleResult<Box<dyn ConsoleOutput>> {
    #[cfg(unix)]
    {
        let output = unix::UnixConsoleOutput::new()?;
        Ok(Box::new(output))
    }

    #[cfg(not(unix))]
    {
        Err(ConsoleError::UnsupportedFeature {
            feature: "console output".to_string(),
            platform: std::env::consts::OS.to_string(),
        })
    }
}

/// Create mock console I/O for testing.
pub fn create_mock_console_io() -> (Box<dyn ConsoleInput>, Box<dyn ConsoleOutput>) {
    (
        Box::new(mock::MockConsoleInput::new()),
        Box::new(mock::MockConsoleOutput::new()),
    )
}

#[cfg(unix)]
mod unix;

pub mod mock;

#[cfg(unix)]
pub use unix::{UnixConsoleInput, UnixConsoleOutput};
