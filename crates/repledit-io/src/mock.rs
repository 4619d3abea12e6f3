//! Mock console implementations for tests.
//!
//! [`MockConsoleInput`] replays a scripted queue of key events and
//! [`MockConsoleOutput`] maintains a virtual character grid, so a whole
//! editing session can run and be asserted on without a terminal.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use repledit_core::{
    BackendType, ClearType, ConsoleCapabilities, ConsoleError, ConsoleInput, ConsoleOutput,
    ConsoleResult, Key, KeyEvent, OutputCapabilities, RawModeGuard, TextStyle,
};

/// Scripted console input.
///
/// Clones share the queue, so a test keeps one handle for queueing while the
/// editor owns another. An exhausted queue reads as
/// [`ConsoleError::InputClosed`], ending a session instead of spinning.
#[derive(Clone)]
pub struct MockConsoleInput {
    queue: Arc<Mutex<VecDeque<KeyEvent>>>,
    window_size: Arc<Mutex<(u16, u16)>>,
    raw_mode: Arc<Mutex<bool>>,
}

impl MockConsoleInput {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            window_size: Arc::new(Mutex::new((80, 24))),
            raw_mode: Arc::new(Mutex::new(false)),
        }
    }

    /// Mock reporting a specific window size as (columns, rows).
    pub fn with_window_size(cols: u16, rows: u16) -> Self {
        let input = Self::new();
        input.set_window_size(cols, rows);
        input
    }

    pub fn set_window_size(&self, cols: u16, rows: u16) {
        *self.window_size.lock().unwrap() = (cols, rows);
    }

    /// Queue a bare key press with no text payload.
    pub fn queue_key(&self, key: Key) {
        self.queue_event(KeyEvent::simple(key, Vec::new()));
    }

    pub fn queue_event(&self, event: KeyEvent) {
        self.queue.lock().unwrap().push_back(event);
    }

    /// Queue text as one character event per char.
    pub fn queue_text(&self, text: &str) {
        let mut queue = self.queue.lock().unwrap();
        for ch in text.chars() {
            queue.push_back(KeyEvent::with_text(
                Key::NotDefined,
                ch.to_string().into_bytes(),
                ch.to_string(),
            ));
        }
    }

    pub fn queued_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_raw_mode(&self) -> bool {
        *self.raw_mode.lock().unwrap()
    }
}

impl Default for MockConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInput for MockConsoleInput {
    fn enable_raw_mode(&self) -> ConsoleResult<RawModeGuard> {
        *self.raw_mode.lock().unwrap() = true;
        let flag = Arc::clone(&self.raw_mode);
        let restore = move || {
            *flag.lock().unwrap() = false;
        };
        Ok(RawModeGuard::new(restore, "Mock".to_string()))
    }

    fn read_key_timeout(&self, _timeout_ms: Option<u32>) -> ConsoleResult<Option<KeyEvent>> {
        match self.queue.lock().unwrap().pop_front() {
            Some(event) => Ok(Some(event)),
            None => Err(ConsoleError::InputClosed),
        }
    }

    fn get_window_size(&self) -> ConsoleResult<(u16, u16)> {
        Ok(*self.window_size.lock().unwrap())
    }

    fn get_capabilities(&self) -> ConsoleCapabilities {
        ConsoleCapabilities {
            supports_raw_mode: true,
            supports_unicode: true,
            platform_name: "Mock".to_string(),
            backend_type: BackendType::Mock,
        }
    }
}

struct ScreenState {
    width: u16,
    rows: Vec<Vec<char>>,
    cursor: (u16, u16),
    cursor_visible: bool,
    ops: Vec<String>,
}

impl ScreenState {
    fn new(width: u16) -> Self {
        Self {
            width: width.max(1),
            rows: Vec::new(),
            cursor: (0, 0),
            cursor_visible: true,
            ops: Vec::new(),
        }
    }

    fn write_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.put_char(ch);
        }
    }

    fn put_char(&mut self, ch: char) {
        match ch {
            '\r' => self.cursor.1 = 0,
            '\n' => self.cursor.0 += 1,
            _ => {
                let (row, col) = self.cursor;
                self.set_cell(row, col, ch);
                self.cursor.1 += 1;
                if self.cursor.1 >= self.width {
                    self.cursor.0 += 1;
                    self.cursor.1 = 0;
                }
            }
        }
    }

    fn set_cell(&mut self, row: u16, col: u16, ch: char) {
        let row = row as usize;
        while self.rows.len() <= row {
            self.rows.push(vec![' '; self.width as usize]);
        }
        self.rows[row][col as usize] = ch;
    }

    fn row_text(&self, row: u16) -> String {
        self.rows
            .get(row as usize)
            .map(|cells| {
                cells
                    .iter()
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .unwrap_or_default()
    }

    fn clear_region(&mut self, clear_type: ClearType) {
        let (row, col) = (self.cursor.0 as usize, self.cursor.1 as usize);
        match clear_type {
            ClearType::All => {
                for cells in &mut self.rows {
                    cells.fill(' ');
                }
            }
            ClearType::FromCursor => {
                if let Some(cells) = self.rows.get_mut(row) {
                    for cell in cells.iter_mut().skip(col) {
                        *cell = ' ';
                    }
                }
                for cells in self.rows.iter_mut().skip(row + 1) {
                    cells.fill(' ');
                }
            }
            ClearType::ToCursor => {
                for cells in self.rows.iter_mut().take(row) {
                    cells.fill(' ');
                }
                if let Some(cells) = self.rows.get_mut(row) {
                    for cell in cells.iter_mut().take(col + 1) {
                        *cell = ' ';
                    }
                }
            }
            ClearType::CurrentLine => {
                if let Some(cells) = self.rows.get_mut(row) {
                    cells.fill(' ');
                }
            }
            ClearType::FromCursorToEndOfLine => {
                if let Some(cells) = self.rows.get_mut(row) {
                    for cell in cells.iter_mut().skip(col) {
                        *cell = ' ';
                    }
                }
            }
            ClearType::FromBeginningOfLineToCursor => {
                if let Some(cells) = self.rows.get_mut(row) {
                    for cell in cells.iter_mut().take(col + 1) {
                        *cell = ' ';
                    }
                }
            }
        }
    }
}

/// Virtual screen console output.
///
/// Writes land on a character grid that wraps at the configured width, the
/// way a real terminal lays text out. Clones share the grid, so a test keeps
/// one handle for assertions after handing the other to the editor.
#[derive(Clone)]
pub struct MockConsoleOutput {
    state: Arc<Mutex<ScreenState>>,
}

impl MockConsoleOutput {
    pub fn new() -> Self {
        Self::with_width(80)
    }

    /// Virtual screen wrapping at `width` columns.
    pub fn with_width(width: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState::new(width))),
        }
    }

    /// Place the cursor directly, e.g. to start a session partway down the
    /// screen. Not recorded in the operation log.
    pub fn set_cursor_position(&self, row: u16, col: u16) {
        self.state.lock().unwrap().cursor = (row, col);
    }

    /// Rendered text of one screen row, trailing blanks removed.
    pub fn screen_row(&self, row: u16) -> String {
        self.state.lock().unwrap().row_text(row)
    }

    /// All rendered rows, trailing blanks removed.
    pub fn screen(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        (0..state.rows.len())
            .map(|row| state.row_text(row as u16))
            .collect()
    }

    /// Log of output operations in call order.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.state.lock().unwrap().cursor_visible
    }
}

impl Default for MockConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOutput for MockConsoleOutput {
    fn write_text(&self, text: &str) -> ConsoleResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("write:{text}"));
        state.write_str(text);
        Ok(())
    }

    fn write_styled_text(&self, text: &str, _style: &TextStyle) -> ConsoleResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("styled:{text}"));
        state.write_str(text);
        Ok(())
    }

    fn move_cursor_to(&self, row: u16, col: u16) -> ConsoleResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("move:{row},{col}"));
        let col = col.min(state.width - 1);
        state.cursor = (row, col);
        Ok(())
    }

    fn clear(&self, clear_type: ClearType) -> ConsoleResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("clear:{clear_type:?}"));
        state.clear_region(clear_type);
        Ok(())
    }

    fn set_style(&self, _style: &TextStyle) -> ConsoleResult<()> {
        self.state.lock().unwrap().ops.push("set_style".to_string());
        Ok(())
    }

    fn reset_style(&self) -> ConsoleResult<()> {
        self.state.lock().unwrap().ops.push("reset_style".to_string());
        Ok(())
    }

    fn flush(&self) -> ConsoleResult<()> {
        self.state.lock().unwrap().ops.push("flush".to_string());
        Ok(())
    }

    fn set_cursor_visible(&self, visible: bool) -> ConsoleResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("cursor_visible:{visible}"));
        state.cursor_visible = visible;
        Ok(())
    }

    fn get_cursor_position(&self) -> ConsoleResult<(u16, u16)> {
        Ok(self.state.lock().unwrap().cursor)
    }

    fn get_capabilities(&self) -> OutputCapabilities {
        OutputCapabilities {
            supports_colors: true,
            supports_styling: true,
            supports_cursor_reports: true,
            platform_name: "Mock".to_string(),
            backend_type: BackendType::Mock,
        }
    }
}
