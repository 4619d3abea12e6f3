//! Unix console backend: termios raw mode plus VT100 escape sequences.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use repledit_core::{
    BackendType, ClearType, Color, ConsoleCapabilities, ConsoleError, ConsoleInput, ConsoleOutput,
    ConsoleResult, KeyEvent, KeyParser, OutputCapabilities, RawModeGuard, TextStyle,
};

use crate::io_error_to_console_error;

const READ_CHUNK_SIZE: usize = 1024;
const CURSOR_REPORT_TIMEOUT: Duration = Duration::from_millis(200);

/// Console input reading raw bytes from stdin through a [`KeyParser`].
///
/// Backend byte reads can carry several key presses at once (pastes, fast
/// typing), so decoded events queue up internally and drain one per
/// [`ConsoleInput::read_key_timeout`] call.
pub struct UnixConsoleInput {
    stdin_fd: i32,
    parser: Mutex<KeyParser>,
    pending: Mutex<VecDeque<KeyEvent>>,
}

impl UnixConsoleInput {
    /// Errors with [`ConsoleError::NotATerminal`] when stdin is not a TTY.
    pub fn new() -> ConsoleResult<Self> {
        if unsafe { libc::isatty(libc::STDIN_FILENO) } == 0 {
            return Err(ConsoleError::NotATerminal);
        }
        Ok(Self {
            stdin_fd: libc::STDIN_FILENO,
            parser: Mutex::new(KeyParser::new()),
            pending: Mutex::new(VecDeque::new()),
        })
    }

    fn saved_terminal_state(fd: i32) -> io::Result<(libc::termios, i32)> {
        let mut termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok((termios, flags))
    }

    fn enter_raw_mode(fd: i32, saved: &libc::termios, saved_flags: i32) -> io::Result<()> {
        let mut raw = *saved;
        raw.c_lflag &= !(libc::ICANON
            | libc::ECHO
            | libc::ECHOE
            | libc::ECHOK
            | libc::ECHONL
            | libc::ISIG
            | libc::IEXTEN);
        raw.c_iflag &= !(libc::IXON
            | libc::IXOFF
            | libc::ICRNL
            | libc::INLCR
            | libc::IGNCR
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag &= !libc::CSIZE;
        raw.c_cflag |= libc::CS8;
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::fcntl(fd, libc::F_SETFL, saved_flags | libc::O_NONBLOCK) } == -1 {
            let err = io::Error::last_os_error();
            unsafe { libc::tcsetattr(fd, libc::TCSANOW, saved) };
            return Err(err);
        }
        Ok(())
    }

    /// Non-blocking read of whatever bytes are available right now.
    fn try_read(&self) -> ConsoleResult<Option<KeyEvent>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let n = unsafe {
            libc::read(
                self.stdin_fd,
                chunk.as_mut_ptr() as *mut libc::c_void,
                chunk.len(),
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(c) if c == libc::EAGAIN || c == libc::EWOULDBLOCK || c == libc::EINTR => {
                    Ok(None)
                }
                _ => Err(io_error_to_console_error(err)),
            };
        }
        if n == 0 {
            return Err(ConsoleError::InputClosed);
        }
        let events = self.parser.lock().unwrap().feed(&chunk[..n as usize]);
        let mut pending = self.pending.lock().unwrap();
        pending.extend(events);
        Ok(pending.pop_front())
    }
}

impl ConsoleInput for UnixConsoleInput {
    fn enable_raw_mode(&self) -> ConsoleResult<RawModeGuard> {
        let fd = self.stdin_fd;
        let (saved, saved_flags) = Self::saved_terminal_state(fd)
            .map_err(|e| ConsoleError::RawModeError(e.to_string()))?;
        Self::enter_raw_mode(fd, &saved, saved_flags)
            .map_err(|e| ConsoleError::RawModeError(e.to_string()))?;
        log::debug!("raw mode enabled on stdin");

        let restore = move || unsafe {
            let _ = libc::tcsetattr(fd, libc::TCSANOW, &saved);
            let _ = libc::fcntl(fd, libc::F_SETFL, saved_flags);
        };
        Ok(RawModeGuard::new(restore, "Unix VT".to_string()))
    }

    fn read_key_timeout(&self, timeout_ms: Option<u32>) -> ConsoleResult<Option<KeyEvent>> {
        if let Some(event) = self.pending.lock().unwrap().pop_front() {
            return Ok(Some(event));
        }
        match timeout_ms {
            Some(0) => self.try_read(),
            Some(ms) => {
                if poll_readable(self.stdin_fd, ms as i32)? {
                    self.try_read()
                } else {
                    // Timeout. Resolve any partial escape sequence the parser
                    // still holds; a lone ESC press surfaces here.
                    let events = self.parser.lock().unwrap().flush();
                    let mut pending = self.pending.lock().unwrap();
                    pending.extend(events);
                    Ok(pending.pop_front())
                }
            }
            None => loop {
                if let Some(event) = self.read_key_timeout(Some(100))? {
                    return Ok(Some(event));
                }
            },
        }
    }

    fn get_window_size(&self) -> ConsoleResult<(u16, u16)> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) } == -1 {
            return Err(io_error_to_console_error(io::Error::last_os_error()));
        }
        Ok((ws.ws_col, ws.ws_row))
    }

    fn get_capabilities(&self) -> ConsoleCapabilities {
        ConsoleCapabilities {
            supports_raw_mode: true,
            supports_unicode: true,
            platform_name: "Unix VT".to_string(),
            backend_type: BackendType::UnixVt,
        }
    }
}

/// Console output writing VT100 sequences directly to the stdout fd.
pub struct UnixConsoleOutput {
    stdout_fd: i32,
}

impl UnixConsoleOutput {
    /// Errors with [`ConsoleError::NotATerminal`] when stdout is not a TTY.
    pub fn new() -> ConsoleResult<Self> {
        if unsafe { libc::isatty(libc::STDOUT_FILENO) } == 0 {
            return Err(ConsoleError::NotATerminal);
        }
        Ok(Self {
            stdout_fd: libc::STDOUT_FILENO,
        })
    }

    fn write_bytes(&self, bytes: &[u8]) -> ConsoleResult<()> {
        let mut written = 0;
        while written < bytes.len() {
            let n = unsafe {
                libc::write(
                    self.stdout_fd,
                    bytes[written..].as_ptr() as *const libc::c_void,
                    bytes.len() - written,
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(c) if c == libc::EINTR => continue,
                    // Raw mode sets O_NONBLOCK on stdin, and stdout often
                    // shares the same terminal file description.
                    Some(c) if c == libc::EAGAIN || c == libc::EWOULDBLOCK => {
                        wait_writable(self.stdout_fd)?;
                        continue;
                    }
                    _ => return Err(io_error_to_console_error(err)),
                }
            }
            written += n as usize;
        }
        Ok(())
    }

    /// Round-trip a `ESC [ 6 n` query through the terminal.
    ///
    /// The terminal answers on stdin, so stdin is switched to raw mode for
    /// the duration of the query and restored afterwards. Harmless when raw
    /// mode is already active: the restore reinstates the raw settings.
    fn query_cursor_position(&self) -> ConsoleResult<(u16, u16)> {
        let stdin_fd = libc::STDIN_FILENO;
        let mut saved = std::mem::MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(stdin_fd, saved.as_mut_ptr()) } != 0 {
            return Err(io_error_to_console_error(io::Error::last_os_error()));
        }
        let saved = unsafe { saved.assume_init() };
        let mut raw = saved;
        unsafe {
            libc::cfmakeraw(&mut raw);
            if libc::tcsetattr(stdin_fd, libc::TCSANOW, &raw) != 0 {
                return Err(io_error_to_console_error(io::Error::last_os_error()));
            }
        }

        let result = self.read_cursor_report(stdin_fd);
        unsafe {
            libc::tcsetattr(stdin_fd, libc::TCSANOW, &saved);
        }
        if let Ok((row, col)) = &result {
            log::trace!("cursor report: row {row}, col {col}");
        }
        result
    }

    fn read_cursor_report(&self, stdin_fd: i32) -> ConsoleResult<(u16, u16)> {
        self.write_bytes(b"\x1b[6n")?;

        let deadline = Instant::now() + CURSOR_REPORT_TIMEOUT;
        let mut response = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ConsoleError::InvalidCursorReport(
                    "timed out waiting for report".to_string(),
                ));
            }
            if !poll_readable(stdin_fd, remaining.as_millis() as i32)? {
                continue;
            }
            let n = unsafe { libc::read(stdin_fd, byte.as_mut_ptr() as *mut libc::c_void, 1) };
            if n < 0 {
                let err = io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(c) if c == libc::EAGAIN || c == libc::EWOULDBLOCK || c == libc::EINTR => {
                        continue
                    }
                    _ => return Err(io_error_to_console_error(err)),
                }
            }
            if n == 0 {
                return Err(ConsoleError::InputClosed);
            }
            response.push(byte[0]);
            if byte[0] == b'R' {
                return parse_cursor_report(&response);
            }
            if response.len() > 64 {
                return Err(ConsoleError::InvalidCursorReport(format!(
                    "overlong response: {:?}",
                    String::from_utf8_lossy(&response)
                )));
            }
        }
    }
}

impl ConsoleOutput for UnixConsoleOutput {
    fn write_text(&self, text: &str) -> ConsoleResult<()> {
        self.write_bytes(text.as_bytes())
    }

    fn write_styled_text(&self, text: &str, style: &TextStyle) -> ConsoleResult<()> {
        let sequence = style_sequence(style);
        if sequence.is_empty() {
            return self.write_text(text);
        }
        self.write_bytes(sequence.as_bytes())?;
        self.write_text(text)?;
        self.reset_style()
    }

    fn move_cursor_to(&self, row: u16, col: u16) -> ConsoleResult<()> {
        self.write_bytes(move_sequence(row, col).as_bytes())
    }

    fn clear(&self, clear_type: ClearType) -> ConsoleResult<()> {
        self.write_bytes(clear_sequence(clear_type).as_bytes())
    }

    fn set_style(&self, style: &TextStyle) -> ConsoleResult<()> {
        let sequence = style_sequence(style);
        if sequence.is_empty() {
            return Ok(());
        }
        self.write_bytes(sequence.as_bytes())
    }

    fn reset_style(&self) -> ConsoleResult<()> {
        self.write_bytes(b"\x1b[0m")
    }

    fn flush(&self) -> ConsoleResult<()> {
        // Writes go straight to the terminal fd; nothing is buffered here.
        Ok(())
    }

    fn set_cursor_visible(&self, visible: bool) -> ConsoleResult<()> {
        if visible {
            self.write_bytes(b"\x1b[?25h")
        } else {
            self.write_bytes(b"\x1b[?25l")
        }
    }

    fn get_cursor_position(&self) -> ConsoleResult<(u16, u16)> {
        self.query_cursor_position()
    }

    fn get_capabilities(&self) -> OutputCapabilities {
        OutputCapabilities {
            supports_colors: true,
            supports_styling: true,
            supports_cursor_reports: true,
            platform_name: "Unix VT".to_string(),
            backend_type: BackendType::UnixVt,
        }
    }
}

fn poll_readable(fd: i32, timeout_ms: i32) -> ConsoleResult<bool> {
    let mut poll_fd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let rc = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            return Ok(false);
        }
        return Err(io_error_to_console_error(err));
    }
    Ok(rc > 0)
}

fn wait_writable(fd: i32) -> ConsoleResult<()> {
    loop {
        let mut poll_fd = libc::pollfd {
            fd,
            events: libc::POLLOUT,
            revents: 0,
        };
        let rc = unsafe { libc::poll(&mut poll_fd, 1, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(io_error_to_console_error(err));
        }
        return Ok(());
    }
}

/// Absolute cursor positioning sequence. 0-based API, 1-based ANSI.
fn move_sequence(row: u16, col: u16) -> String {
    format!("\x1b[{};{}H", u32::from(row) + 1, u32::from(col) + 1)
}

fn clear_sequence(clear_type: ClearType) -> &'static str {
    match clear_type {
        ClearType::All => "\x1b[2J",
        ClearType::FromCursor => "\x1b[0J",
        ClearType::ToCursor => "\x1b[1J",
        ClearType::CurrentLine => "\x1b[2K",
        ClearType::FromCursorToEndOfLine => "\x1b[0K",
        ClearType::FromBeginningOfLineToCursor => "\x1b[1K",
    }
}

fn fg_code(color: &Color) -> String {
    match color {
        Color::Black => "30".to_string(),
        Color::Red => "31".to_string(),
        Color::Green => "32".to_string(),
        Color::Yellow => "33".to_string(),
        Color::Blue => "34".to_string(),
        Color::Magenta => "35".to_string(),
        Color::Cyan => "36".to_string(),
        Color::White => "37".to_string(),
        Color::BrightBlack => "90".to_string(),
        Color::BrightRed => "91".to_string(),
        Color::BrightGreen => "92".to_string(),
        Color::BrightYellow => "93".to_string(),
        Color::BrightBlue => "94".to_string(),
        Color::BrightMagenta => "95".to_string(),
        Color::BrightCyan => "96".to_string(),
        Color::BrightWhite => "97".to_string(),
        Color::Rgb(r, g, b) => format!("38;2;{r};{g};{b}"),
        Color::Ansi256(n) => format!("38;5;{n}"),
    }
}

fn bg_code(color: &Color) -> String {
    match color {
        Color::Black => "40".to_string(),
        Color::Red => "41".to_string(),
        Color::Green => "42".to_string(),
        Color::Yellow => "43".to_string(),
        Color::Blue => "44".to_string(),
        Color::Magenta => "45".to_string(),
        Color::Cyan => "46".to_string(),
        Color::White => "47".to_string(),
        Color::BrightBlack => "100".to_string(),
        Color::BrightRed => "101".to_string(),
        Color::BrightGreen => "102".to_string(),
        Color::BrightYellow => "103".to_string(),
        Color::BrightBlue => "104".to_string(),
        Color::BrightMagenta => "105".to_string(),
        Color::BrightCyan => "106".to_string(),
        Color::BrightWhite => "107".to_string(),
        Color::Rgb(r, g, b) => format!("48;2;{r};{g};{b}"),
        Color::Ansi256(n) => format!("48;5;{n}"),
    }
}

/// Complete SGR sequence for a style, or an empty string for the default
/// style so callers can skip the write entirely.
fn style_sequence(style: &TextStyle) -> String {
    let mut codes = Vec::new();
    if let Some(fg) = &style.foreground {
        codes.push(fg_code(fg));
    }
    if let Some(bg) = &style.background {
        codes.push(bg_code(bg));
    }
    if style.bold {
        codes.push("1".to_string());
    }
    if style.dim {
        codes.push("2".to_string());
    }
    if style.italic {
        codes.push("3".to_string());
    }
    if style.underline {
        codes.push("4".to_string());
    }
    if style.reverse {
        codes.push("7".to_string());
    }
    if style.strikethrough {
        codes.push("9".to_string());
    }
    if codes.is_empty() {
        String::new()
    } else {
        format!("\x1b[{}m", codes.join(";"))
    }
}

/// Parse a `ESC [ row ; col R` cursor position report into 0-based
/// coordinates. Type-ahead bytes queued before the report are skipped.
fn parse_cursor_report(response: &[u8]) -> ConsoleResult<(u16, u16)> {
    let text = String::from_utf8_lossy(response);
    let start = text
        .rfind("\x1b[")
        .ok_or_else(|| ConsoleError::InvalidCursorReport(format!("no CSI in {text:?}")))?;
    let body = text[start + 2..].strip_suffix('R').ok_or_else(|| {
        ConsoleError::InvalidCursorReport(format!("unterminated report {text:?}"))
    })?;
    let (row_text, col_text) = body
        .split_once(';')
        .ok_or_else(|| ConsoleError::InvalidCursorReport(format!("malformed report {text:?}")))?;
    let row: u16 = row_text
        .parse()
        .map_err(|_| ConsoleError::InvalidCursorReport(format!("bad row in {text:?}")))?;
    let col: u16 = col_text
        .parse()
        .map_err(|_| ConsoleError::InvalidCursorReport(format!("bad column in {text:?}")))?;
    Ok((row.saturating_sub(1), col.saturating_sub(1)))
}
