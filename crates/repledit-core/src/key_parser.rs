//! State machine parser for raw terminal input.
//!
//! Handles partial byte sequences correctly: multi-byte escape sequences are
//! buffered between calls until they complete or go dead, and multi-byte
//! UTF-8 characters are assembled before being reported as printable text.
//! A lone ESC is only resolved once the caller flushes, which the io layer
//! drives off its read timeout.

use crate::key::{Key, KeyEvent};
use crate::sequence_matcher::{MatchResult, SequenceMatcher};

/// Cap on the escape-sequence buffer to prevent unbounded growth.
const MAX_BUFFER_SIZE: usize = 1024;

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Plain input and known single-byte sequences.
    Normal,
    /// Inside an escape sequence (after ESC).
    EscapeSequence,
    /// Inside a Control Sequence Introducer sequence (after ESC [).
    CsiSequence,
}

/// Converts raw terminal bytes to key events.
pub struct KeyParser {
    state: ParserState,
    /// Accumulator for escape sequences.
    buffer: Vec<u8>,
    /// Accumulator for a partial UTF-8 character.
    utf8_pending: Vec<u8>,
    sequence_matcher: SequenceMatcher,
}

impl KeyParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Normal,
            buffer: Vec::new(),
            utf8_pending: Vec::new(),
            sequence_matcher: SequenceMatcher::new(),
        }
    }

    /// Feed raw bytes and collect the key events they complete.
    ///
    /// Partial sequences stay buffered until more input arrives or the
    /// caller decides the stream has gone quiet and calls [`flush`].
    ///
    /// [`flush`]: KeyParser::flush
    pub fn feed(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        let mut events = Vec::new();

        for &byte in data {
            if self.buffer.len() >= MAX_BUFFER_SIZE {
                if let Some(event) = self.flush_buffer_as_text() {
                    events.push(event);
                }
                self.reset_to_normal();
            }

            match self.state {
                ParserState::Normal => self.handle_normal_byte(byte, &mut events),
                ParserState::EscapeSequence => self.handle_escape_byte(byte, &mut events),
                ParserState::CsiSequence => self.handle_csi_byte(byte, &mut events),
            }
        }

        events
    }

    /// Resolve whatever is still buffered.
    ///
    /// Call when the input stream has gone quiet (read timeout, EOF). A
    /// buffered lone ESC comes out as [`Key::Escape`] here; anything else is
    /// salvaged by longest-match.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();

        if !self.buffer.is_empty() {
            if let Some(longest) = self.sequence_matcher.find_longest_match(&self.buffer) {
                events.push(KeyEvent::simple(
                    longest.key,
                    self.buffer[..longest.consumed_bytes].to_vec(),
                ));
                for &byte in &self.buffer[longest.consumed_bytes..] {
                    events.push(self.create_char_event(byte));
                }
            } else {
                for &byte in &self.buffer {
                    events.push(self.create_char_event(byte));
                }
            }
        }

        if !self.utf8_pending.is_empty() {
            events.push(KeyEvent::simple(Key::NotDefined, self.utf8_pending.clone()));
        }

        self.reset();
        events
    }

    /// Reset the parser state and drop all buffered bytes.
    pub fn reset(&mut self) {
        self.state = ParserState::Normal;
        self.buffer.clear();
        self.utf8_pending.clear();
    }

    /// Current state, mainly useful to tests and diagnostics.
    pub fn state(&self) -> ParserState {
        self.state
    }

    fn handle_normal_byte(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        if !self.utf8_pending.is_empty() {
            self.handle_utf8_continuation(byte, events);
            return;
        }

        if byte == 0x1b {
            self.buffer.push(byte);
            self.state = ParserState::EscapeSequence;
        } else if byte >= 0x80 {
            if utf8_sequence_len(byte) > 0 {
                self.utf8_pending.push(byte);
            } else {
                // A continuation or invalid byte with no lead; nothing to
                // assemble it into.
                events.push(KeyEvent::simple(Key::NotDefined, vec![byte]));
            }
        } else {
            match self.sequence_matcher.match_sequence(&[byte]) {
                MatchResult::Exact(key) => {
                    events.push(KeyEvent::simple(key, vec![byte]));
                }
                _ => {
                    events.push(self.create_char_event(byte));
                }
            }
        }
    }

    fn handle_utf8_continuation(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        if (0x80..=0xbf).contains(&byte) {
            self.utf8_pending.push(byte);
            let expected = utf8_sequence_len(self.utf8_pending[0]);
            if self.utf8_pending.len() == expected {
                let bytes = std::mem::take(&mut self.utf8_pending);
                match String::from_utf8(bytes.clone()) {
                    Ok(text) => events.push(KeyEvent::with_text(Key::NotDefined, bytes, text)),
                    Err(_) => events.push(KeyEvent::simple(Key::NotDefined, bytes)),
                }
            }
        } else {
            // Truncated character; report the fragment and reprocess the
            // byte that interrupted it.
            let bytes = std::mem::take(&mut self.utf8_pending);
            events.push(KeyEvent::simple(Key::NotDefined, bytes));
            self.handle_normal_byte(byte, events);
        }
    }

    fn handle_escape_byte(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        self.buffer.push(byte);

        if self.buffer == b"\x1b[" {
            self.state = ParserState::CsiSequence;
            return;
        }

        match self.sequence_matcher.match_sequence(&self.buffer) {
            MatchResult::Exact(key) => {
                self.emit_unless_ignored(key, events);
                self.reset_to_normal();
            }
            MatchResult::Prefix => {}
            MatchResult::NoMatch => {
                // Dead escape sequence: report the ESC and replay the rest.
                events.push(KeyEvent::simple(Key::Escape, vec![0x1b]));

                let remaining: Vec<u8> = self.buffer[1..].to_vec();
                self.reset_to_normal();
                for b in remaining {
                    self.handle_normal_byte(b, events);
                }
            }
        }
    }

    fn handle_csi_byte(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        self.buffer.push(byte);

        match self.sequence_matcher.match_sequence(&self.buffer) {
            MatchResult::Exact(key) => {
                self.emit_unless_ignored(key, events);
                self.reset_to_normal();
            }
            MatchResult::Prefix => {}
            MatchResult::NoMatch => {
                if is_csi_parameter_byte(byte) {
                    // Parameterized sequence we may still recognize the end of
                } else if is_csi_final_byte(byte) {
                    let key = if byte == b'R' {
                        // Cursor position report arriving through the normal
                        // input path; recognized so it never types garbage.
                        Key::CPRResponse
                    } else {
                        Key::NotDefined
                    };
                    events.push(KeyEvent::simple(key, self.buffer.clone()));
                    self.reset_to_normal();
                } else {
                    // Not a CSI byte at all; degrade to ESC, '[', and replay.
                    events.push(KeyEvent::simple(Key::Escape, vec![0x1b]));
                    events.push(self.create_char_event(0x5b));

                    let remaining: Vec<u8> = self.buffer[2..].to_vec();
                    self.reset_to_normal();
                    for b in remaining {
                        self.handle_normal_byte(b, events);
                    }
                }
            }
        }
    }

    fn emit_unless_ignored(&self, key: Key, events: &mut Vec<KeyEvent>) {
        if key != Key::Ignore {
            events.push(KeyEvent::simple(key, self.buffer.clone()));
        }
    }

    fn reset_to_normal(&mut self) {
        self.state = ParserState::Normal;
        self.buffer.clear();
    }

    fn create_char_event(&self, byte: u8) -> KeyEvent {
        if byte.is_ascii() && !byte.is_ascii_control() {
            KeyEvent::with_text(Key::NotDefined, vec![byte], (byte as char).to_string())
        } else {
            KeyEvent::simple(Key::NotDefined, vec![byte])
        }
    }

    fn flush_buffer_as_text(&mut self) -> Option<KeyEvent> {
        if self.buffer.is_empty() {
            return None;
        }

        let text = String::from_utf8_lossy(&self.buffer).to_string();
        let event = KeyEvent::with_text(Key::NotDefined, self.buffer.clone(), text);
        self.buffer.clear();
        Some(event)
    }
}

impl Default for KeyParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Total length of a UTF-8 sequence given its lead byte, or 0 when the byte
/// cannot lead one.
fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

fn is_csi_parameter_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b';' | b':' | b'<' | b'=' | b'>' | b'?')
}

fn is_csi_final_byte(byte: u8) -> bool {
    matches!(byte, b'@'..=b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_starts_normal() {
        let parser = KeyParser::new();
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_single_control_characters() {
        let mut parser = KeyParser::new();

        let events = parser.feed(&[0x0d]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Enter);

        let events = parser.feed(&[0x09]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Tab);

        let events = parser.feed(&[0x7f]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Backspace);
    }

    #[test]
    fn test_printable_characters_carry_text() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"hi");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(events[0].text_or_empty(), "h");
        assert_eq!(events[1].text_or_empty(), "i");
    }

    #[test]
    fn test_arrow_keys() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[A");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Up);
        assert_eq!(events[0].raw_bytes, b"\x1b[A");
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_incremental_sequence() {
        let mut parser = KeyParser::new();

        assert!(parser.feed(&[0x1b]).is_empty());
        assert_eq!(parser.state(), ParserState::EscapeSequence);

        assert!(parser.feed(&[0x5b]).is_empty());
        assert_eq!(parser.state(), ParserState::CsiSequence);

        let events = parser.feed(&[0x44]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Left);
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_lone_escape_resolves_on_flush() {
        let mut parser = KeyParser::new();

        assert!(parser.feed(&[0x1b]).is_empty());
        let events = parser.flush();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Escape);
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_modified_arrows() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[1;5D");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::ControlLeft);

        let events = parser.feed(b"\x1b[1;2A");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::ShiftUp);
    }

    #[test]
    fn test_control_enter_csi_u() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[13;5u");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::ControlEnter);
    }

    #[test]
    fn test_unknown_csi_degrades_to_not_defined() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[99z");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_cursor_position_report_is_swallowed() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[12;40R");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::CPRResponse);
        assert!(!events[0].has_text());
    }

    #[test]
    fn test_invalid_escape_replays_byte() {
        let mut parser = KeyParser::new();

        let events = parser.feed(&[0x1b, b'x']);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::Escape);
        assert_eq!(events[1].text_or_empty(), "x");
    }

    #[test]
    fn test_utf8_character_assembles() {
        let mut parser = KeyParser::new();

        let events = parser.feed("é".as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(events[0].text_or_empty(), "é");
    }

    #[test]
    fn test_utf8_split_across_feeds() {
        let mut parser = KeyParser::new();

        let bytes = "λ".as_bytes();
        assert!(parser.feed(&bytes[..1]).is_empty());
        let events = parser.feed(&bytes[1..]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text_or_empty(), "λ");
    }

    #[test]
    fn test_four_byte_utf8() {
        let mut parser = KeyParser::new();

        let events = parser.feed("🦀".as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text_or_empty(), "🦀");
    }

    #[test]
    fn test_truncated_utf8_does_not_poison_following_input() {
        let mut parser = KeyParser::new();

        // Lead byte of a two-byte sequence followed by plain ASCII
        let events = parser.feed(&[0xc3, b'a']);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::NotDefined);
        assert!(!events[0].has_text());
        assert_eq!(events[1].text_or_empty(), "a");
    }

    #[test]
    fn test_mixed_input() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x03\x1b[A a\x1b[B");
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].key, Key::ControlC);
        assert_eq!(events[1].key, Key::Up);
        assert_eq!(events[2].text_or_empty(), " ");
        assert_eq!(events[3].text_or_empty(), "a");
        assert_eq!(events[4].key, Key::Down);
    }

    #[test]
    fn test_ignore_sequence_produces_nothing() {
        let mut parser = KeyParser::new();

        let events = parser.feed(b"\x1b[E");
        assert!(events.is_empty());
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_flush_salvages_partial_csi() {
        let mut parser = KeyParser::new();

        parser.feed(b"\x1b[1");
        let events = parser.flush();
        assert!(!events.is_empty());
        // ESC itself is the longest valid match at the front
        assert_eq!(events[0].key, Key::Escape);
        assert_eq!(parser.state(), ParserState::Normal);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut parser = KeyParser::new();

        parser.feed(b"\x1b[");
        assert_eq!(parser.state(), ParserState::CsiSequence);
        parser.reset();
        assert_eq!(parser.state(), ParserState::Normal);
        assert!(parser.flush().is_empty());
    }

    #[test]
    fn test_buffer_overflow_protection() {
        let mut parser = KeyParser::new();

        let mut long_input = vec![0x1b, 0x5b];
        long_input.extend(vec![b'0'; MAX_BUFFER_SIZE]);

        let events = parser.feed(&long_input);
        assert!(!events.is_empty());
        assert_eq!(parser.state(), ParserState::Normal);
    }
}
