//! Key definitions for terminal input handling.
//!
//! Keys arrive from the terminal as raw byte sequences; the parser resolves
//! them to [`Key`] values and wraps them in [`KeyEvent`]s together with the
//! original bytes and, for printable input, the decoded text.

/// A named key resolved from a terminal input sequence.
///
/// Control-modified editing keys are first-class variants because the
/// dispatcher binds them directly. The remaining C0 control characters keep
/// their letter names so they can be recognized (and ignored) cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Editing and submission keys
    Enter,
    ControlEnter,
    Tab,
    BackTab,
    Backspace,
    ControlBackspace,
    Delete,
    ShiftDelete,
    ControlDelete,
    Escape,

    // Navigation
    Up,
    Down,
    Right,
    Left,
    ControlUp,
    ControlDown,
    ControlRight,
    ControlLeft,
    ShiftUp,
    ShiftDown,
    ShiftRight,
    ShiftLeft,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Remaining C0 controls. 0x08/0x09/0x0a/0x0d are covered by
    // ControlBackspace/Tab/ControlEnter/Enter above.
    ControlSpace,
    ControlA,
    ControlB,
    ControlC,
    ControlD,
    ControlE,
    ControlF,
    ControlG,
    ControlK,
    ControlL,
    ControlN,
    ControlO,
    ControlP,
    ControlQ,
    ControlR,
    ControlS,
    ControlT,
    ControlU,
    ControlV,
    ControlW,
    ControlX,
    ControlY,
    ControlZ,
    ControlBackslash,
    ControlSquareClose,
    ControlCircumflex,
    ControlUnderscore,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    /// Cursor position report (`ESC [ r ; c R`); swallowed, never dispatched.
    CPRResponse,
    /// A recognized sequence that deliberately maps to nothing.
    Ignore,
    /// An unrecognized sequence or a plain printable character.
    NotDefined,
}

/// A single input event: the resolved key, the raw bytes that produced it,
/// and the decoded text when the input was printable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub raw_bytes: Vec<u8>,
    pub text: Option<String>,
}

impl KeyEvent {
    /// Create an event without associated text.
    pub fn simple(key: Key, raw_bytes: Vec<u8>) -> Self {
        Self {
            key,
            raw_bytes,
            text: None,
        }
    }

    /// Create an event carrying decoded printable text.
    pub fn with_text(key: Key, raw_bytes: Vec<u8>, text: String) -> Self {
        Self {
            key,
            raw_bytes,
            text: Some(text),
        }
    }

    /// Whether this event carries printable text.
    pub fn has_text(&self) -> bool {
        self.text.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// The decoded text, or an empty string when there is none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_event_has_no_text() {
        let event = KeyEvent::simple(Key::Left, vec![0x1b, 0x5b, 0x44]);
        assert_eq!(event.key, Key::Left);
        assert!(!event.has_text());
        assert_eq!(event.text_or_empty(), "");
    }

    #[test]
    fn test_event_with_text() {
        let event = KeyEvent::with_text(Key::NotDefined, vec![0x61], "a".to_string());
        assert!(event.has_text());
        assert_eq!(event.text_or_empty(), "a");
    }

    #[test]
    fn test_empty_text_counts_as_no_text() {
        let event = KeyEvent::with_text(Key::NotDefined, vec![], String::new());
        assert!(!event.has_text());
    }

    #[test]
    fn test_key_is_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Key::Enter, "submit");
        assert_eq!(map.get(&Key::Enter), Some(&"submit"));
    }
}
