//! Trie-based sequence matcher for key sequence parsing.
//!
//! Maps byte sequences to keys and answers whether a partial sequence could
//! still grow into a longer valid one. The parser relies on this to decide
//! between waiting for more bytes and processing what it has.

use crate::key::Key;
use std::collections::BTreeMap;

/// A node in the trie.
#[derive(Debug, Clone)]
struct TrieNode {
    /// The key for this node if it terminates a complete sequence.
    key: Option<Key>,
    /// Child nodes indexed by the next byte.
    children: BTreeMap<u8, TrieNode>,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            key: None,
            children: BTreeMap::new(),
        }
    }
}

/// Result of matching a byte sequence against the trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The sequence is exactly one known key.
    Exact(Key),
    /// The sequence is a prefix of one or more longer sequences.
    Prefix,
    /// The sequence cannot match any known pattern.
    NoMatch,
}

/// The longest valid sequence found at the start of some input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestMatchResult {
    pub key: Key,
    pub consumed_bytes: usize,
}

/// Trie-based matcher preloaded with the VT100/xterm sequences this engine
/// understands.
pub struct SequenceMatcher {
    root: TrieNode,
}

impl SequenceMatcher {
    pub fn new() -> Self {
        let mut matcher = Self {
            root: TrieNode::new(),
        };
        matcher.build_standard_sequences();
        matcher
    }

    /// Whether the given bytes are an exact match, a prefix, or dead.
    pub fn match_sequence(&self, bytes: &[u8]) -> MatchResult {
        if bytes.is_empty() {
            return MatchResult::NoMatch;
        }

        match self.find_node(bytes) {
            Some(node) => match node.key {
                Some(key) => MatchResult::Exact(key),
                None => MatchResult::Prefix,
            },
            None => MatchResult::NoMatch,
        }
    }

    /// Find the longest valid sequence at the start of `bytes`. Used by the
    /// parser's flush path to salvage what it can from a stalled buffer.
    pub fn find_longest_match(&self, bytes: &[u8]) -> Option<LongestMatchResult> {
        let mut longest_match = None;
        let mut current_node = &self.root;

        for (i, &byte) in bytes.iter().enumerate() {
            match current_node.children.get(&byte) {
                Some(child) => {
                    current_node = child;
                    if let Some(key) = current_node.key {
                        longest_match = Some(LongestMatchResult {
                            key,
                            consumed_bytes: i + 1,
                        });
                    }
                }
                None => break,
            }
        }

        longest_match
    }

    fn find_node(&self, bytes: &[u8]) -> Option<&TrieNode> {
        let mut current = &self.root;
        for &byte in bytes {
            current = current.children.get(&byte)?;
        }
        Some(current)
    }

    /// Register a sequence mapping. Later insertions overwrite earlier ones.
    pub fn insert(&mut self, bytes: &[u8], key: Key) {
        let mut current = &mut self.root;
        for &byte in bytes {
            current = current.children.entry(byte).or_insert_with(TrieNode::new);
        }
        current.key = Some(key);
    }

    fn build_standard_sequences(&mut self) {
        // C0 control characters (single byte). 0x0d is Enter and 0x0a is
        // Ctrl+Enter; terminals send CR for the Enter key itself and LF only
        // for Ctrl+J. 0x08 is what Ctrl+Backspace produces, 0x7f the plain
        // Backspace key.
        self.insert(&[0x00], Key::ControlSpace);
        self.insert(&[0x01], Key::ControlA);
        self.insert(&[0x02], Key::ControlB);
        self.insert(&[0x03], Key::ControlC);
        self.insert(&[0x04], Key::ControlD);
        self.insert(&[0x05], Key::ControlE);
        self.insert(&[0x06], Key::ControlF);
        self.insert(&[0x07], Key::ControlG);
        self.insert(&[0x08], Key::ControlBackspace);
        self.insert(&[0x09], Key::Tab);
        self.insert(&[0x0a], Key::ControlEnter);
        self.insert(&[0x0b], Key::ControlK);
        self.insert(&[0x0c], Key::ControlL);
        self.insert(&[0x0d], Key::Enter);
        self.insert(&[0x0e], Key::ControlN);
        self.insert(&[0x0f], Key::ControlO);
        self.insert(&[0x10], Key::ControlP);
        self.insert(&[0x11], Key::ControlQ);
        self.insert(&[0x12], Key::ControlR);
        self.insert(&[0x13], Key::ControlS);
        self.insert(&[0x14], Key::ControlT);
        self.insert(&[0x15], Key::ControlU);
        self.insert(&[0x16], Key::ControlV);
        self.insert(&[0x17], Key::ControlW);
        self.insert(&[0x18], Key::ControlX);
        self.insert(&[0x19], Key::ControlY);
        self.insert(&[0x1a], Key::ControlZ);
        self.insert(&[0x1b], Key::Escape);
        self.insert(&[0x1c], Key::ControlBackslash);
        self.insert(&[0x1d], Key::ControlSquareClose);
        self.insert(&[0x1e], Key::ControlCircumflex);
        self.insert(&[0x1f], Key::ControlUnderscore);
        self.insert(&[0x7f], Key::Backspace);

        // Arrow keys (CSI)
        self.insert(b"\x1b[A", Key::Up);
        self.insert(b"\x1b[B", Key::Down);
        self.insert(b"\x1b[C", Key::Right);
        self.insert(b"\x1b[D", Key::Left);

        // Arrow keys (SS3, sent in application cursor mode)
        self.insert(b"\x1bOA", Key::Up);
        self.insert(b"\x1bOB", Key::Down);
        self.insert(b"\x1bOC", Key::Right);
        self.insert(b"\x1bOD", Key::Left);

        // Home and End variants
        self.insert(b"\x1b[H", Key::Home);
        self.insert(b"\x1b[F", Key::End);
        self.insert(b"\x1bOH", Key::Home);
        self.insert(b"\x1bOF", Key::End);
        self.insert(b"\x1b[1~", Key::Home);
        self.insert(b"\x1b[4~", Key::End);
        self.insert(b"\x1b[7~", Key::Home);
        self.insert(b"\x1b[8~", Key::End);

        // Delete and its modifiers
        self.insert(b"\x1b[3~", Key::Delete);
        self.insert(b"\x1b[3;2~", Key::ShiftDelete);
        self.insert(b"\x1b[3;5~", Key::ControlDelete);

        // Page Up / Page Down
        self.insert(b"\x1b[5~", Key::PageUp);
        self.insert(b"\x1b[6~", Key::PageDown);

        // Insert and BackTab
        self.insert(b"\x1b[2~", Key::Insert);
        self.insert(b"\x1b[Z", Key::BackTab);

        // Ctrl+Enter as xterm modifyOtherKeys and CSI-u report it
        self.insert(b"\x1b[27;5;13~", Key::ControlEnter);
        self.insert(b"\x1b[13;5u", Key::ControlEnter);

        // Control + arrow keys
        self.insert(b"\x1b[1;5A", Key::ControlUp);
        self.insert(b"\x1b[1;5B", Key::ControlDown);
        self.insert(b"\x1b[1;5C", Key::ControlRight);
        self.insert(b"\x1b[1;5D", Key::ControlLeft);

        // Alternative control + arrow forms (older xterm, rxvt)
        self.insert(b"\x1b[5A", Key::ControlUp);
        self.insert(b"\x1b[5B", Key::ControlDown);
        self.insert(b"\x1b[5C", Key::ControlRight);
        self.insert(b"\x1b[5D", Key::ControlLeft);
        self.insert(b"\x1bOc", Key::ControlRight);
        self.insert(b"\x1bOd", Key::ControlLeft);

        // Shift + arrow keys
        self.insert(b"\x1b[1;2A", Key::ShiftUp);
        self.insert(b"\x1b[1;2B", Key::ShiftDown);
        self.insert(b"\x1b[1;2C", Key::ShiftRight);
        self.insert(b"\x1b[1;2D", Key::ShiftLeft);

        // Function keys F1-F4 (SS3)
        self.insert(b"\x1bOP", Key::F1);
        self.insert(b"\x1bOQ", Key::F2);
        self.insert(b"\x1bOR", Key::F3);
        self.insert(b"\x1bOS", Key::F4);

        // Function keys F1-F4 (rxvt)
        self.insert(b"\x1b[11~", Key::F1);
        self.insert(b"\x1b[12~", Key::F2);
        self.insert(b"\x1b[13~", Key::F3);
        self.insert(b"\x1b[14~", Key::F4);

        // Function keys F5-F12
        self.insert(b"\x1b[15~", Key::F5);
        self.insert(b"\x1b[17~", Key::F6);
        self.insert(b"\x1b[18~", Key::F7);
        self.insert(b"\x1b[19~", Key::F8);
        self.insert(b"\x1b[20~", Key::F9);
        self.insert(b"\x1b[21~", Key::F10);
        self.insert(b"\x1b[23~", Key::F11);
        self.insert(b"\x1b[24~", Key::F12);

        // Cursor-next-line, emitted by some numpads; nothing to do with it
        self.insert(b"\x1b[E", Key::Ignore);
    }
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::new()
    }
}
