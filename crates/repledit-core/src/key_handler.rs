//! Key event dispatch onto the submission buffer.
//!
//! The dispatcher owns a key-to-action binding table and applies editing
//! actions directly to a [`SubmissionBuffer`]. Its result tells the session
//! loop how much screen work follows: an edit needs a repaint, a movement
//! only needs the cursor repositioned, and a guarded operation that did
//! nothing needs neither.

use crate::buffer::SubmissionBuffer;
use crate::key::{Key, KeyEvent};
use std::collections::HashMap;

/// Editing operations a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Offer the submission for completion
    Submit,
    /// Force a line break regardless of completeness
    InsertNewline,
    /// Blank out the current line
    ClearLine,
    DeleteLeft,
    DeleteRight,
    DeleteWordLeft,
    DeleteWordRight,
    MoveHome,
    MoveEnd,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveWordLeft,
    MoveWordRight,
    InsertTab,
    HistoryPrevious,
    HistoryNext,
}

/// What the session loop has to do after a key was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Buffer content changed; repaint the submission
    Edited,
    /// Only the cursor moved; reposition it without repainting
    Moved,
    /// The submission was offered for completion
    Submit,
    /// Recall the previous history entry
    HistoryPrevious,
    /// Recall the next history entry
    HistoryNext,
    /// Nothing happened
    Ignored,
}

/// Maps key events to buffer operations.
pub struct KeyDispatcher {
    bindings: HashMap<Key, EditAction>,
}

impl KeyDispatcher {
    /// Create a dispatcher with the default binding table.
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert(Key::Enter, EditAction::Submit);
        bindings.insert(Key::ControlEnter, EditAction::InsertNewline);
        bindings.insert(Key::Escape, EditAction::ClearLine);
        bindings.insert(Key::Tab, EditAction::InsertTab);

        bindings.insert(Key::Backspace, EditAction::DeleteLeft);
        bindings.insert(Key::ControlBackspace, EditAction::DeleteWordLeft);
        bindings.insert(Key::Delete, EditAction::DeleteRight);
        bindings.insert(Key::ControlDelete, EditAction::DeleteWordRight);

        bindings.insert(Key::Home, EditAction::MoveHome);
        bindings.insert(Key::End, EditAction::MoveEnd);
        bindings.insert(Key::Left, EditAction::MoveLeft);
        bindings.insert(Key::Right, EditAction::MoveRight);
        bindings.insert(Key::Up, EditAction::MoveUp);
        bindings.insert(Key::Down, EditAction::MoveDown);
        bindings.insert(Key::ControlLeft, EditAction::MoveWordLeft);
        bindings.insert(Key::ControlRight, EditAction::MoveWordRight);

        bindings.insert(Key::PageUp, EditAction::HistoryPrevious);
        bindings.insert(Key::PageDown, EditAction::HistoryNext);

        Self { bindings }
    }

    /// Bind a key to an action, replacing any existing binding.
    pub fn bind(&mut self, key: Key, action: EditAction) {
        self.bindings.insert(key, action);
    }

    /// Remove a binding. Returns `true` when one existed.
    pub fn unbind(&mut self, key: Key) -> bool {
        self.bindings.remove(&key).is_some()
    }

    /// The action a key is currently bound to.
    pub fn action_for(&self, key: Key) -> Option<EditAction> {
        self.bindings.get(&key).copied()
    }

    /// Apply a key event to the buffer.
    ///
    /// Bound keys run their action. Unbound events that carry printable text
    /// insert it; everything else is ignored, which silently absorbs strays
    /// like cursor position reports.
    pub fn dispatch(&self, event: &KeyEvent, buffer: &mut SubmissionBuffer) -> KeyResult {
        if let Some(action) = self.bindings.get(&event.key) {
            return execute(*action, buffer);
        }

        if event.has_text() && buffer.insert_text(event.text_or_empty()) {
            return KeyResult::Edited;
        }

        KeyResult::Ignored
    }
}

impl Default for KeyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn execute(action: EditAction, buffer: &mut SubmissionBuffer) -> KeyResult {
    match action {
        EditAction::Submit => KeyResult::Submit,
        EditAction::HistoryPrevious => KeyResult::HistoryPrevious,
        EditAction::HistoryNext => KeyResult::HistoryNext,

        EditAction::InsertNewline => edited(buffer.insert_newline()),
        EditAction::InsertTab => edited(buffer.insert_tab()),
        EditAction::ClearLine => edited(buffer.clear_line()),
        EditAction::DeleteLeft => edited(buffer.delete_left()),
        EditAction::DeleteRight => edited(buffer.delete_right()),
        EditAction::DeleteWordLeft => edited(buffer.delete_word_left()),
        EditAction::DeleteWordRight => edited(buffer.delete_word_right()),

        EditAction::MoveHome => moved(buffer.move_home()),
        EditAction::MoveEnd => moved(buffer.move_end()),
        EditAction::MoveLeft => moved(buffer.move_left()),
        EditAction::MoveRight => moved(buffer.move_right()),
        EditAction::MoveUp => moved(buffer.move_up()),
        EditAction::MoveDown => moved(buffer.move_down()),
        EditAction::MoveWordLeft => moved(buffer.move_word_left()),
        EditAction::MoveWordRight => moved(buffer.move_word_right()),
    }
}

fn edited(changed: bool) -> KeyResult {
    if changed {
        KeyResult::Edited
    } else {
        KeyResult::Ignored
    }
}

fn moved(happened: bool) -> KeyResult {
    if happened {
        KeyResult::Moved
    } else {
        KeyResult::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(key: Key) -> KeyEvent {
        KeyEvent::simple(key, vec![])
    }

    fn text_event(text: &str) -> KeyEvent {
        KeyEvent::with_text(Key::NotDefined, text.as_bytes().to_vec(), text.to_string())
    }

    #[test]
    fn test_default_bindings_present() {
        let dispatcher = KeyDispatcher::new();

        assert_eq!(dispatcher.action_for(Key::Enter), Some(EditAction::Submit));
        assert_eq!(
            dispatcher.action_for(Key::ControlEnter),
            Some(EditAction::InsertNewline)
        );
        assert_eq!(
            dispatcher.action_for(Key::Escape),
            Some(EditAction::ClearLine)
        );
        assert_eq!(
            dispatcher.action_for(Key::PageUp),
            Some(EditAction::HistoryPrevious)
        );
        assert_eq!(dispatcher.action_for(Key::ControlA), None);
    }

    #[test]
    fn test_typed_text_inserts() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&text_event("a"), &mut buffer),
            KeyResult::Edited
        );
        assert_eq!(
            dispatcher.dispatch(&text_event("b"), &mut buffer),
            KeyResult::Edited
        );
        assert_eq!(buffer.current_line(), "ab");
    }

    #[test]
    fn test_enter_requests_submit_without_touching_buffer() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();
        buffer.insert_text("x");

        assert_eq!(
            dispatcher.dispatch(&event(Key::Enter), &mut buffer),
            KeyResult::Submit
        );
        assert_eq!(buffer.current_line(), "x");
    }

    #[test]
    fn test_guarded_movement_is_ignored_at_bounds() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&event(Key::Left), &mut buffer),
            KeyResult::Ignored
        );
        assert_eq!(
            dispatcher.dispatch(&event(Key::Up), &mut buffer),
            KeyResult::Ignored
        );
    }

    #[test]
    fn test_home_moves_even_at_origin() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&event(Key::Home), &mut buffer),
            KeyResult::Moved
        );
        assert_eq!(
            dispatcher.dispatch(&event(Key::End), &mut buffer),
            KeyResult::Moved
        );
    }

    #[test]
    fn test_delete_right_at_line_end_is_ignored() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();
        buffer.insert_text("ab");

        assert_eq!(
            dispatcher.dispatch(&event(Key::Delete), &mut buffer),
            KeyResult::Ignored
        );

        // Backspace at the same position edits
        assert_eq!(
            dispatcher.dispatch(&event(Key::Backspace), &mut buffer),
            KeyResult::Edited
        );
    }

    #[test]
    fn test_escape_clears_and_always_repaints() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&event(Key::Escape), &mut buffer),
            KeyResult::Edited
        );

        buffer.insert_text("junk");
        assert_eq!(
            dispatcher.dispatch(&event(Key::Escape), &mut buffer),
            KeyResult::Edited
        );
        assert_eq!(buffer.current_line(), "");
    }

    #[test]
    fn test_history_keys_pass_through() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&event(Key::PageUp), &mut buffer),
            KeyResult::HistoryPrevious
        );
        assert_eq!(
            dispatcher.dispatch(&event(Key::PageDown), &mut buffer),
            KeyResult::HistoryNext
        );
    }

    #[test]
    fn test_stray_reports_are_absorbed() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();

        assert_eq!(
            dispatcher.dispatch(&event(Key::CPRResponse), &mut buffer),
            KeyResult::Ignored
        );
        assert_eq!(
            dispatcher.dispatch(&event(Key::F5), &mut buffer),
            KeyResult::Ignored
        );
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_rebinding_overrides_default() {
        let mut dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();
        buffer.insert_text("word");

        dispatcher.bind(Key::ControlW, EditAction::DeleteWordLeft);
        assert_eq!(
            dispatcher.dispatch(&event(Key::ControlW), &mut buffer),
            KeyResult::Edited
        );
        assert_eq!(buffer.current_line(), "");
    }

    #[test]
    fn test_unbind() {
        let mut dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();
        buffer.insert_text("x");

        assert!(dispatcher.unbind(Key::Backspace));
        assert!(!dispatcher.unbind(Key::Backspace));
        assert_eq!(
            dispatcher.dispatch(&event(Key::Backspace), &mut buffer),
            KeyResult::Ignored
        );
        assert_eq!(buffer.current_line(), "x");
    }

    #[test]
    fn test_word_navigation_bindings() {
        let dispatcher = KeyDispatcher::new();
        let mut buffer = SubmissionBuffer::new();
        buffer.insert_text("one two");
        buffer.move_home();

        assert_eq!(
            dispatcher.dispatch(&event(Key::ControlRight), &mut buffer),
            KeyResult::Moved
        );
        assert_eq!(buffer.column(), 3);

        // Unguarded: at the end it still reports a move
        buffer.move_end();
        assert_eq!(
            dispatcher.dispatch(&event(Key::ControlRight), &mut buffer),
            KeyResult::Moved
        );

        assert_eq!(
            dispatcher.dispatch(&event(Key::ControlLeft), &mut buffer),
            KeyResult::Moved
        );
        assert_eq!(buffer.column(), 4);
    }
}
