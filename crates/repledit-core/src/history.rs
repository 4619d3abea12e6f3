//! Submission history with cyclic recall.
//!
//! Every evaluated submission is appended, duplicates and meta commands
//! included. Recall wraps in both directions: stepping back past the oldest
//! entry lands on the newest, stepping forward past the newest lands on the
//! oldest. Appending parks the recall position one past the end, so the next
//! backward step returns the entry just added.

/// Ordered record of evaluated submissions.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    /// Recall position. `entries.len()` means "not currently recalling".
    index: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All recorded submissions, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submission and reset the recall position past the end.
    pub fn append(&mut self, submission: String) {
        self.entries.push(submission);
        self.index = self.entries.len();
    }

    /// Step backward, wrapping from the oldest entry to the newest.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.index == 0 {
            self.index = self.entries.len() - 1;
        } else {
            self.index -= 1;
        }
        Some(&self.entries[self.index])
    }

    /// Step forward, wrapping from the newest entry to the oldest.
    pub fn next(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.index += 1;
        if self.index > self.entries.len() - 1 {
            self.index = 0;
        }
        Some(&self.entries[self.index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> History {
        let mut history = History::new();
        history.append("first".to_string());
        history.append("second".to_string());
        history.append("third".to_string());
        history
    }

    #[test]
    fn test_empty_history_recalls_nothing() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.previous(), None);
        assert_eq!(history.next(), None);
    }

    #[test]
    fn test_previous_walks_newest_to_oldest() {
        let mut history = sample();

        assert_eq!(history.previous(), Some("third"));
        assert_eq!(history.previous(), Some("second"));
        assert_eq!(history.previous(), Some("first"));
    }

    #[test]
    fn test_previous_wraps_to_newest() {
        let mut history = sample();

        for _ in 0..3 {
            history.previous();
        }
        assert_eq!(history.previous(), Some("third"));
    }

    #[test]
    fn test_cycle_of_len_returns_to_start() {
        let mut history = sample();

        let first = history.previous().unwrap().to_string();
        history.previous();
        history.previous();
        assert_eq!(history.previous(), Some(first.as_str()));
    }

    #[test]
    fn test_next_wraps_to_oldest() {
        let mut history = sample();

        // Recall position starts past the end; stepping forward wraps around
        assert_eq!(history.next(), Some("first"));
        assert_eq!(history.next(), Some("second"));
        assert_eq!(history.next(), Some("third"));
        assert_eq!(history.next(), Some("first"));
    }

    #[test]
    fn test_previous_then_next_round_trip() {
        let mut history = sample();

        assert_eq!(history.previous(), Some("third"));
        assert_eq!(history.previous(), Some("second"));
        assert_eq!(history.next(), Some("third"));
    }

    #[test]
    fn test_append_resets_recall_position() {
        let mut history = sample();

        history.previous();
        history.previous();
        history.append("fourth".to_string());

        assert_eq!(history.previous(), Some("fourth"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut history = History::new();
        history.append("same".to_string());
        history.append("same".to_string());

        assert_eq!(history.len(), 2);
        assert_eq!(history.previous(), Some("same"));
        assert_eq!(history.previous(), Some("same"));
    }
}
