//! Bounded undo/redo history over whole-text snapshots.
//!
//! Unlike an operation log, each entry is the full document text plus the
//! selection to restore. Applying a returned snapshot is the caller's job.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::types::Selection;

/// One recorded (text, selection) state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub text: String,
    /// Character offset
    pub selection_start: usize,
    /// Character offset
    pub selection_end: usize,
}

impl Snapshot {
    pub fn new(text: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        Self {
            text: text.into(),
            selection_start,
            selection_end,
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.selection_start, self.selection_end)
    }
}

/// Undo/redo stacks of snapshots.
///
/// `past` always holds at least the seed snapshot, and two consecutive `past`
/// entries never share the same text.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    /// Oldest first; the back is the current state.
    past: VecDeque<Snapshot>,
    /// Front is the next state to redo.
    future: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new("")
    }
}

impl HistoryStore {
    /// Seed the history with `(text, 0, 0)` and the default capacity.
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// Seed the history with a custom capacity (clamped to at least 1).
    pub fn with_capacity(initial: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut past = VecDeque::with_capacity(capacity.min(64));
        past.push_back(Snapshot::new(initial, 0, 0));
        Self {
            past,
            future: VecDeque::new(),
            capacity,
        }
    }

    /// Record a new snapshot.
    ///
    /// Returns false (and changes nothing) if `text` matches the current state.
    pub fn push(&mut self, text: &str, selection_start: usize, selection_end: usize) -> bool {
        if self.past.back().is_some_and(|last| last.text == text) {
            tracing::trace!("history push deduplicated");
            return false;
        }

        self.past
            .push_back(Snapshot::new(text, selection_start, selection_end));
        while self.past.len() > self.capacity && self.past.len() > 1 {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Step back one snapshot, returning the state to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.past.len() <= 1 {
            return None;
        }
        let current = self.past.pop_back()?;
        self.future.push_front(current);
        self.past.back().cloned()
    }

    /// Step forward one snapshot, returning the state to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push_back(next.clone());
        Some(next)
    }

    /// Start over from a freshly loaded document.
    pub fn reset(&mut self, text: impl Into<String>) {
        self.past.clear();
        self.past.push_back(Snapshot::new(text, 0, 0));
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The newest recorded state.
    pub fn current(&self) -> &Snapshot {
        // `past` is seeded on construction and never drained below one entry.
        &self.past[self.past.len() - 1]
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate `past` oldest to newest.
    pub fn past(&self) -> impl Iterator<Item = &Snapshot> {
        self.past.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_history_cannot_undo() {
        let mut history = HistoryStore::new("hello");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), &Snapshot::new("hello", 0, 0));
    }

    #[test]
    fn test_push_undo_redo() {
        let mut history = HistoryStore::new("a");
        assert!(history.push("ab", 2, 2));
        assert!(history.push("abc", 3, 3));

        assert_eq!(history.undo(), Some(Snapshot::new("ab", 2, 2)));
        assert_eq!(history.undo(), Some(Snapshot::new("a", 0, 0)));
        assert_eq!(history.undo(), None);
        assert!(history.can_redo());

        assert_eq!(history.redo(), Some(Snapshot::new("ab", 2, 2)));
        assert_eq!(history.redo(), Some(Snapshot::new("abc", 3, 3)));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_duplicate_push_is_dropped() {
        let mut history = HistoryStore::new("a");
        assert!(history.push("ab", 1, 1));
        assert!(!history.push("ab", 2, 2));
        assert_eq!(history.past_len(), 2);
        // The first selection wins; the duplicate is not recorded at all.
        assert_eq!(history.current().selection_start, 1);
    }

    #[test]
    fn test_push_after_undo_truncates_future() {
        let mut history = HistoryStore::new("a");
        history.push("ab", 2, 2);
        history.push("abc", 3, 3);
        history.undo();
        assert!(history.can_redo());

        history.push("abx", 3, 3);
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.current().text, "abx");
    }

    #[test]
    fn test_push_matching_undone_state_is_deduplicated() {
        let mut history = HistoryStore::new("a");
        history.push("ab", 2, 2);
        history.undo();
        // Current is "a" again, so pushing "a" is a no-op and redo survives.
        assert!(!history.push("a", 1, 1));
        assert!(history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStore::with_capacity("0", 3);
        history.push("1", 0, 0);
        history.push("2", 0, 0);
        history.push("3", 0, 0);

        let texts: Vec<_> = history.past().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_capacity_one_keeps_single_entry() {
        let mut history = HistoryStore::with_capacity("seed", 1);
        history.push("next", 4, 4);
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.current().text, "next");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = HistoryStore::new("a");
        history.push("ab", 2, 2);
        history.push("abc", 3, 3);
        history.undo();

        history.reset("fresh");
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.future_len(), 0);
        assert_eq!(history.current(), &Snapshot::new("fresh", 0, 0));
    }
}
