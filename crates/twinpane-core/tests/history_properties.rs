// History and outline properties exercised through the public API.

use std::time::Duration;

use twinpane_core::{
    DEFAULT_HISTORY_CAPACITY, EditorSession, FormatAction, HistoryStore, Instant, Selection,
    Snapshot, extract,
};

#[test]
fn history_is_bounded_and_evicts_oldest() {
    let mut history = HistoryStore::new("seed");
    let pushed: Vec<String> = (0..=DEFAULT_HISTORY_CAPACITY).map(|i| format!("v{i}")).collect();
    for text in &pushed {
        assert!(history.push(text, 0, 0));
    }

    assert_eq!(history.past_len(), DEFAULT_HISTORY_CAPACITY);
    // 202 states recorded in total: the seed and "v0" were evicted.
    let oldest = history.past().next().expect("never empty");
    assert_eq!(oldest.text, pushed[1]);
    assert_eq!(history.current().text, pushed[DEFAULT_HISTORY_CAPACITY]);
}

#[test]
fn consecutive_past_entries_never_repeat() {
    let mut history = HistoryStore::new("a");
    for text in ["a", "b", "b", "c", "c", "c", "b"] {
        history.push(text, 0, 0);
    }
    let texts: Vec<_> = history.past().map(|s| s.text.clone()).collect();
    assert_eq!(texts, vec!["a", "b", "c", "b"]);
    for pair in texts.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn undo_then_redo_restores_state() {
    let mut history = HistoryStore::new("");
    history.push("one", 3, 3);
    history.push("one two", 7, 7);
    let before = history.current().clone();

    let undone = history.undo().expect("can undo");
    assert_eq!(undone, Snapshot::new("one", 3, 3));
    let redone = history.redo().expect("can redo");
    assert_eq!(redone, before);
    assert_eq!(history.current(), &before);
}

#[test]
fn push_after_undo_discards_redo() {
    let mut history = HistoryStore::new("");
    history.push("x", 1, 1);
    history.push("xy", 2, 2);
    history.undo();
    history.push("xz", 2, 2);
    assert!(!history.can_redo());
    assert_eq!(history.redo(), None);
}

#[test]
fn debounced_edits_and_toolbar_actions_stay_ordered() {
    let mut session = EditorSession::new("");
    let now = Instant::now();
    let ms = Duration::from_millis(1);

    session.on_edit("hello", Selection::collapsed(5), now);
    session.apply_format(FormatAction::Italic, Selection::new(0, 5));
    let late = session.on_edit("*hello* world", Selection::collapsed(13), now + 50 * ms);
    session.apply_format(FormatAction::LineBreak, Selection::collapsed(13));

    // The debounce armed before the last toolbar action is now stale.
    assert!(!session.on_timer(late.kind, late.token, now + 550 * ms));

    let texts: Vec<_> = session.history().past().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["", "hello", "*hello*", "*hello* world", "*hello* world  \n"]
    );

    for expected in ["*hello* world", "*hello*", "hello", ""] {
        let snapshot = session.undo().expect("history left");
        assert_eq!(snapshot.text, expected);
        assert_eq!(session.text(), expected);
    }
    assert_eq!(session.undo(), None);
}

#[test]
fn outline_ignores_headings_inside_fences() {
    let text = "# Intro\n```md\n# fake\n## fake too\n```\n## Real\n```\n### also fake";
    let labels: Vec<_> = extract(text).into_iter().map(|e| e.text.to_string()).collect();
    assert_eq!(labels, vec!["Intro", "Real"]);
}
