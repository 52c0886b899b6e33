//! The editing session: one document, its history, its outline and the
//! scroll coordinator, fed by the host's event stream.
//!
//! Typing is committed to history after a quiet period (debounce). Explicit
//! actions (formatting, undo, redo) flush any pending commit first so
//! snapshots always land in the order the user produced them. The outline is
//! recomputed on every text change, independently of history.

use web_time::Instant;

use crate::config::SyncConfig;
use crate::error::ConfigError;
use crate::format::FormatAction;
use crate::history::{HistoryStore, Snapshot};
use crate::outline::Outline;
use crate::platform::{PaneController, Panes};
use crate::sync::{SyncCoordinator, SyncOutput, SyncState, VisibleAnchor};
use crate::timer::{TimerKind, TimerRequest, TimerSlot, TimerToken};
use crate::types::{PaneId, PaneMetrics, Selection, ViewMode};

pub struct EditorSession {
    config: SyncConfig,
    text: String,
    selection: Selection,
    history: HistoryStore,
    outline: Outline,
    sync: SyncCoordinator,
    panes: Panes,
    /// Latest edit not yet committed to history.
    pending: Option<Snapshot>,
    commit_timer: TimerSlot,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("text_len", &self.text.len())
            .field("selection", &self.selection)
            .field("history_len", &self.history.past_len())
            .field("outline_len", &self.outline.len())
            .field("sync", &self.sync.state())
            .field("pending", &self.pending.is_some())
            .field("panes", &self.panes)
            .finish()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditorSession {
    pub fn new(initial: impl Into<String>) -> Self {
        Self::build(initial.into(), SyncConfig::default())
    }

    pub fn with_config(initial: impl Into<String>, config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(initial.into(), config))
    }

    fn build(text: String, config: SyncConfig) -> Self {
        let history = HistoryStore::with_capacity(text.as_str(), config.history_capacity);
        let outline = Outline::from_text(&text);
        let sync = SyncCoordinator::new(&config);
        Self {
            config,
            text,
            selection: Selection::default(),
            history,
            outline,
            sync,
            panes: Panes::new(),
            pending: None,
            commit_timer: TimerSlot::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_some() || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.history.can_redo()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending.is_some()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        self.sync.active_entry_id()
    }

    pub fn mount_pane(&mut self, id: PaneId, pane: Box<dyn PaneController>) {
        tracing::debug!(pane = %id, "pane mounted");
        self.panes.mount(id, pane);
    }

    pub fn unmount_pane(&mut self, id: PaneId) {
        if self.panes.unmount(id).is_some() {
            tracing::debug!(pane = %id, "pane unmounted");
        }
    }

    pub fn panes(&self) -> &Panes {
        &self.panes
    }

    /// Replace the document, e.g. after opening a file. History starts over.
    pub fn load(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(len = text.len(), "document loaded");
        self.pending = None;
        self.commit_timer.cancel();
        self.history.reset(text.as_str());
        self.selection = Selection::default();
        self.replace_text(text);
    }

    /// The user edited the text. Returns the debounce timer to (re)schedule.
    pub fn on_edit(
        &mut self,
        text: impl Into<String>,
        selection: Selection,
        now: Instant,
    ) -> TimerRequest {
        let text = text.into();
        self.selection = selection;
        self.pending = Some(Snapshot::new(
            text.as_str(),
            selection.start(),
            selection.end(),
        ));
        self.replace_text(text);

        let delay = self.config.commit_debounce();
        let token = self.commit_timer.arm(now, delay);
        TimerRequest {
            kind: TimerKind::HistoryCommit,
            token,
            delay,
        }
    }

    /// Caret moved without a text change.
    pub fn on_selection_change(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// A scheduled timer fired. Returns whether it was live.
    pub fn on_timer(&mut self, kind: TimerKind, token: TimerToken, now: Instant) -> bool {
        match kind {
            TimerKind::HistoryCommit => {
                if !self.commit_timer.fire(token) {
                    tracing::trace!(token = token.raw(), "stale commit timer ignored");
                    return false;
                }
                self.commit_pending();
                true
            }
            TimerKind::LockRelease => {
                let out = self.sync.on_lock_timer(token);
                // A throttled host may deliver late; honour the deadline anyway.
                out.lock_released || self.sync.release_if_due(now).lock_released
            }
        }
    }

    /// Fire every timer whose deadline has passed. For hosts that poll
    /// instead of scheduling callbacks.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        let committed = self.commit_timer.fire_due(now).is_some();
        if committed {
            self.commit_pending();
        }
        let released = self.sync.release_if_due(now).lock_released;
        committed || released
    }

    /// Commit the pending edit right away. Returns whether history changed.
    pub fn flush_pending(&mut self) -> bool {
        self.commit_timer.cancel();
        self.commit_pending()
    }

    fn commit_pending(&mut self) -> bool {
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        let recorded = self.history.push(
            &snapshot.text,
            snapshot.selection_start,
            snapshot.selection_end,
        );
        if recorded {
            tracing::debug!(past = self.history.past_len(), "history commit");
        }
        recorded
    }

    /// Apply a toolbar action to the current text and record it immediately.
    pub fn apply_format(&mut self, action: FormatAction, selection: Selection) -> Snapshot {
        self.flush_pending();

        let formatted = action.apply(&self.text, selection.start(), selection.end());
        let snapshot = Snapshot::from(formatted);
        tracing::debug!(action = action.label(), "format applied");

        self.history.push(
            &snapshot.text,
            snapshot.selection_start,
            snapshot.selection_end,
        );
        self.selection = snapshot.selection();
        self.replace_text(snapshot.text.clone());
        snapshot
    }

    /// Step back. The returned snapshot is what the host should display.
    pub fn undo(&mut self) -> Option<Snapshot> {
        self.flush_pending();
        let snapshot = self.history.undo()?;
        self.restore(&snapshot);
        Some(snapshot)
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        self.flush_pending();
        let snapshot = self.history.redo()?;
        self.restore(&snapshot);
        Some(snapshot)
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.selection = snapshot.selection();
        self.replace_text(snapshot.text.clone());
    }

    /// Swap in new text and recompute the outline.
    fn replace_text(&mut self, text: String) {
        self.text = text;
        let outline = Outline::from_text(&self.text);
        if outline != self.outline {
            self.outline = outline;
            self.sync.on_outline_changed(&self.outline);
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.sync.view_mode()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.sync.set_view_mode(mode);
    }

    /// See [`SyncCoordinator::set_source_geometry`].
    pub fn set_source_geometry(&mut self, line_height: f64, top_padding: f64) -> bool {
        self.sync.set_source_geometry(line_height, top_padding)
    }

    pub fn on_source_scroll(&mut self, metrics: PaneMetrics, now: Instant) -> SyncOutput {
        self.sync
            .on_source_scroll(metrics, &self.outline, &mut self.panes, now)
    }

    pub fn on_preview_visibility(&mut self, visible: &[VisibleAnchor], now: Instant) -> SyncOutput {
        self.sync.on_preview_visibility(visible, &self.outline, now)
    }

    pub fn select(&mut self, entry_id: &str, now: Instant) -> SyncOutput {
        self.sync
            .select(entry_id, &self.outline, &mut self.panes, now)
    }

    pub fn on_scroll_end(&mut self, pane: PaneId, now: Instant) -> SyncOutput {
        self.sync.on_scroll_end(pane, now)
    }
}
