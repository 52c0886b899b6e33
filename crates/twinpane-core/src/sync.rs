//! Scroll synchronization between the source pane, the preview and the outline.
//!
//! The coordinator owns which outline entry is "active" (highlighted). Three
//! kinds of input move it:
//!
//! - source pane scrolls: the section containing the top visible line,
//! - preview visibility reports: the topmost heading in view,
//! - outline clicks: the clicked entry, followed by a smooth scroll of every
//!   shown pane to it.
//!
//! A click takes a lock on its entry. While locked, scroll and visibility
//! input is ignored so the animation passing over intermediate headings
//! cannot overwrite the highlight, and the split-view mirror cannot pull the
//! preview off its anchor. The lock is released once every pane that started
//! an animation reports scroll end, or when the lock deadline passes.

use smol_str::SmolStr;
use web_time::Instant;

use crate::config::SyncConfig;
use crate::outline::Outline;
use crate::platform::Panes;
use crate::position::{
    fraction_to_scroll_top, line_to_scroll_offset, scroll_fraction, scroll_top_to_top_line,
};
use crate::timer::{TimerKind, TimerRequest, TimerSlot, TimerToken};
use crate::types::{PaneId, PaneMetrics, ScrollCommand, ViewMode};

/// Smooth scrolls closer than this to the current offset will not animate,
/// so no scroll end is expected from them.
const SETTLED_EPSILON: f64 = 1.0;

/// A heading anchor currently intersecting the preview viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleAnchor {
    pub id: SmolStr,
    /// Viewport-relative top of the heading element (px).
    pub top: f64,
}

impl VisibleAnchor {
    pub fn new(id: impl Into<SmolStr>, top: f64) -> Self {
        Self { id: id.into(), top }
    }
}

/// Observable synchronization state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    pub active_entry_id: Option<SmolStr>,
    pub locked_entry_id: Option<SmolStr>,
    pub lock_deadline: Option<Instant>,
}

impl SyncState {
    pub fn is_locked(&self) -> bool {
        self.locked_entry_id.is_some()
    }
}

/// Result of feeding one event to the coordinator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncOutput {
    /// The outline highlight must be re-rendered.
    pub active_changed: bool,
    /// Commands that reached a mounted pane.
    pub commands: Vec<ScrollCommand>,
    /// Timer the host must schedule.
    pub timer: Option<TimerRequest>,
    pub lock_released: bool,
}

#[derive(Debug, Clone)]
struct Lock {
    entry_id: SmolStr,
    /// Panes still animating toward the entry. Empty waits for the deadline.
    awaiting: Vec<PaneId>,
}

#[derive(Debug)]
pub struct SyncCoordinator {
    line_height: f64,
    top_padding: f64,
    anchor_margin: f64,
    mirror_preview: bool,
    lock_timeout: std::time::Duration,
    view_mode: ViewMode,
    active: Option<SmolStr>,
    lock: Option<Lock>,
    lock_timer: TimerSlot,
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl SyncCoordinator {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            line_height: config.source_line_height,
            top_padding: config.source_top_padding,
            anchor_margin: config.preview_anchor_margin,
            mirror_preview: config.mirror_preview,
            lock_timeout: config.lock_timeout(),
            view_mode: ViewMode::default(),
            active: None,
            lock: None,
            lock_timer: TimerSlot::new(),
        }
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn state(&self) -> SyncState {
        SyncState {
            active_entry_id: self.active.clone(),
            locked_entry_id: self.lock.as_ref().map(|l| l.entry_id.clone()),
            lock_deadline: self.lock.as_ref().and(self.lock_timer.deadline()),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Replace the source line geometry with values measured from the
    /// rendered pane. Non-positive line heights are rejected.
    pub fn set_source_geometry(&mut self, line_height: f64, top_padding: f64) -> bool {
        if line_height.is_nan() || line_height <= 0.0 {
            tracing::warn!(line_height, "ignoring measured source line height");
            return false;
        }
        self.line_height = line_height;
        self.top_padding = top_padding.max(0.0);
        true
    }

    /// Change which panes are shown. A lock stops waiting on panes that just
    /// got hidden; if none are left it falls back to its deadline.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        if let Some(lock) = self.lock.as_mut() {
            lock.awaiting.retain(|pane| mode.shows(*pane));
        }
    }

    /// Source pane scrolled by the user.
    pub fn on_source_scroll(
        &mut self,
        metrics: PaneMetrics,
        outline: &Outline,
        panes: &mut Panes,
        now: Instant,
    ) -> SyncOutput {
        let mut out = self.release_if_due(now);
        if let Some(lock) = &self.lock {
            tracing::trace!(locked = %lock.entry_id, "source scroll ignored while locked");
            return out;
        }

        let top_line = scroll_top_to_top_line(metrics.scroll_top, self.line_height, self.top_padding);
        if let Some(entry) = outline.entry_at_line(top_line) {
            out.active_changed = self.set_active(Some(entry.id.clone()));
        }

        if self.mirror_preview && self.view_mode == ViewMode::Split {
            let target = scroll_fraction(&metrics).and_then(|fraction| {
                let preview = panes.get(PaneId::Preview)?.metrics();
                Some(fraction_to_scroll_top(
                    fraction,
                    preview.scroll_height,
                    preview.client_height,
                ))
            });
            if let Some(offset) = target {
                let command = ScrollCommand {
                    pane: PaneId::Preview,
                    offset,
                    smooth: false,
                };
                dispatch(panes, command, &mut out);
            }
        }

        out
    }

    /// The preview reported which heading anchors intersect its viewport.
    pub fn on_preview_visibility(
        &mut self,
        visible: &[VisibleAnchor],
        outline: &Outline,
        now: Instant,
    ) -> SyncOutput {
        let mut out = self.release_if_due(now);
        if let Some(lock) = &self.lock {
            tracing::trace!(locked = %lock.entry_id, "visibility report ignored while locked");
            return out;
        }

        let topmost = visible
            .iter()
            .filter_map(|anchor| outline.position(&anchor.id).map(|pos| (anchor, pos)))
            .min_by(|(a, a_pos), (b, b_pos)| a.top.total_cmp(&b.top).then(a_pos.cmp(b_pos)));

        if let Some((anchor, _)) = topmost {
            out.active_changed = self.set_active(Some(anchor.id.clone()));
        }
        out
    }

    /// Outline entry clicked: highlight it, lock, and scroll every shown pane to it.
    ///
    /// Unknown ids (outline went stale under a concurrent edit) are ignored.
    pub fn select(
        &mut self,
        entry_id: &str,
        outline: &Outline,
        panes: &mut Panes,
        now: Instant,
    ) -> SyncOutput {
        let mut out = SyncOutput::default();
        let Some(entry) = outline.get(entry_id) else {
            tracing::debug!(entry_id, "select ignored, entry not in outline");
            return out;
        };

        out.active_changed = self.set_active(Some(entry.id.clone()));

        // Re-arming invalidates the timer of any earlier click.
        let token = self.lock_timer.arm(now, self.lock_timeout);
        out.timer = Some(TimerRequest {
            kind: TimerKind::LockRelease,
            token,
            delay: self.lock_timeout,
        });

        let mut awaiting = Vec::new();

        if self.view_mode.shows(PaneId::Preview) {
            let target = panes.get(PaneId::Preview).and_then(|pane| {
                let top = pane.anchor_offset(&entry.id)?;
                Some((pane.metrics(), (top - self.anchor_margin).max(0.0)))
            });
            match target {
                Some((metrics, offset)) => {
                    let command = ScrollCommand {
                        pane: PaneId::Preview,
                        offset,
                        smooth: true,
                    };
                    if dispatch(panes, command, &mut out) && will_animate(&metrics, offset) {
                        awaiting.push(PaneId::Preview);
                    }
                }
                None => tracing::debug!(entry_id, "preview anchor not found, skipping"),
            }
        }

        if self.view_mode.shows(PaneId::Source) {
            let metrics = panes.get(PaneId::Source).map(|pane| pane.metrics());
            if let Some(metrics) = metrics {
                let offset =
                    line_to_scroll_offset(entry.line_number, self.line_height, self.top_padding);
                let command = ScrollCommand {
                    pane: PaneId::Source,
                    offset,
                    smooth: true,
                };
                if dispatch(panes, command, &mut out) && will_animate(&metrics, offset) {
                    awaiting.push(PaneId::Source);
                }
            }
        }

        tracing::debug!(
            entry_id,
            awaiting = ?awaiting,
            commands = out.commands.len(),
            "outline select, locked"
        );
        self.lock = Some(Lock {
            entry_id: entry.id.clone(),
            awaiting,
        });
        out
    }

    /// A pane's scroll animation settled. The lock is released when the last
    /// animating pane settles.
    pub fn on_scroll_end(&mut self, pane: PaneId, now: Instant) -> SyncOutput {
        let mut out = self.release_if_due(now);
        let Some(lock) = self.lock.as_mut() else {
            return out;
        };
        let Some(idx) = lock.awaiting.iter().position(|p| *p == pane) else {
            return out;
        };
        lock.awaiting.swap_remove(idx);
        if lock.awaiting.is_empty() {
            self.release("scroll end");
            out.lock_released = true;
        } else {
            tracing::trace!(%pane, remaining = ?lock.awaiting, "pane settled, lock held");
        }
        out
    }

    /// Host callback for a [`TimerKind::LockRelease`] request.
    pub fn on_lock_timer(&mut self, token: TimerToken) -> SyncOutput {
        let mut out = SyncOutput::default();
        if self.lock_timer.fire(token) && self.lock.is_some() {
            self.release("deadline");
            out.lock_released = true;
        } else {
            tracing::trace!(token = token.raw(), "stale lock timer ignored");
        }
        out
    }

    /// Release the lock if its deadline has passed, whether or not the host
    /// timer has run yet.
    pub fn release_if_due(&mut self, now: Instant) -> SyncOutput {
        let mut out = SyncOutput::default();
        if self.lock.is_some() && self.lock_timer.fire_due(now).is_some() {
            self.release("deadline passed");
            out.lock_released = true;
        }
        out
    }

    /// The outline was recomputed. Drop references to entries that vanished.
    pub fn on_outline_changed(&mut self, outline: &Outline) -> SyncOutput {
        let mut out = SyncOutput::default();

        let lock_stale = self
            .lock
            .as_ref()
            .is_some_and(|lock| !outline.contains(&lock.entry_id));
        if lock_stale {
            self.release("locked entry removed");
            out.lock_released = true;
        }

        let active_stale = self
            .active
            .as_deref()
            .is_some_and(|id| !outline.contains(id));
        if active_stale {
            out.active_changed = self.set_active(None);
        }
        out
    }

    fn set_active(&mut self, id: Option<SmolStr>) -> bool {
        if self.active == id {
            return false;
        }
        tracing::debug!(from = ?self.active, to = ?id, "active outline entry changed");
        self.active = id;
        true
    }

    fn release(&mut self, reason: &'static str) {
        if let Some(lock) = self.lock.take() {
            tracing::debug!(entry_id = %lock.entry_id, reason, "sync lock released");
        }
        self.lock_timer.cancel();
    }
}

fn will_animate(metrics: &PaneMetrics, offset: f64) -> bool {
    let reachable = offset.min(metrics.scroll_range());
    (metrics.scroll_top - reachable).abs() >= SETTLED_EPSILON
}

/// Dispatch to a pane, absorbing failures. True if the pane accepted it.
fn dispatch(panes: &mut Panes, command: ScrollCommand, out: &mut SyncOutput) -> bool {
    match panes.dispatch(&command) {
        Ok(true) => {
            out.commands.push(command);
            true
        }
        Ok(false) => false,
        Err(e) => {
            tracing::warn!(error = %e, pane = %command.pane, "scroll command failed");
            false
        }
    }
}
