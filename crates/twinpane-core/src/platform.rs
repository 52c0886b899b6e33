//! Platform abstraction for scrollable panes.
//!
//! The coordinator never touches the DOM. It drives panes through
//! [`PaneController`], which the browser crate implements over real elements
//! and tests implement in memory. Scroll and scroll-end notifications flow the
//! other way: the host subscribes to its elements and forwards events to the
//! session.

use crate::error::PaneError;
use crate::types::{PaneId, PaneMetrics, ScrollCommand};

/// Scroll and measurement capability of one pane.
pub trait PaneController {
    /// Scroll the pane so its top edge sits at `offset` pixels.
    fn scroll_to(&mut self, offset: f64, smooth: bool) -> Result<(), PaneError>;

    /// Current scroll geometry.
    fn metrics(&self) -> PaneMetrics;

    /// Content-relative top of the element tagged with `anchor_id`.
    ///
    /// Panes without rendered anchors (the source textarea) return None.
    fn anchor_offset(&self, anchor_id: &str) -> Option<f64> {
        let _ = anchor_id;
        None
    }
}

/// The panes currently mounted. Any of them may be absent.
#[derive(Default)]
pub struct Panes {
    source: Option<Box<dyn PaneController>>,
    preview: Option<Box<dyn PaneController>>,
    outline: Option<Box<dyn PaneController>>,
}

impl std::fmt::Debug for Panes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panes")
            .field("source", &self.source.is_some())
            .field("preview", &self.preview.is_some())
            .field("outline", &self.outline.is_some())
            .finish()
    }
}

impl Panes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a pane, returning the one it replaces.
    pub fn mount(
        &mut self,
        id: PaneId,
        pane: Box<dyn PaneController>,
    ) -> Option<Box<dyn PaneController>> {
        self.slot_mut(id).replace(pane)
    }

    pub fn unmount(&mut self, id: PaneId) -> Option<Box<dyn PaneController>> {
        self.slot_mut(id).take()
    }

    pub fn is_mounted(&self, id: PaneId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: PaneId) -> Option<&dyn PaneController> {
        match id {
            PaneId::Source => self.source.as_deref(),
            PaneId::Preview => self.preview.as_deref(),
            PaneId::Outline => self.outline.as_deref(),
        }
    }

    pub fn get_mut(&mut self, id: PaneId) -> Option<&mut (dyn PaneController + 'static)> {
        self.slot_mut(id).as_deref_mut()
    }

    fn slot_mut(&mut self, id: PaneId) -> &mut Option<Box<dyn PaneController>> {
        match id {
            PaneId::Source => &mut self.source,
            PaneId::Preview => &mut self.preview,
            PaneId::Outline => &mut self.outline,
        }
    }

    /// Send a command to its pane. Unmounted panes are skipped silently.
    pub fn dispatch(&mut self, command: &ScrollCommand) -> Result<bool, PaneError> {
        let Some(pane) = self.get_mut(command.pane) else {
            tracing::debug!(pane = %command.pane, "scroll skipped, pane not mounted");
            return Ok(false);
        };
        pane.scroll_to(command.offset, command.smooth)?;
        Ok(true)
    }
}
