//! Core types shared across the synchronization engine: selections, pane
//! identity and geometry, and the scroll commands emitted to panes.
//!
//! These types are framework-agnostic. Offsets into text are always character
//! offsets, never byte offsets.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Clamp both ends to a document of `len` chars.
    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// One of the independently scrollable views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaneId {
    /// The raw-text editing surface.
    Source,
    /// The rendered document.
    Preview,
    /// The outline (table of contents) panel.
    Outline,
}

impl PaneId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaneId::Source => "source",
            PaneId::Preview => "preview",
            PaneId::Outline => "outline",
        }
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scroll geometry of a pane, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl PaneMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Maximum reachable scroll offset (never negative).
    pub fn scroll_range(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// A programmatic scroll issued to a pane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollCommand {
    pub pane: PaneId,
    pub offset: f64,
    /// Animate the scroll (`behavior: 'smooth'`) rather than jump.
    pub smooth: bool,
}

/// Which editing panes the shell currently shows.
///
/// Panes hidden by the view mode are never scrolled and never release a lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// Source and preview side by side.
    #[default]
    Split,
    /// Source only.
    Editor,
    /// Preview only.
    Preview,
}

impl ViewMode {
    /// Whether the given pane is visible in this mode. The outline panel is
    /// independent of the view mode.
    pub fn shows(&self, pane: PaneId) -> bool {
        match (self, pane) {
            (_, PaneId::Outline) => true,
            (ViewMode::Split, _) => true,
            (ViewMode::Editor, PaneId::Source) => true,
            (ViewMode::Preview, PaneId::Preview) => true,
            _ => false,
        }
    }
}
