//! twinpane-core: editing-state synchronization for a source/preview editor,
//! without framework dependencies.
//!
//! This crate provides:
//! - `HistoryStore` - bounded undo/redo over whole-text snapshots
//! - `Outline` - heading extraction with stable anchor ids
//! - `SyncCoordinator` - scroll sync across source, preview and outline panes,
//!   with a lock that holds the highlight steady during animated jumps
//! - `EditorSession` - the facade a host feeds edits, scrolls and timers into
//! - `PaneController` - the seam a platform implements for each pane

pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod outline;
pub mod platform;
pub mod position;
pub mod session;
pub mod sync;
pub mod timer;
pub mod types;

pub use config::{
    DEFAULT_COMMIT_DEBOUNCE_MS, DEFAULT_HISTORY_CAPACITY, DEFAULT_LOCK_TIMEOUT_MS, SyncConfig,
};
pub use error::{ConfigError, PaneError};
pub use format::{FormatAction, Formatted};
pub use history::{HistoryStore, Snapshot};
pub use outline::{Outline, OutlineEntry, extract, slugify};
pub use platform::{PaneController, Panes};
pub use position::{
    fraction_to_scroll_top, line_to_scroll_offset, scroll_fraction, scroll_top_to_top_line,
};
pub use session::EditorSession;
pub use smol_str::SmolStr;
pub use sync::{SyncCoordinator, SyncOutput, SyncState, VisibleAnchor};
pub use timer::{TimerKind, TimerRequest, TimerSlot, TimerToken};
pub use types::{PaneId, PaneMetrics, ScrollCommand, Selection, ViewMode};
pub use web_time::Instant;
