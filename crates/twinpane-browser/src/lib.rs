//! Browser DOM layer for twinpane.
//!
//! This crate binds the core synchronization engine to real elements. It
//! assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `pane`: `DomPane`, a `PaneController` over a scrollable element
//! - `visibility`: which preview headings are in view
//! - `timers`: `setTimeout` scheduling for the core's timer requests
//! - `logging`: console tracing and a ring buffer for bug reports
//! - `offsets`: UTF-16 / char offset conversion for the JS boundary
//! - `bindings`: `JsSyncSession`, the wasm-bindgen facade for a JS shell
//!
//! # Re-exports
//!
//! This crate re-exports `twinpane-core` for convenience, so consumers
//! only need to depend on `twinpane-browser`.

// Re-export core crate
pub use twinpane_core;
pub use twinpane_core::*;

pub mod bindings;
pub mod logging;
pub mod offsets;
pub mod pane;
pub mod timers;
pub mod types;
pub mod visibility;

pub use bindings::JsSyncSession;
pub use logging::{LogCaptureLayer, captured_logs, clear_captured_logs};
pub use pane::{DomPane, HEADING_ID_ATTR, OUTLINE_ID_ATTR, element_metrics};
pub use timers::BrowserTimers;
pub use types::{JsFormatAction, JsOutlineEntry, JsSnapshot, JsSyncStatus, parse_view_mode};
pub use visibility::{HeadingObserver, VisibleHeadings, visible_anchors};

use wasm_bindgen::prelude::*;

/// Install the panic hook and tracing output when the module loads.
#[wasm_bindgen(start)]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    logging::init(level);
}
