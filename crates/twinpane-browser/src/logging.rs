//! Tracing setup for the browser, with a ring buffer for bug reports.
//!
//! `init` installs console output (`tracing-wasm`) plus `LogCaptureLayer`,
//! which keeps the most recent twinpane events so a shell can attach them to a
//! report via `captured_logs`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Maximum number of log entries to keep.
const MAX_ENTRIES: usize = 200;

/// Module prefixes to capture in the ring buffer.
const CAPTURED_PREFIXES: &[&str] = &["twinpane_"];

/// Minimum level to buffer from our modules.
const BUFFER_MIN_LEVEL: Level = Level::DEBUG;

thread_local! {
    static LOG_BUFFER: RefCell<VecDeque<String>> = RefCell::new(VecDeque::with_capacity(MAX_ENTRIES));
}

/// Install the panic hook and a global subscriber. Safe to call repeatedly;
/// only the first subscriber sticks.
pub fn init(console_level: Level) {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );
        let registry = Registry::default().with(wasm_layer).with(LogCaptureLayer);
        let _ = set_global_default(registry);
    }

    #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
    let _ = console_level;
}

/// A tracing Layer that captures log messages to a ring buffer.
pub struct LogCaptureLayer;

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = metadata.level();
        let target = metadata.target();

        if *level > BUFFER_MIN_LEVEL
            || !CAPTURED_PREFIXES.iter().any(|prefix| target.starts_with(prefix))
        {
            return;
        }

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        push_entry(format!("[{level}] {target}: {message}"));
    }
}

fn push_entry(entry: String) {
    LOG_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        if buf.len() >= MAX_ENTRIES {
            buf.pop_front();
        }
        buf.push_back(entry);
    });
}

/// Collects the message and any structured fields of an event.
struct MessageVisitor<'a>(&'a mut String);

impl MessageVisitor<'_> {
    fn separator(&mut self) {
        if !self.0.is_empty() {
            self.0.push_str(", ");
        }
    }
}

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{value:?}");
        } else {
            self.separator();
            let _ = write!(self.0, "{}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        } else {
            self.separator();
            let _ = write!(self.0, "{}={}", field.name(), value);
        }
    }
}

/// All captured entries, oldest first, one per line.
pub fn captured_logs() -> String {
    LOG_BUFFER.with(|buf| buf.borrow().iter().cloned().collect::<Vec<_>>().join("\n"))
}

pub fn clear_captured_logs() {
    LOG_BUFFER.with(|buf| buf.borrow_mut().clear());
}
