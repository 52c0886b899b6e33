//! JsSyncSession - the editing session exposed to JavaScript.
//!
//! The shell owns the textarea, the rendered preview and the outline list.
//! It mounts their elements here, forwards edits, and re-renders whatever the
//! callbacks report. Scroll, scroll-end and visibility events are wired
//! directly to the DOM and never pass through JS.
//!
//! Every text offset on this surface is in UTF-16 code units, like the
//! textarea's own `selectionStart`. The core works in chars; conversion
//! happens here against the text the offsets refer to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use twinpane_core::{
    EditorSession, Instant, PaneId, Selection, SyncConfig, SyncOutput, TimerKind, TimerRequest,
    TimerToken,
};

use crate::logging;
use crate::pane::{DomPane, OUTLINE_ID_ATTR};
use crate::timers::BrowserTimers;
use crate::offsets::utf16_to_char;
use crate::types::{JsFormatAction, JsOutlineEntry, JsSnapshot, JsSyncStatus, parse_view_mode};
use crate::visibility::HeadingObserver;

/// Class toggled on the outline item of the active entry.
const ACTIVE_CLASS: &str = "active";

struct Inner {
    session: EditorSession,
    timers: BrowserTimers,
    outline_root: Option<HtmlElement>,
    on_active_change: Option<js_sys::Function>,
    on_history_change: Option<js_sys::Function>,
}

type Shared = Rc<RefCell<Inner>>;

/// What to tell the shell once the session borrow is released.
#[derive(Default)]
struct Notify {
    active: Option<(Option<js_sys::Function>, Option<String>, Option<HtmlElement>)>,
    history: Option<js_sys::Function>,
}

impl Notify {
    fn send(self) {
        if let Some((callback, active_id, outline_root)) = self.active {
            if let Some(root) = outline_root {
                mark_active(&root, active_id.as_deref());
            }
            if let Some(callback) = callback {
                let arg = active_id.as_deref().map_or(JsValue::NULL, JsValue::from_str);
                if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                    tracing::warn!(error = ?e, "onActiveChange callback threw");
                }
            }
        }
        if let Some(callback) = self.history {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                tracing::warn!(error = ?e, "onHistoryChange callback threw");
            }
        }
    }
}

/// Run a session operation, schedule any timer it asks for, and collect the
/// notifications to send after the borrow ends.
fn with_session<F>(shared: &Shared, op: F) -> Notify
where
    F: FnOnce(&mut EditorSession, Instant) -> SyncOutput,
{
    let Ok(mut inner) = shared.try_borrow_mut() else {
        tracing::warn!("session busy, event dropped");
        return Notify::default();
    };
    let out = op(&mut inner.session, Instant::now());
    if let Some(request) = out.timer {
        schedule(&mut inner.timers, Rc::downgrade(shared), request);
    }
    let mut notify = Notify::default();
    if out.active_changed {
        notify.active = Some(active_notification(&inner));
    }
    notify
}

fn active_notification(
    inner: &Inner,
) -> (Option<js_sys::Function>, Option<String>, Option<HtmlElement>) {
    (
        inner.on_active_change.clone(),
        inner.session.active_entry_id().map(str::to_owned),
        inner.outline_root.clone(),
    )
}

fn schedule(timers: &mut BrowserTimers, shared: Weak<RefCell<Inner>>, request: TimerRequest) {
    timers.schedule(request, move |kind, token| {
        if let Some(shared) = shared.upgrade() {
            fire_timer(&shared, kind, token);
        }
    });
}

fn fire_timer(shared: &Shared, kind: TimerKind, token: TimerToken) {
    let notify = {
        let Ok(mut inner) = shared.try_borrow_mut() else {
            tracing::warn!(?kind, "session busy, timer dropped");
            return;
        };
        let live = inner.session.on_timer(kind, token, Instant::now());
        Notify {
            history: (live && kind == TimerKind::HistoryCommit)
                .then(|| inner.on_history_change.clone())
                .flatten(),
            ..Default::default()
        }
    };
    notify.send();
}

/// Toggle the active class on outline items.
fn mark_active(root: &HtmlElement, active_id: Option<&str>) {
    let Ok(items) = root.query_selector_all(&format!("[{OUTLINE_ID_ATTR}]")) else {
        return;
    };
    for item in (0..items.length()).filter_map(|i| items.item(i)) {
        let Ok(item) = item.dyn_into::<web_sys::Element>() else {
            continue;
        };
        let is_active =
            active_id.is_some() && item.get_attribute(OUTLINE_ID_ATTR).as_deref() == active_id;
        let _ = item.class_list().toggle_with_force(ACTIVE_CLASS, is_active);
    }
}

/// A UTF-16 selection from the shell, as chars of `text`.
fn text_selection(text: &str, start: usize, end: usize) -> Selection {
    Selection::new(utf16_to_char(text, start), utf16_to_char(text, end))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// The editing session exposed to JavaScript.
#[wasm_bindgen]
pub struct JsSyncSession {
    shared: Shared,
    listeners: Vec<EventListener>,
    preview_root: Option<HtmlElement>,
    heading_observer: Option<HeadingObserver>,
}

#[wasm_bindgen]
impl JsSyncSession {
    /// Create a session for `initial` text. `config` is an optional plain
    /// object with camelCase `SyncConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(initial: &str, config: JsValue) -> Result<JsSyncSession, JsError> {
        let config: SyncConfig = if config.is_undefined() || config.is_null() {
            SyncConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        let session = EditorSession::with_config(initial, config)?;

        Ok(Self {
            shared: Rc::new(RefCell::new(Inner {
                session,
                timers: BrowserTimers::new(),
                outline_root: None,
                on_active_change: None,
                on_history_change: None,
            })),
            listeners: Vec::new(),
            preview_root: None,
            heading_observer: None,
        })
    }

    /// Mount the source textarea (or any scrollable text element).
    #[wasm_bindgen(js_name = mountSource)]
    pub fn mount_source(&mut self, element: HtmlElement) {
        let pane = DomPane::new(PaneId::Source, element);

        let shared = self.shared.clone();
        self.listeners.push(pane.on_scroll(move |metrics| {
            with_session(&shared, |s, now| s.on_source_scroll(metrics, now)).send();
        }));
        let scroll_end = self.scroll_end_listener(&pane);
        self.listeners.push(scroll_end);

        let mut inner = self.shared.borrow_mut();
        if let Some((line_height, padding)) = pane.text_geometry() {
            inner.session.set_source_geometry(line_height, padding);
        }
        inner.session.mount_pane(PaneId::Source, Box::new(pane));
    }

    /// Mount the rendered preview. Headings must carry `data-heading-id`.
    #[wasm_bindgen(js_name = mountPreview)]
    pub fn mount_preview(&mut self, element: HtmlElement) -> Result<(), JsError> {
        let pane = DomPane::new(PaneId::Preview, element.clone());
        let scroll_end = self.scroll_end_listener(&pane);
        self.listeners.push(scroll_end);

        let shared = self.shared.clone();
        let observer = HeadingObserver::new(&element, move |visible| {
            with_session(&shared, |s, now| s.on_preview_visibility(&visible, now)).send();
        })
        .map_err(|e| JsError::new(&format!("IntersectionObserver failed: {:?}", e)))?;

        self.heading_observer = Some(observer);
        self.preview_root = Some(element);
        self.shared
            .borrow_mut()
            .session
            .mount_pane(PaneId::Preview, Box::new(pane));
        Ok(())
    }

    /// Mount the outline list. Clicks on `data-outline-id` items select them,
    /// and the active item gets the `active` class.
    #[wasm_bindgen(js_name = mountOutline)]
    pub fn mount_outline(&mut self, element: HtmlElement) {
        let shared = self.shared.clone();
        self.listeners.push(EventListener::new(&element, "click", move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            else {
                return;
            };
            let Ok(Some(item)) = target.closest(&format!("[{OUTLINE_ID_ATTR}]")) else {
                return;
            };
            if let Some(id) = item.get_attribute(OUTLINE_ID_ATTR) {
                with_session(&shared, |s, now| s.select(&id, now)).send();
            }
        }));

        // Not a pane: the coordinator never scrolls the outline.
        let mut inner = self.shared.borrow_mut();
        mark_active(&element, inner.session.active_entry_id());
        inner.outline_root = Some(element);
    }

    /// Re-scan preview headings after the renderer replaced its content.
    #[wasm_bindgen(js_name = refreshPreview)]
    pub fn refresh_preview(&self) {
        if let (Some(observer), Some(root)) = (&self.heading_observer, &self.preview_root) {
            observer.observe_headings(root);
        }
    }

    /// Unmount every pane and drop all DOM listeners.
    pub fn unmount(&mut self) {
        self.listeners.clear();
        self.heading_observer = None;
        self.preview_root = None;
        let mut inner = self.shared.borrow_mut();
        inner.outline_root = None;
        for pane in [PaneId::Source, PaneId::Preview] {
            inner.session.unmount_pane(pane);
        }
    }

    /// Called with the active outline id (or null) whenever it changes.
    #[wasm_bindgen(js_name = setOnActiveChange)]
    pub fn set_on_active_change(&self, callback: Option<js_sys::Function>) {
        self.shared.borrow_mut().on_active_change = callback;
    }

    /// Called after a debounced edit lands in history.
    #[wasm_bindgen(js_name = setOnHistoryChange)]
    pub fn set_on_history_change(&self, callback: Option<js_sys::Function>) {
        self.shared.borrow_mut().on_history_change = callback;
    }

    /// Report an edit from the source pane, with the selection after it.
    pub fn edit(&self, text: String, selection_start: usize, selection_end: usize) {
        let shared = Rc::downgrade(&self.shared);
        let selection = text_selection(&text, selection_start, selection_end);
        self.with_text_change(|inner| {
            let request = inner.session.on_edit(text, selection, Instant::now());
            schedule(&mut inner.timers, shared, request);
        });
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, selection_start: usize, selection_end: usize) {
        let mut inner = self.shared.borrow_mut();
        let selection = text_selection(inner.session.text(), selection_start, selection_end);
        inner.session.on_selection_change(selection);
    }

    /// Apply a toolbar action. Returns the snapshot to display.
    #[wasm_bindgen(js_name = applyFormat)]
    pub fn apply_format(
        &self,
        action: JsFormatAction,
        selection_start: usize,
        selection_end: usize,
    ) -> JsSnapshot {
        self.with_text_change(|inner| {
            inner.timers.cancel(TimerKind::HistoryCommit);
            let selection = text_selection(inner.session.text(), selection_start, selection_end);
            inner.session.apply_format(action.into(), selection).into()
        })
    }

    /// Step back. Returns the snapshot to display, or undefined.
    pub fn undo(&self) -> Result<JsValue, JsError> {
        let snapshot = self.with_text_change(|inner| {
            inner.timers.cancel(TimerKind::HistoryCommit);
            inner.session.undo().map(JsSnapshot::from)
        });
        to_js(&snapshot)
    }

    pub fn redo(&self) -> Result<JsValue, JsError> {
        let snapshot = self.with_text_change(|inner| {
            inner.timers.cancel(TimerKind::HistoryCommit);
            inner.session.redo().map(JsSnapshot::from)
        });
        to_js(&snapshot)
    }

    /// Commit any pending edit now, e.g. before saving.
    pub fn flush(&self) -> bool {
        let mut inner = self.shared.borrow_mut();
        inner.timers.cancel(TimerKind::HistoryCommit);
        inner.session.flush_pending()
    }

    /// Replace the document and start a fresh history.
    pub fn load(&self, text: String) {
        self.with_text_change(|inner| {
            inner.timers.cancel(TimerKind::HistoryCommit);
            inner.session.load(text);
        });
    }

    pub fn text(&self) -> String {
        self.shared.borrow().session.text().to_string()
    }

    /// Outline entries in document order.
    pub fn outline(&self) -> Result<JsValue, JsError> {
        let inner = self.shared.borrow();
        let text = inner.session.text();
        let entries: Vec<JsOutlineEntry> = inner
            .session
            .outline()
            .iter()
            .map(|entry| JsOutlineEntry::new(entry, text))
            .collect();
        to_js(&entries)
    }

    #[wasm_bindgen(js_name = activeEntryId)]
    pub fn active_entry_id(&self) -> Option<String> {
        self.shared
            .borrow()
            .session
            .active_entry_id()
            .map(str::to_owned)
    }

    /// Jump every shown pane to an outline entry, as if it was clicked.
    pub fn select(&self, entry_id: &str) {
        with_session(&self.shared, |s, now| s.select(entry_id, now)).send();
    }

    /// `"split"`, `"editor"` or `"preview"`.
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&self, mode: &str) -> Result<(), JsError> {
        let mode = parse_view_mode(mode)
            .ok_or_else(|| JsError::new(&format!("Unknown view mode: {}", mode)))?;
        self.shared.borrow_mut().session.set_view_mode(mode);
        Ok(())
    }

    pub fn status(&self) -> JsSyncStatus {
        let inner = self.shared.borrow();
        let session = &inner.session;
        let state = session.sync_state();
        JsSyncStatus {
            active_entry_id: state.active_entry_id.map(|id| id.to_string()),
            locked_entry_id: state.locked_entry_id.map(|id| id.to_string()),
            can_undo: session.can_undo(),
            can_redo: session.can_redo(),
            pending_commit: session.has_pending_commit(),
            view_mode: session.view_mode(),
        }
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.shared.borrow().session.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.shared.borrow().session.can_redo()
    }

    /// Recent twinpane log lines for bug reports.
    #[wasm_bindgen(js_name = capturedLogs)]
    pub fn captured_logs() -> String {
        logging::captured_logs()
    }
}

impl JsSyncSession {
    /// Run an operation that may replace the text, then report an active
    /// entry that vanished with the old outline.
    fn with_text_change<T>(&self, op: impl FnOnce(&mut Inner) -> T) -> T {
        let (result, notify) = {
            let mut guard = self.shared.borrow_mut();
            let inner = &mut *guard;
            let before = inner.session.active_entry_id().map(str::to_owned);
            let result = op(&mut *inner);
            let changed = inner.session.active_entry_id() != before.as_deref();
            let notify = Notify {
                active: changed.then(|| active_notification(inner)),
                ..Default::default()
            };
            (result, notify)
        };
        notify.send();
        result
    }

    fn scroll_end_listener(&self, pane: &DomPane) -> EventListener {
        let shared = self.shared.clone();
        pane.on_scroll_end(move |id| {
            with_session(&shared, |s, now| s.on_scroll_end(id, now)).send();
        })
    }
}
