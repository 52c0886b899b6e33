//! Which preview headings are in view.
//!
//! `HeadingObserver` watches every `data-heading-id` element of the preview
//! with an `IntersectionObserver` and reports the full visible set after each
//! change. The observer only delivers entries that changed, so the set is
//! accumulated here rather than rebuilt from each batch.
//!
//! `visible_anchors` does the same measurement synchronously for hosts that
//! would rather sample on scroll.

use std::cell::RefCell;
use std::rc::Rc;

use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use twinpane_core::VisibleAnchor;

use crate::pane::HEADING_ID_ATTR;

/// Observation band: ignore the top 10% and the bottom 60% of the preview.
const ROOT_MARGIN: &str = "-10% 0px -60% 0px";
const THRESHOLD: f64 = 0.2;

/// Headings currently intersecting, keyed by anchor id.
#[derive(Debug, Clone, Default)]
pub struct VisibleHeadings {
    entries: Vec<(SmolStr, f64)>,
}

impl VisibleHeadings {
    pub fn update(&mut self, id: &str, intersecting: bool, top: f64) {
        let existing = self.entries.iter().position(|(e, _)| e == id);
        match (existing, intersecting) {
            (Some(i), true) => self.entries[i].1 = top,
            (Some(i), false) => {
                self.entries.remove(i);
            }
            (None, true) => self.entries.push((SmolStr::new(id), top)),
            (None, false) => {}
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn anchors(&self) -> Vec<VisibleAnchor> {
        self.entries
            .iter()
            .map(|(id, top)| VisibleAnchor::new(id.clone(), *top))
            .collect()
    }
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Keeps an `IntersectionObserver` on the preview's headings. Disconnects on drop.
pub struct HeadingObserver {
    observer: IntersectionObserver,
    visible: Rc<RefCell<VisibleHeadings>>,
    _callback: ObserverCallback,
}

impl HeadingObserver {
    pub fn new<F>(root: &HtmlElement, mut on_change: F) -> Result<Self, JsValue>
    where
        F: FnMut(Vec<VisibleAnchor>) + 'static,
    {
        let visible = Rc::new(RefCell::new(VisibleHeadings::default()));

        let state = visible.clone();
        let callback: ObserverCallback = Closure::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let anchors = {
                    let mut state = state.borrow_mut();
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        let Some(id) = entry.target().get_attribute(HEADING_ID_ATTR) else {
                            continue;
                        };
                        state.update(
                            &id,
                            entry.is_intersecting(),
                            entry.bounding_client_rect().top(),
                        );
                    }
                    state.anchors()
                };
                on_change(anchors);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root(Some(root.as_ref()));
        init.set_root_margin(ROOT_MARGIN);
        init.set_threshold(&JsValue::from_f64(THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;

        let this = Self {
            observer,
            visible,
            _callback: callback,
        };
        this.observe_headings(root);
        Ok(this)
    }

    /// Re-scan for headings, e.g. after the preview re-rendered.
    pub fn observe_headings(&self, root: &HtmlElement) {
        self.observer.disconnect();
        self.visible.borrow_mut().clear();

        let Ok(nodes) = root.query_selector_all(&format!("[{HEADING_ID_ATTR}]")) else {
            return;
        };
        let mut count = 0;
        for node in (0..nodes.length()).filter_map(|i| nodes.item(i)) {
            if let Ok(element) = node.dyn_into::<web_sys::Element>() {
                self.observer.observe(&element);
                count += 1;
            }
        }
        tracing::debug!(count, "observing preview headings");
    }
}

impl Drop for HeadingObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Headings whose box overlaps `root`'s viewport, with tops relative to it.
pub fn visible_anchors(root: &HtmlElement) -> Vec<VisibleAnchor> {
    let Ok(nodes) = root.query_selector_all(&format!("[{HEADING_ID_ATTR}]")) else {
        return Vec::new();
    };
    let frame = root.get_bounding_client_rect();

    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .filter_map(|element| {
            let id = element.get_attribute(HEADING_ID_ATTR)?;
            let rect = element.get_bounding_client_rect();
            let overlaps = rect.bottom() > frame.top() && rect.top() < frame.bottom();
            overlaps.then(|| VisibleAnchor::new(id, rect.top() - frame.top()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_set_accumulates_changes() {
        let mut visible = VisibleHeadings::default();
        visible.update("heading-a-0", true, 10.0);
        visible.update("heading-b-1", true, 300.0);
        visible.update("heading-a-0", false, -40.0);
        visible.update("heading-c-2", false, 900.0);
        visible.update("heading-b-1", true, 120.0);

        assert_eq!(visible.anchors(), vec![VisibleAnchor::new("heading-b-1", 120.0)]);
        visible.clear();
        assert!(visible.is_empty());
    }
}
