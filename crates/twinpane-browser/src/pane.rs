//! Scrollable DOM elements as sync panes.
//!
//! `DomPane` implements the core `PaneController` over a `web_sys::HtmlElement`
//! with `overflow: auto`. Heading anchors are found by their
//! `data-heading-id` attribute, which the renderer sets to the outline id.

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, ScrollBehavior, ScrollToOptions};

use twinpane_core::{PaneController, PaneError, PaneId, PaneMetrics};

/// Attribute the renderer puts on every heading element.
pub const HEADING_ID_ATTR: &str = "data-heading-id";

/// Attribute the shell puts on every outline item.
pub const OUTLINE_ID_ATTR: &str = "data-outline-id";

/// A scrollable element bound to one pane slot.
#[derive(Debug, Clone)]
pub struct DomPane {
    id: PaneId,
    element: HtmlElement,
}

impl DomPane {
    pub fn new(id: PaneId, element: HtmlElement) -> Self {
        Self { id, element }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Subscribe to scroll events. The listener is removed when dropped.
    pub fn on_scroll<F>(&self, mut callback: F) -> EventListener
    where
        F: FnMut(PaneMetrics) + 'static,
    {
        let element = self.element.clone();
        EventListener::new(&self.element, "scroll", move |_| {
            callback(element_metrics(&element));
        })
    }

    /// Subscribe to the end of a scroll, animated or not.
    pub fn on_scroll_end<F>(&self, mut callback: F) -> EventListener
    where
        F: FnMut(PaneId) + 'static,
    {
        let id = self.id;
        EventListener::new(&self.element, "scrollend", move |_| callback(id))
    }

    /// Line height and top padding from computed style, for a text pane.
    ///
    /// None if the style is unavailable or `line-height` is not in pixels
    /// (e.g. `normal`).
    pub fn text_geometry(&self) -> Option<(f64, f64)> {
        let style = gloo_utils::window()
            .get_computed_style(&self.element)
            .ok()
            .flatten()?;
        let line_height = parse_px(&style.get_property_value("line-height").ok()?)?;
        let padding_top = style
            .get_property_value("padding-top")
            .ok()
            .and_then(|v| parse_px(&v))
            .unwrap_or(0.0);
        Some((line_height, padding_top))
    }

    /// Heading element for an outline id inside this pane.
    pub fn find_anchor(&self, anchor_id: &str) -> Option<HtmlElement> {
        let nodes = self
            .element
            .query_selector_all(&format!("[{HEADING_ID_ATTR}]"))
            .ok()?;
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .find(|el| el.get_attribute(HEADING_ID_ATTR).as_deref() == Some(anchor_id))
    }
}

impl PaneController for DomPane {
    fn scroll_to(&mut self, offset: f64, smooth: bool) -> Result<(), PaneError> {
        if !self.element.is_connected() {
            return Err(PaneError::NotMounted(self.id));
        }
        let options = ScrollToOptions::new();
        options.set_top(offset);
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        });
        self.element.scroll_to_with_scroll_to_options(&options);
        Ok(())
    }

    fn metrics(&self) -> PaneMetrics {
        element_metrics(&self.element)
    }

    /// Content-relative top, independent of `offsetParent` and current scroll.
    fn anchor_offset(&self, anchor_id: &str) -> Option<f64> {
        let anchor = self.find_anchor(anchor_id)?;
        let anchor_top = anchor.get_bounding_client_rect().top();
        let pane_top = self.element.get_bounding_client_rect().top();
        Some(anchor_top - pane_top + f64::from(self.element.scroll_top()))
    }
}

pub fn element_metrics(element: &HtmlElement) -> PaneMetrics {
    PaneMetrics::new(
        f64::from(element.scroll_top()),
        f64::from(element.scroll_height()),
        f64::from(element.client_height()),
    )
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("22.95px"), Some(22.95));
        assert_eq!(parse_px(" 24px "), Some(24.0));
        assert_eq!(parse_px("normal"), None);
        assert_eq!(parse_px("1.7"), None);
    }
}
