//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use twinpane_core::{FormatAction, OutlineEntry, Snapshot, ViewMode};

use crate::offsets::char_to_utf16;

/// Toolbar action as sent from JavaScript, e.g. `{ type: "heading", level: 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsFormatAction {
    Bold,
    Italic,
    Strikethrough,
    Heading { level: u8 },
    Blockquote,
    InlineCode,
    CodeBlock,
    BulletList,
    OrderedList,
    TaskList,
    Link,
    Image,
    Table,
    HorizontalRule,
    LineBreak,
}

impl From<JsFormatAction> for FormatAction {
    fn from(action: JsFormatAction) -> Self {
        match action {
            JsFormatAction::Bold => FormatAction::Bold,
            JsFormatAction::Italic => FormatAction::Italic,
            JsFormatAction::Strikethrough => FormatAction::Strikethrough,
            JsFormatAction::Heading { level } => FormatAction::Heading(level),
            JsFormatAction::Blockquote => FormatAction::Blockquote,
            JsFormatAction::InlineCode => FormatAction::InlineCode,
            JsFormatAction::CodeBlock => FormatAction::CodeBlock,
            JsFormatAction::BulletList => FormatAction::BulletList,
            JsFormatAction::OrderedList => FormatAction::OrderedList,
            JsFormatAction::TaskList => FormatAction::TaskList,
            JsFormatAction::Link => FormatAction::Link,
            JsFormatAction::Image => FormatAction::Image,
            JsFormatAction::Table => FormatAction::Table,
            JsFormatAction::HorizontalRule => FormatAction::HorizontalRule,
            JsFormatAction::LineBreak => FormatAction::LineBreak,
        }
    }
}

/// Text and selection the shell should display (`applySnapshot`).
///
/// Selection offsets are UTF-16 code units, ready for `setSelectionRange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsSnapshot {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl From<Snapshot> for JsSnapshot {
    fn from(s: Snapshot) -> Self {
        Self {
            selection_start: char_to_utf16(&s.text, s.selection_start),
            selection_end: char_to_utf16(&s.text, s.selection_end),
            text: s.text,
        }
    }
}

/// One outline entry, with `charOffset` in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsOutlineEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
    pub ordinal: usize,
    pub line_number: usize,
    pub char_offset: usize,
}

impl JsOutlineEntry {
    /// `text` is the document the entry was extracted from.
    pub fn new(entry: &OutlineEntry, text: &str) -> Self {
        Self {
            id: entry.id.to_string(),
            text: entry.text.to_string(),
            level: entry.level,
            ordinal: entry.ordinal,
            line_number: entry.line_number,
            char_offset: char_to_utf16(text, entry.char_offset),
        }
    }
}

/// Everything a toolbar and outline panel need to render their state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsSyncStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_entry_id: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub pending_commit: bool,
    #[tsify(type = "\"split\" | \"editor\" | \"preview\"")]
    pub view_mode: ViewMode,
}

pub fn parse_view_mode(s: &str) -> Option<ViewMode> {
    match s {
        "split" => Some(ViewMode::Split),
        "editor" => Some(ViewMode::Editor),
        "preview" => Some(ViewMode::Preview),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_mode() {
        assert_eq!(parse_view_mode("split"), Some(ViewMode::Split));
        assert_eq!(parse_view_mode("preview"), Some(ViewMode::Preview));
        assert_eq!(parse_view_mode("Split"), None);
    }

    #[test]
    fn test_snapshot_selection_in_utf16() {
        let js = JsSnapshot::from(Snapshot::new("😀 **ab**", 4, 6));
        assert_eq!((js.selection_start, js.selection_end), (5, 7));
    }

    #[test]
    fn test_outline_offset_in_utf16() {
        let text = "😀 emoji\n# H";
        let entries = twinpane_core::extract(text);
        assert_eq!(entries[0].char_offset, 8);
        assert_eq!(JsOutlineEntry::new(&entries[0], text).char_offset, 9);
    }

    #[test]
    fn test_heading_action_maps_level() {
        assert_eq!(
            FormatAction::from(JsFormatAction::Heading { level: 2 }),
            FormatAction::Heading(2)
        );
    }
}
