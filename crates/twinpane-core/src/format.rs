//! Toolbar formatting actions over plain text.
//!
//! Each action maps `(text, selection)` to a new text and the selection to
//! restore. Inline styles wrap the selection (or insert a selected
//! placeholder), block styles toggle a prefix on every touched line, and the
//! rest insert fixed snippets at the caret.
//!
//! All offsets are character offsets.

use serde::{Deserialize, Serialize};

use crate::history::Snapshot;

const TABLE_SNIPPET: &str = "\n| Header 1 | Header 2 | Header 3 |\n| -------- | -------- | -------- |\n| Cell 1   | Cell 2   | Cell 3   |\n";
const RULE_SNIPPET: &str = "\n---\n";
const LINE_BREAK_SNIPPET: &str = "  \n";
const FENCE_OPEN: &str = "\n```\n";
const FENCE_CLOSE: &str = "\n```\n";
/// Selected placeholder inside `[..](url)` / `![..](url)`.
const URL_PLACEHOLDER: &str = "url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "level")]
pub enum FormatAction {
    Bold,
    Italic,
    Strikethrough,
    /// ATX heading prefix, level clamped to 1..=3.
    Heading(u8),
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

impl FormatAction {
    /// Toolbar order.
    pub const ALL: [FormatAction; 17] = [
        FormatAction::Bold,
        FormatAction::Italic,
        FormatAction::Strikethrough,
        FormatAction::Heading(1),
        FormatAction::Heading(2),
        FormatAction::Heading(3),
        FormatAction::Blockquote,
        FormatAction::InlineCode,
        FormatAction::CodeBlock,
        FormatAction::BulletList,
        FormatAction::OrderedList,
        FormatAction::TaskList,
        FormatAction::Link,
        FormatAction::Image,
        FormatAction::Table,
        FormatAction::HorizontalRule,
        FormatAction::LineBreak,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormatAction::Bold => "Bold",
            FormatAction::Italic => "Italic",
            FormatAction::Strikethrough => "Strikethrough",
            FormatAction::Heading(level) => match (*level).clamp(1, 3) {
                1 => "Heading 1",
                2 => "Heading 2",
                _ => "Heading 3",
            },
            FormatAction::Blockquote => "Blockquote",
            FormatAction::InlineCode => "Inline Code",
            FormatAction::CodeBlock => "Code Block",
            FormatAction::BulletList => "Bullet List",
            FormatAction::OrderedList => "Ordered List",
            FormatAction::TaskList => "Task List",
            FormatAction::Link => "Link",
            FormatAction::Image => "Image",
            FormatAction::Table => "Table",
            FormatAction::HorizontalRule => "Horizontal Rule",
            FormatAction::LineBreak => "Line Break",
        }
    }

    /// Keyboard shortcut hint shown next to the button, if any.
    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            FormatAction::Bold => Some("Mod+B"),
            FormatAction::Italic => Some("Mod+I"),
            _ => None,
        }
    }

    /// Apply to `text` with the selection `start..end` (either order).
    ///
    /// Offsets past the end of the text are clamped.
    pub fn apply(&self, text: &str, start: usize, end: usize) -> Formatted {
        let len = text.chars().count();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));

        match self {
            FormatAction::Bold => wrap_or_insert(text, start, end, "**", "**", "bold text"),
            FormatAction::Italic => wrap_or_insert(text, start, end, "*", "*", "italic text"),
            FormatAction::Strikethrough => {
                wrap_or_insert(text, start, end, "~~", "~~", "strikethrough")
            }
            FormatAction::InlineCode => wrap_or_insert(text, start, end, "`", "`", "code"),
            FormatAction::CodeBlock => {
                wrap_or_insert(text, start, end, FENCE_OPEN, FENCE_CLOSE, "code here")
            }
            FormatAction::Heading(level) => {
                let prefix = format!("{} ", "#".repeat(usize::from((*level).clamp(1, 3))));
                toggle_line_prefix(text, start, end, &prefix)
            }
            FormatAction::Blockquote => toggle_line_prefix(text, start, end, "> "),
            FormatAction::BulletList => toggle_line_prefix(text, start, end, "- "),
            FormatAction::OrderedList => toggle_line_prefix(text, start, end, "1. "),
            FormatAction::TaskList => toggle_line_prefix(text, start, end, "- [ ] "),
            FormatAction::Link => link(text, start, end, "[", "link text"),
            FormatAction::Image => link(text, start, end, "![", "alt text"),
            FormatAction::Table => insert_snippet(text, start, TABLE_SNIPPET),
            FormatAction::HorizontalRule => insert_snippet(text, start, RULE_SNIPPET),
            FormatAction::LineBreak => insert_snippet(text, start, LINE_BREAK_SNIPPET),
        }
    }
}

/// Result of a formatting action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatted {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl From<Formatted> for Snapshot {
    fn from(f: Formatted) -> Self {
        Snapshot::new(f.text, f.selection_start, f.selection_end)
    }
}

/// Byte index of char offset `offset`, or the end of `text`.
fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Split `text` at char offsets `start <= end` into (before, selected, after).
fn split3(text: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let (s, e) = (byte_index(text, start), byte_index(text, end));
    (&text[..s], &text[s..e], &text[e..])
}

fn wrap_or_insert(
    text: &str,
    start: usize,
    end: usize,
    before: &str,
    after: &str,
    placeholder: &str,
) -> Formatted {
    let (head, selected, tail) = split3(text, start, end);
    let body = if selected.is_empty() { placeholder } else { selected };

    let mut out = String::with_capacity(text.len() + before.len() + after.len() + body.len());
    out.push_str(head);
    out.push_str(before);
    out.push_str(body);
    out.push_str(after);
    out.push_str(tail);

    let selection_start = start + before.chars().count();
    Formatted {
        text: out,
        selection_start,
        selection_end: selection_start + body.chars().count(),
    }
}

/// Prefix every line touched by the selection, or strip the prefix if every
/// such line already has it.
fn toggle_line_prefix(text: &str, start: usize, end: usize, prefix: &str) -> Formatted {
    let (head, _, _) = split3(text, start, end);
    let line_start = head.rfind('\n').map_or(0, |i| head[..=i].chars().count());

    let (before, chunk, after) = split3(text, line_start, end);
    let lines: Vec<&str> = chunk.split('\n').collect();
    let strip = lines.iter().all(|l| l.starts_with(prefix));

    let new_chunk = lines
        .iter()
        .map(|line| match line.strip_prefix(prefix) {
            Some(rest) if strip => rest.to_string(),
            _ => format!("{prefix}{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let old_len = chunk.chars().count();
    let new_len = new_chunk.chars().count();
    let selection_end = (end + new_len).saturating_sub(old_len);

    Formatted {
        text: [before, new_chunk.as_str(), after].concat(),
        selection_start: line_start,
        selection_end,
    }
}

/// `[label](url)` / `![label](url)` with the url placeholder selected.
fn link(text: &str, start: usize, end: usize, open: &str, placeholder: &str) -> Formatted {
    let (head, selected, tail) = split3(text, start, end);
    let label = if selected.is_empty() { placeholder } else { selected };
    let snippet = format!("{open}{label}]({URL_PLACEHOLDER})");

    let selection_start = start + open.chars().count() + label.chars().count() + 2;
    Formatted {
        text: [head, snippet.as_str(), tail].concat(),
        selection_start,
        selection_end: selection_start + URL_PLACEHOLDER.len(),
    }
}

/// Insert at `at`, leaving any selection in place after the snippet.
fn insert_snippet(text: &str, at: usize, snippet: &str) -> Formatted {
    let (head, _, tail) = split3(text, at, at);
    let caret = at + snippet.chars().count();
    Formatted {
        text: [head, snippet, tail].concat(),
        selection_start: caret,
        selection_end: caret,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(action: FormatAction, text: &str, start: usize, end: usize) -> (String, usize, usize) {
        let f = action.apply(text, start, end);
        (f.text, f.selection_start, f.selection_end)
    }

    #[test]
    fn test_bold_wraps_selection() {
        assert_eq!(
            apply(FormatAction::Bold, "say hello now", 4, 9),
            ("say **hello** now".to_string(), 6, 11)
        );
    }

    #[test]
    fn test_bold_inserts_placeholder() {
        assert_eq!(
            apply(FormatAction::Bold, "ab", 1, 1),
            ("a**bold text**b".to_string(), 3, 12)
        );
    }

    #[test]
    fn test_reversed_selection_is_normalized() {
        assert_eq!(
            apply(FormatAction::Italic, "say hello", 9, 4),
            ("say *hello*".to_string(), 5, 10)
        );
    }

    #[test]
    fn test_offsets_are_chars() {
        // "héllo" is five chars but six bytes.
        assert_eq!(
            apply(FormatAction::InlineCode, "héllo wörld", 6, 11),
            ("héllo `wörld`".to_string(), 7, 12)
        );
    }

    #[test]
    fn test_heading_toggles_prefix() {
        let (text, start, end) = apply(FormatAction::Heading(2), "one\ntwo", 5, 5);
        assert_eq!(text, "one\n## two");
        assert_eq!((start, end), (4, 8));

        let (text, start, end) = apply(FormatAction::Heading(2), &text, 8, 8);
        assert_eq!(text, "one\ntwo");
        assert_eq!((start, end), (4, 5));
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(apply(FormatAction::Heading(9), "x", 0, 0).0, "### x");
        assert_eq!(apply(FormatAction::Heading(0), "x", 0, 0).0, "# x");
    }

    #[test]
    fn test_prefix_spans_selected_lines() {
        let (text, start, end) = apply(FormatAction::BulletList, "a\nb\nc", 0, 3);
        assert_eq!(text, "- a\n- b\nc");
        assert_eq!((start, end), (0, 7));
    }

    #[test]
    fn test_mixed_lines_get_prefixed() {
        let (text, _, _) = apply(FormatAction::Blockquote, "> a\nb", 0, 5);
        assert_eq!(text, "> > a\n> b");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            apply(FormatAction::CodeBlock, "", 0, 0),
            ("\n```\ncode here\n```\n".to_string(), 5, 14)
        );
    }

    #[test]
    fn test_link_selects_url() {
        let (text, start, end) = apply(FormatAction::Link, "see docs", 4, 8);
        assert_eq!(text, "see [docs](url)");
        assert_eq!(&text[start..end], "url");

        let (text, start, end) = apply(FormatAction::Image, "", 0, 0);
        assert_eq!(text, "![alt text](url)");
        assert_eq!(&text[start..end], "url");
    }

    #[test]
    fn test_snippets_insert_at_caret() {
        let (text, start, end) = apply(FormatAction::HorizontalRule, "ab", 1, 2);
        assert_eq!(text, "a\n---\nb");
        assert_eq!((start, end), (6, 6));

        let (text, start, _) = apply(FormatAction::LineBreak, "ab", 2, 2);
        assert_eq!(text, "ab  \n");
        assert_eq!(start, 5);

        let (text, start, _) = apply(FormatAction::Table, "", 0, 0);
        assert!(text.starts_with("\n| Header 1 |"));
        assert_eq!(start, text.chars().count());
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        assert_eq!(
            apply(FormatAction::Strikethrough, "ab", 10, 20),
            ("ab~~strikethrough~~".to_string(), 4, 17)
        );
    }

    #[test]
    fn test_toolbar_covers_every_action() {
        let labels: Vec<_> = FormatAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), 17);
        assert_eq!(labels[3], "Heading 1");
        assert_eq!(FormatAction::Bold.shortcut(), Some("Mod+B"));
        assert_eq!(FormatAction::Table.shortcut(), None);
    }
}
