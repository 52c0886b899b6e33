//! Outline (table of contents) extraction from Markdown source.
//!
//! Headings are found with a line scan rather than a full parse: ATX headings
//! of level 1-3 outside fenced code blocks. The renderer tags each heading it
//! emits with `data-heading-id` set to the entry's `id`, which is how the
//! preview pane and the outline find each other.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Deepest heading level indexed in the outline.
pub const MAX_OUTLINE_LEVEL: usize = 3;

/// Inline markers removed from heading labels.
const INLINE_MARKERS: &[&str] = &["**", "__", "~~", "`"];

const FENCE_MARKER: &str = "```";

/// One heading extracted from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    /// Stable anchor id, see [`slugify`].
    pub id: SmolStr,
    /// Heading label with emphasis/code markers stripped.
    pub text: SmolStr,
    pub level: u8,
    /// Position among all extracted headings.
    pub ordinal: usize,
    /// 0-based source line
    pub line_number: usize,
    /// Character offset of the heading line's start
    pub char_offset: usize,
}

/// Scan `text` and return its headings in document order.
///
/// O(n) in the document length. Runs on every edit.
pub fn extract(text: &str) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut in_fence = false;
    let mut char_offset = 0;

    for (line_number, line) in text.split('\n').enumerate() {
        if line.trim().starts_with(FENCE_MARKER) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some((level, rest)) = parse_heading(line) {
                let stripped = strip_inline_markers(rest);
                let label = stripped.trim();
                let ordinal = entries.len();
                entries.push(OutlineEntry {
                    id: slugify(label, ordinal),
                    text: SmolStr::new(label),
                    level: level as u8,
                    ordinal,
                    line_number,
                    char_offset,
                });
            }
        }

        char_offset += line.chars().count() + 1;
    }

    entries
}

/// Match `#{1,3}` + whitespace + at least one more character at line start.
///
/// Returns the level and the label text: everything after the separating
/// whitespace run, up to the next line terminator.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > MAX_OUTLINE_LEVEL {
        return None;
    }

    let rest = &line[level..];
    let body_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
    if body_start == 0 {
        return None;
    }

    let body = &rest[body_start..];
    if body.is_empty() {
        // Whitespace only: still a heading if some whitespace char past the
        // separator is not a line terminator. The label trims to empty.
        let has_body = rest.chars().skip(1).any(|c| !is_line_terminator(c));
        return has_body.then_some((level, ""));
    }

    let end = body.find(is_line_terminator).unwrap_or(body.len());
    Some((level, &body[..end]))
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{2028}' | '\u{2029}')
}

/// Remove `**`, `__`, `~~` and backticks in a single left-to-right pass.
fn strip_inline_markers(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(c) = rest.chars().next() {
        if let Some(tail) = INLINE_MARKERS.iter().find_map(|m| rest.strip_prefix(m)) {
            rest = tail;
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Derive a heading anchor id from its label and ordinal.
///
/// The ordinal suffix is always present so the id is a pure function of
/// `(label, ordinal)`; duplicate labels never collide.
pub fn slugify(label: &str, ordinal: usize) -> SmolStr {
    let mut slug = String::with_capacity(label.len());
    let mut in_space = false;

    for c in label.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if is_slug_char(c) {
            slug.push(c);
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format_smolstr!("heading-{}", ordinal)
    } else {
        format_smolstr!("heading-{}-{}", slug, ordinal)
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Ordered outline of a document with id and line lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    pub fn from_text(text: &str) -> Self {
        Self {
            entries: extract(text),
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutlineEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&OutlineEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Index of the entry in document order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Last entry starting at or above `line`, i.e. the section `line` is in.
    pub fn entry_at_line(&self, line: usize) -> Option<&OutlineEntry> {
        let idx = self.entries.partition_point(|e| e.line_number <= line);
        idx.checked_sub(1).map(|i| &self.entries[i])
    }
}

impl From<Vec<OutlineEntry>> for Outline {
    fn from(entries: Vec<OutlineEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a OutlineEntry;
    type IntoIter = std::slice::Iter<'a, OutlineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(text: &str) -> Vec<String> {
        extract(text).into_iter().map(|e| e.id.to_string()).collect()
    }

    #[test]
    fn test_extract_positions() {
        let text = "# Title\n\nintro\n## Part **one**\ntext\n### `code` bit";
        let summary: Vec<_> = extract(text)
            .iter()
            .map(|e| (e.id.to_string(), e.level, e.line_number, e.char_offset))
            .collect();

        insta::assert_debug_snapshot!(summary, @r#"
[
    (
        "heading-title-0",
        1,
        0,
        0,
    ),
    (
        "heading-part-one-1",
        2,
        3,
        15,
    ),
    (
        "heading-code-bit-2",
        3,
        5,
        36,
    ),
]
"#);
    }

    #[test]
    fn test_label_strips_markers() {
        let entries = extract("## **Bold** and __under__ ~~gone~~ `x`  ");
        assert_eq!(entries[0].text, "Bold and under gone x");
    }

    #[test]
    fn test_fence_suppression() {
        let entries = extract("```\n# not a heading\n```\n# real heading");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "real heading");
        assert_eq!(entries[0].line_number, 3);
        assert_eq!(entries[0].ordinal, 0);
    }

    #[test]
    fn test_indented_fence_still_toggles() {
        let entries = extract("  ```rust\n# inside\n  ```\n# outside");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "outside");
    }

    #[test]
    fn test_deep_and_malformed_headings_excluded() {
        assert!(extract("#### four").is_empty());
        assert!(extract("#nospace").is_empty());
        assert!(extract("# ").is_empty());
        assert!(extract(" # indented").is_empty());
        assert!(extract("#\r").is_empty());
        assert!(extract("# \r").is_empty());
    }

    #[test]
    fn test_terminator_in_separator_keeps_label() {
        let entries = extract("#\u{2028}x\n## \u{2029} y\u{2028}tail");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "x");
        assert_eq!(entries[0].id, "heading-x-0");
        assert_eq!(entries[1].text, "y");
    }

    #[test]
    fn test_crlf_heading() {
        let entries = extract("# Title\r\nbody\r\n## Next\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Title");
        assert_eq!(entries[1].char_offset, 15);
    }

    #[test]
    fn test_slug_collision() {
        assert_eq!(
            ids("# Intro\n\n# Intro"),
            vec!["heading-intro-0", "heading-intro-1"]
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello,   World!", 3), "heading-hello-world-3");
        assert_eq!(slugify("  - dashes -  ", 0), "heading-dashes-0");
        assert_eq!(slugify("中文 标题", 1), "heading-中文-标题-1");
        assert_eq!(slugify("!!!", 7), "heading-7");
        assert_eq!(slugify("", 2), "heading-2");
        assert_eq!(slugify("snake_case Name", 0), "heading-snake_case-name-0");
    }

    #[test]
    fn test_whitespace_only_label_falls_back_to_ordinal() {
        let entries = extract("#   \n## real");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "");
        assert_eq!(entries[0].id, "heading-0");
        assert_eq!(entries[1].id, "heading-real-1");
    }

    #[test]
    fn test_ordinal_increases_with_line() {
        let text = "# a\n## b\ntext\n### c\n#### d\n# e";
        let entries = extract(text);
        assert_eq!(entries.len(), 4);
        for pair in entries.windows(2) {
            assert!(pair[0].ordinal < pair[1].ordinal);
            assert!(pair[0].line_number < pair[1].line_number);
        }
    }

    #[test]
    fn test_char_offset_counts_chars_not_bytes() {
        let entries = extract("héllo wörld\n# Next");
        assert_eq!(entries[0].char_offset, 12);
    }

    #[test]
    fn test_entry_at_line() {
        let outline = Outline::from_text("intro\n# A\ntext\ntext\n# B\n");
        assert_eq!(outline.entry_at_line(0), None);
        assert_eq!(outline.entry_at_line(1).map(|e| e.text.as_str()), Some("A"));
        assert_eq!(outline.entry_at_line(3).map(|e| e.text.as_str()), Some("A"));
        assert_eq!(outline.entry_at_line(4).map(|e| e.text.as_str()), Some("B"));
        assert_eq!(outline.entry_at_line(99).map(|e| e.text.as_str()), Some("B"));
    }

    #[test]
    fn test_lookup_by_id() {
        let outline = Outline::from_text("# A\n# B");
        assert_eq!(outline.position("heading-b-1"), Some(1));
        assert!(outline.contains("heading-a-0"));
        assert!(!outline.contains("heading-a-1"));
    }
}
