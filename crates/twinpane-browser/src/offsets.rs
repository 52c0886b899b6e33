//! Offset conversion at the JS boundary.
//!
//! The core counts Unicode scalar values. `textarea.selectionStart`,
//! `setSelectionRange` and `String.prototype.length` count UTF-16 code units,
//! so every offset crossing `JsSyncSession` goes through here.

/// Convert a char offset to UTF-16 code units (for the DOM).
///
/// Offsets past the end clamp to the text's UTF-16 length.
///
/// # Example
/// ```
/// use twinpane_browser::offsets::char_to_utf16;
/// // Polar bear is 4 chars, 5 UTF-16 code units
/// assert_eq!(char_to_utf16("🐻‍❄️", 4), 5);
/// ```
pub fn char_to_utf16(text: &str, char_offset: usize) -> usize {
    text.chars()
        .take(char_offset)
        .map(char::len_utf16)
        .sum()
}

/// Convert UTF-16 code units (from the DOM) to a char offset.
///
/// An offset inside a surrogate pair rounds down to the start of its char.
/// Offsets past the end clamp to the text's char count.
pub fn utf16_to_char(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (chars, c) in text.chars().enumerate() {
        units += c.len_utf16();
        if units > utf16_offset {
            return chars;
        }
    }
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        let text = "hello";
        assert_eq!(char_to_utf16(text, 2), 2);
        assert_eq!(utf16_to_char(text, 2), 2);
        assert_eq!(utf16_to_char(text, 99), 5);
    }

    #[test]
    fn test_emoji() {
        // 😀 is one char, two UTF-16 code units
        let text = "😀 ab";
        assert_eq!(char_to_utf16(text, 1), 2);
        assert_eq!(char_to_utf16(text, 4), 5);
        assert_eq!(utf16_to_char(text, 3), 2);
        assert_eq!(utf16_to_char(text, 5), 4);
    }

    #[test]
    fn test_inside_surrogate_pair_rounds_down() {
        assert_eq!(utf16_to_char("😀x", 1), 0);
    }

    #[test]
    fn test_bmp_cjk_is_one_unit() {
        let text = "中文标题";
        assert_eq!(char_to_utf16(text, 3), 3);
        assert_eq!(utf16_to_char(text, 3), 3);
    }
}
