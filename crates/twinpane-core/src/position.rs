//! Conversions between source lines and pane scroll offsets.
//!
//! All of these assume a uniform line height. That is exact for the plain
//! text source pane and an accepted approximation for the rendered preview,
//! where heading jumps use element geometry instead.

use crate::types::PaneMetrics;

/// Scroll offset that brings `line_number` to the top of the pane.
pub fn line_to_scroll_offset(line_number: usize, line_height: f64, top_padding: f64) -> f64 {
    (line_number as f64 * line_height - top_padding).max(0.0)
}

/// First (topmost) visible line for a given scroll offset.
pub fn scroll_top_to_top_line(scroll_top: f64, line_height: f64, top_padding: f64) -> usize {
    if line_height <= 0.0 {
        return 0;
    }
    let line = ((scroll_top + top_padding) / line_height).floor();
    // Negative and NaN both saturate to 0.
    line.max(0.0) as usize
}

/// Scroll offset for a fraction of the scrollable range, clamped to it.
pub fn fraction_to_scroll_top(fraction: f64, scroll_height: f64, client_height: f64) -> f64 {
    let range = scroll_height - client_height;
    if range > 0.0 {
        (fraction * range).clamp(0.0, range)
    } else {
        0.0
    }
}

/// How far through its scrollable range a pane is, in `[0, 1]`.
///
/// None when the content fits and there is nothing to scroll.
pub fn scroll_fraction(metrics: &PaneMetrics) -> Option<f64> {
    let range = metrics.scroll_height - metrics.client_height;
    (range > 0.0).then(|| (metrics.scroll_top / range).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_to_scroll_offset() {
        assert_eq!(line_to_scroll_offset(0, 20.0, 24.0), 0.0);
        assert_eq!(line_to_scroll_offset(1, 20.0, 24.0), 0.0);
        assert_eq!(line_to_scroll_offset(10, 20.0, 24.0), 176.0);
    }

    #[test]
    fn test_scroll_top_to_top_line() {
        assert_eq!(scroll_top_to_top_line(0.0, 20.0, 0.0), 0);
        assert_eq!(scroll_top_to_top_line(19.9, 20.0, 0.0), 0);
        assert_eq!(scroll_top_to_top_line(20.0, 20.0, 0.0), 1);
        assert_eq!(scroll_top_to_top_line(176.0, 20.0, 24.0), 10);
        assert_eq!(scroll_top_to_top_line(-100.0, 20.0, 0.0), 0);
        assert_eq!(scroll_top_to_top_line(100.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_line_round_trip() {
        for line in [3usize, 17, 250] {
            let offset = line_to_scroll_offset(line, 20.0, 24.0);
            assert_eq!(scroll_top_to_top_line(offset, 20.0, 24.0), line);
        }
    }

    #[test]
    fn test_fraction_to_scroll_top() {
        assert_eq!(fraction_to_scroll_top(0.5, 1000.0, 400.0), 300.0);
        assert_eq!(fraction_to_scroll_top(1.5, 1000.0, 400.0), 600.0);
        assert_eq!(fraction_to_scroll_top(-0.2, 1000.0, 400.0), 0.0);
        assert_eq!(fraction_to_scroll_top(0.5, 300.0, 400.0), 0.0);
    }

    #[test]
    fn test_scroll_fraction() {
        assert_eq!(scroll_fraction(&PaneMetrics::new(300.0, 1000.0, 400.0)), Some(0.5));
        assert_eq!(scroll_fraction(&PaneMetrics::new(0.0, 400.0, 400.0)), None);
    }
}
