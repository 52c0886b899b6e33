//! Tunables for history, debouncing and scroll synchronization.
//!
//! Deserializes from camelCase so a JS shell can pass a plain object; every
//! field falls back to its default when omitted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of snapshots kept in `past`.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Quiet period after the last keystroke before a snapshot is committed (ms).
pub const DEFAULT_COMMIT_DEBOUNCE_MS: u64 = 500;

/// Fallback release for an outline-click lock (ms).
///
/// Matches the preview's smooth-scroll animation. Move it with the animation.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub history_capacity: usize,
    pub commit_debounce_ms: u64,
    pub lock_timeout_ms: u64,
    /// Rendered height of one source line (px).
    pub source_line_height: f64,
    /// Padding above the first source line (px).
    pub source_top_padding: f64,
    /// Gap left above a heading when the preview jumps to it (px).
    pub preview_anchor_margin: f64,
    /// In split view, drive the preview's scroll fraction from the source pane.
    pub mirror_preview: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            commit_debounce_ms: DEFAULT_COMMIT_DEBOUNCE_MS,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            // 13.5px monospace at line-height 1.7
            source_line_height: 22.95,
            source_top_padding: 24.0,
            preview_anchor_margin: 32.0,
            mirror_preview: true,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.source_line_height.is_nan() || self.source_line_height <= 0.0 {
            return Err(ConfigError::NonPositiveLineHeight(self.source_line_height));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("lockTimeoutMs"));
        }
        Ok(())
    }

    pub fn commit_debounce(&self) -> Duration {
        Duration::from_millis(self.commit_debounce_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.lock_timeout(), Duration::from_millis(1200));
        assert_eq!(config.commit_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{ "lockTimeoutMs": 800, "mirrorPreview": false }"#).unwrap();
        assert_eq!(config.lock_timeout_ms, 800);
        assert!(!config.mirror_preview);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SyncConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let config = SyncConfig {
            source_line_height: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveLineHeight(0.0))
        );

        let config = SyncConfig {
            lock_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("lockTimeoutMs"))
        );
    }
}
