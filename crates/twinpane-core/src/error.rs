//! Error types for pane operations and configuration.
//!
//! None of these are fatal: the coordinator absorbs pane failures and the
//! session refuses invalid configuration up front.

use thiserror::Error;

use crate::types::PaneId;

/// A pane could not carry out a scroll or measurement.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PaneError {
    /// The pane's element is not mounted.
    #[error("pane {0} is not mounted")]
    NotMounted(PaneId),

    /// The platform rejected the operation.
    #[error("pane {pane} operation failed: {message}")]
    Platform { pane: PaneId, message: String },
}

impl PaneError {
    pub fn platform(pane: PaneId, message: impl Into<String>) -> Self {
        PaneError::Platform {
            pane,
            message: message.into(),
        }
    }
}

/// Invalid synchronization configuration.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// History capacity must allow at least the seed snapshot.
    #[error("history capacity must be at least 1")]
    ZeroCapacity,

    /// Line height is used as a divisor when mapping scroll offsets to lines.
    #[error("source line height must be positive, got {0}")]
    NonPositiveLineHeight(f64),

    /// A duration was zero where a live timer is required.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
