//! Crate-level error type.
//!
//! Lower layers keep their own error enums ([`BackendError`] next to the
//! backend trait, [`ConfigError`] next to config loading). [`PrepError`] is
//! what the pipeline surfaces to callers.
//!
//! Two failure policies apply:
//!
//! * **Compression** failures always propagate. An over-budget asset is never
//!   handed back as if it were a success.
//! * **Crop** failures are caught where the crop step runs, logged, and leave
//!   the image untouched. [`PrepError::CropCancelled`] only escapes through the
//!   explicit `try_crop` entry point.

use crate::config::ConfigError;
use crate::imaging::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    // ── Compression ───────────────────────────────────────────────────────
    /// No step of the quality ladder produced output under the byte budget.
    #[error(
        "Could not compress image under {budget} bytes after {attempts} attempts{}",
        smallest.map(|s| format!(" (smallest: {s} bytes)")).unwrap_or_default()
    )]
    CompressionExhausted {
        budget: u64,
        attempts: u32,
        /// Smallest measurable output seen, if any attempt encoded at all.
        smallest: Option<u64>,
    },

    /// The re-encoder produced nothing usable for a geometry step.
    #[error("Image encode failed: {0}")]
    EncodeFailed(String),

    // ── Crop host ─────────────────────────────────────────────────────────
    /// The user backed out of the crop UI.
    #[error("Crop cancelled")]
    CropCancelled,

    /// The crop host failed for a reason other than cancellation.
    #[error("Crop failed: {0}")]
    CropFailed(String),

    // ── Network ───────────────────────────────────────────────────────────
    #[error("Fetching '{uri}' timed out after {timeout_ms}ms")]
    FetchTimeout { uri: String, timeout_ms: u64 },

    #[error("Failed to fetch '{uri}': {reason}")]
    FetchFailed { uri: String, reason: String },

    // ── Input ─────────────────────────────────────────────────────────────
    #[error("Invalid crop region: {0}")]
    InvalidCrop(String),

    #[error("Invalid dimensions {width}x{height}: both sides must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported rotation {degrees}°: only quarter turns can be rendered")]
    UnsupportedRotation { degrees: f64 },

    /// A blocking image task panicked or was cancelled before returning.
    #[error("Image task failed: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PrepError {
    /// Whether this error came from the network fetch stage.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::FetchTimeout { .. } | Self::FetchFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_includes_smallest_when_known() {
        let err = PrepError::CompressionExhausted {
            budget: 1000,
            attempts: 10,
            smallest: Some(1200),
        };
        let msg = err.to_string();
        assert!(msg.contains("1000 bytes"));
        assert!(msg.contains("10 attempts"));
        assert!(msg.contains("smallest: 1200"));
    }

    #[test]
    fn exhausted_message_without_any_output() {
        let err = PrepError::CompressionExhausted {
            budget: 1000,
            attempts: 10,
            smallest: None,
        };
        assert!(!err.to_string().contains("smallest"));
    }

    #[test]
    fn fetch_errors_are_classified() {
        let timeout = PrepError::FetchTimeout {
            uri: "https://example.com/a.jpg".into(),
            timeout_ms: 5000,
        };
        assert!(timeout.is_fetch());
        assert!(!PrepError::CropCancelled.is_fetch());
    }
}
