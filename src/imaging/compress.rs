//! Quality-ladder compression.
//!
//! Encoders offer no "give me N bytes" knob, so the budget is met by trying
//! descending quality factors until one lands strictly under it. Every caller
//! (pre-upload compression, post-capture `compress_if_needed`, download +
//! resize) runs the same loop with its own ops and ladder.
//!
//! An attempt fails when the encode errors or its size cannot be measured.
//! Failed attempts never end the loop early and are never returned: running
//! off the end of the ladder is [`PrepError::CompressionExhausted`].
//!
//! Every rejected output is handed back to the backend through
//! [`ImageBackend::discard`], so only the accepted encode survives a run.

use super::backend::{ImageAsset, ImageBackend, ImageHandle, JPEG_MIME};
use super::params::{EncodeParams, GeometryOp, Quality};
use crate::error::PrepError;
use tracing::{debug, info, warn};

/// Descending run of qualities from `ceiling` down to `floor`, one tenth
/// per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityLadder {
    pub ceiling: Quality,
    pub floor: Quality,
}

impl QualityLadder {
    pub fn new(ceiling: Quality, floor: Quality) -> Self {
        if floor > ceiling {
            Self {
                ceiling: floor,
                floor: ceiling,
            }
        } else {
            Self { ceiling, floor }
        }
    }

    /// Qualities in the order they are tried.
    pub fn steps(self) -> impl Iterator<Item = Quality> {
        (self.floor.tenths()..=self.ceiling.tenths())
            .rev()
            .map(|t| Quality::from_tenths(t as u32))
    }

    pub fn attempt_count(self) -> u32 {
        (self.ceiling.tenths() - self.floor.tenths()) as u32 + 1
    }
}

/// 1.0 down to 0.1: ten attempts.
impl Default for QualityLadder {
    fn default() -> Self {
        Self::new(Quality::MAX, Quality::MIN)
    }
}

/// A budget-satisfying encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub asset: ImageAsset,
    pub quality: Quality,
    /// 1-based index of the successful attempt.
    pub attempts: u32,
}

/// Re-encode `source` with `ops` at each ladder quality until the output is
/// strictly smaller than `max_bytes`.
pub fn compress_to_budget(
    backend: &impl ImageBackend,
    source: &ImageHandle,
    ops: &[GeometryOp],
    max_bytes: u64,
    ladder: QualityLadder,
) -> Result<Compressed, PrepError> {
    let mut attempts = 0;
    let mut smallest: Option<u64> = None;

    for quality in ladder.steps() {
        attempts += 1;
        let params = EncodeParams {
            source: source.clone(),
            ops: ops.to_vec(),
            quality,
        };

        let encoded = match backend.reencode(&params) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(%quality, error = %e, "re-encode failed, trying next quality");
                continue;
            }
        };
        let Some(size) = encoded.byte_size else {
            warn!(%quality, "re-encode produced an unmeasurable result, trying next quality");
            discard_attempt(backend, source, &encoded.handle);
            continue;
        };
        debug!(%quality, size, max_bytes, "compression attempt");
        smallest = Some(smallest.map_or(size, |s| s.min(size)));

        if size < max_bytes {
            info!(%quality, size, max_bytes, attempts, "compressed under budget");
            return Ok(Compressed {
                asset: ImageAsset {
                    path: encoded.handle,
                    mime: JPEG_MIME.to_string(),
                    byte_size: size,
                    width: encoded.width,
                    height: encoded.height,
                },
                quality,
                attempts,
            });
        }
        discard_attempt(backend, source, &encoded.handle);
    }

    warn!(max_bytes, attempts, ?smallest, "compression ladder exhausted");
    Err(PrepError::CompressionExhausted {
        budget: max_bytes,
        attempts,
        smallest,
    })
}

/// Content-addressed backends can hand back the source itself when an
/// encode reproduces it byte for byte; that one stays.
fn discard_attempt(backend: &impl ImageBackend, source: &ImageHandle, attempt: &ImageHandle) {
    if attempt == source {
        return;
    }
    if let Err(e) = backend.discard(attempt) {
        warn!(handle = %attempt, error = %e, "failed to discard rejected attempt");
    }
}
