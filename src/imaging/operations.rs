//! High-level image operations.
//!
//! These functions combine the pure planning code with backend execution.
//! They take a source and a policy, compute the ops, and call the backend.

use super::backend::{Dimensions, ImageAsset, ImageBackend, ImageHandle, JPEG_MIME};
use super::compress::{Compressed, QualityLadder, compress_to_budget};
use super::params::{EncodeParams, GeometryOp, Quality, ResizeMode, ResizeTarget};
use crate::error::PrepError;
use crate::transform::{TransformState, plan_manipulation};
use tracing::{debug, warn};

/// Default pre-upload byte budget.
pub const MAX_IMAGE_SIZE_IN_BYTES: u64 = 976_560;

/// Byte size recorded for a geometry result whose size could not be
/// measured. It exceeds [`MAX_IMAGE_SIZE_IN_BYTES`], so any budget check
/// downstream sends the image back through compression.
pub const ENCODE_FAILURE_SENTINEL_BYTES: u64 = MAX_IMAGE_SIZE_IN_BYTES + 999;

/// Get image dimensions using the backend.
pub fn get_dimensions(
    backend: &impl ImageBackend,
    handle: &ImageHandle,
) -> Result<Dimensions, PrepError> {
    Ok(backend.identify(handle)?)
}

/// Apply `state` to `original` and encode at full quality.
///
/// Ops are planned against `original`'s dimensions (see
/// [`plan_manipulation`]). An encoder error is
/// [`PrepError::EncodeFailed`]; an unmeasurable result is kept with
/// [`ENCODE_FAILURE_SENTINEL_BYTES`] as its size.
pub fn apply_manipulation(
    backend: &impl ImageBackend,
    original: &ImageAsset,
    state: &TransformState,
    max: Dimensions,
) -> Result<ImageAsset, PrepError> {
    let plan = plan_manipulation(original.dimensions(), state, max);
    debug!(ops = ?plan.ops, upload = %plan.upload, "applying manipulation");

    let encoded = backend
        .reencode(&EncodeParams {
            source: original.path.clone(),
            ops: plan.ops,
            quality: Quality::MAX,
        })
        .map_err(|e| PrepError::EncodeFailed(e.to_string()))?;

    let byte_size = encoded.byte_size.unwrap_or_else(|| {
        warn!(handle = %encoded.handle, "manipulated image has no measurable size");
        ENCODE_FAILURE_SENTINEL_BYTES
    });

    Ok(ImageAsset {
        path: encoded.handle,
        mime: JPEG_MIME.to_string(),
        byte_size,
        width: encoded.width,
        height: encoded.height,
    })
}

/// Re-encode `source` at descending quality, geometry untouched, until it
/// fits under `max_bytes`.
pub fn compress_asset(
    backend: &impl ImageBackend,
    source: &ImageAsset,
    max_bytes: u64,
    ladder: QualityLadder,
) -> Result<Compressed, PrepError> {
    compress_to_budget(backend, &source.path, &[], max_bytes, ladder)
}

/// Render `source` into an exact `width × height` box and compress it under
/// `max_bytes`.
pub fn resize_to_budget(
    backend: &impl ImageBackend,
    source: &ImageHandle,
    width: u32,
    height: u32,
    mode: ResizeMode,
    max_bytes: u64,
    ladder: QualityLadder,
) -> Result<ImageAsset, PrepError> {
    if width == 0 || height == 0 {
        return Err(PrepError::InvalidDimensions { width, height });
    }
    let ops = [GeometryOp::Resize(ResizeTarget::Exact {
        width,
        height,
        mode,
    })];
    Ok(compress_to_budget(backend, source, &ops, max_bytes, ladder)?.asset)
}

/// Return `asset` as-is when it is already under `max_bytes`; otherwise
/// re-render it at its own dimensions through the quality ladder.
pub fn compress_if_needed(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
    max_bytes: u64,
    ladder: QualityLadder,
) -> Result<ImageAsset, PrepError> {
    if asset.byte_size < max_bytes {
        return Ok(asset.clone());
    }
    resize_to_budget(
        backend,
        &asset.path,
        asset.width,
        asset.height,
        ResizeMode::Stretch,
        max_bytes,
        ladder,
    )
}
