//! Per-image state: asset slots, pending transform, undo, change events.
//!
//! A [`PendingImage`] owns everything about one outbound image:
//!
//! ```text
//! original ──manipulate──▶ cropped ──compress──▶ compressed ──▶ upload
//!     │                       ▲
//!     └──────crop (host)──────┘
//! ```
//!
//! - `original` is set once and never changes.
//! - `cropped` is replaced on every geometry change.
//! - `compressed` is replaced only by [`PendingImage::compress`] and is what
//!   gets uploaded.
//!
//! Every mutating call takes `&mut self`, so the borrow checker rules out a
//! second edit while one is running. Slots and [`TransformState`] are only
//! written after the backend call returns successfully; a failed encode
//! leaves the image exactly as it was.
//!
//! ## Undo
//!
//! [`save_snapshot`](PendingImage::save_snapshot) records the current
//! `(compressed, attributes)` pair into a single slot.
//! [`previous`](PendingImage::previous) restores it without clearing it, so
//! calling it twice in a row restores the same snapshot twice.
//!
//! ## Events
//!
//! [`subscribe`](PendingImage::subscribe) hands out a channel receiving an
//! [`ImageEvent`] after every committed change. Dropped receivers are pruned
//! on the next send.

use crate::crop::{CropHost, CropRequest};
use crate::error::PrepError;
use crate::imaging::calculations::{AspectRatio, plan_resized_dimensions, plan_upload_dimensions};
use crate::imaging::operations::{apply_manipulation, compress_asset};
use crate::imaging::{
    Dimensions, ImageAsset, ImageBackend, ImageHandle, JPEG_MIME, QualityLadder, data_uri,
};
use crate::transform::{ManipulationRequest, TransformState};
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{debug, error, warn};

/// Default maximum upload dimensions.
pub const POST_IMG_MAX: Dimensions = Dimensions {
    width: 2000,
    height: 2000,
};

/// Where an image is in its preparation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Only `original` is set.
    Fresh,
    /// Geometry has been applied since the last compression.
    Cropped,
    /// `compressed` reflects the latest geometry and meets the budget.
    Compressed,
}

/// Change notification sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageEvent {
    Cropped(ImageAsset),
    Compressed(ImageAsset),
    Restored,
    CropFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    compressed: Option<ImageAsset>,
    attributes: TransformState,
}

/// One image being prepared for upload.
#[derive(Debug)]
pub struct PendingImage {
    original: ImageAsset,
    cropped: Option<ImageAsset>,
    compressed: Option<ImageAsset>,
    attributes: TransformState,
    previous: Option<Snapshot>,
    stage: Stage,
    max_dimensions: Dimensions,
    ladder: QualityLadder,
    listeners: Vec<Sender<ImageEvent>>,
}

impl PendingImage {
    pub fn new(original: ImageAsset) -> Self {
        Self {
            original,
            cropped: None,
            compressed: None,
            attributes: TransformState::default(),
            previous: None,
            stage: Stage::Fresh,
            max_dimensions: POST_IMG_MAX,
            ladder: QualityLadder::default(),
            listeners: Vec::new(),
        }
    }

    /// Identify `handle` through the backend and wrap it as the original.
    pub fn from_handle(
        backend: &impl ImageBackend,
        handle: ImageHandle,
    ) -> Result<Self, PrepError> {
        let dims = backend.identify(&handle)?;
        let byte_size = if handle.is_data_uri() {
            data_uri::decoded_size(handle.as_str()).unwrap_or(0)
        } else {
            std::fs::metadata(handle.as_path())
                .map_err(crate::imaging::BackendError::Io)?
                .len()
        };
        Ok(Self::new(ImageAsset {
            path: handle,
            mime: JPEG_MIME.to_string(),
            byte_size,
            width: dims.width,
            height: dims.height,
        }))
    }

    pub fn with_max_dimensions(mut self, max: Dimensions) -> Self {
        self.max_dimensions = max;
        self
    }

    pub fn with_ladder(mut self, ladder: QualityLadder) -> Self {
        self.ladder = ladder;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn original(&self) -> &ImageAsset {
        &self.original
    }

    pub fn cropped(&self) -> Option<&ImageAsset> {
        self.cropped.as_ref()
    }

    pub fn compressed(&self) -> Option<&ImageAsset> {
        self.compressed.as_ref()
    }

    pub fn attributes(&self) -> &TransformState {
        &self.attributes
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// The asset to send to the server, once compression has run.
    pub fn upload_asset(&self) -> Option<&ImageAsset> {
        self.compressed.as_ref()
    }

    // ── Planning ──────────────────────────────────────────────────────────

    /// `width / height` for `policy`; `Source` resolves against the original.
    pub fn ratio_multiplier(&self, policy: AspectRatio) -> f64 {
        policy.multiplier(self.original.dimensions())
    }

    pub fn upload_dimensions(&self, dims: Dimensions, policy: AspectRatio) -> Dimensions {
        plan_upload_dimensions(dims, self.max_dimensions, policy)
    }

    pub fn resized_dimensions(&self, policy: AspectRatio, max_side: u32) -> Dimensions {
        plan_resized_dimensions(self.ratio_multiplier(policy), max_side)
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Change the aspect ratio policy without re-encoding.
    pub fn set_ratio(&mut self, policy: AspectRatio) {
        self.attributes = self.attributes.with_aspect_ratio(policy);
    }

    /// Rotate by a quarter turn (any multiple of 90, negative included).
    /// Other angles are rejected before anything is encoded.
    pub fn set_rotate(
        &mut self,
        backend: &impl ImageBackend,
        degrees: f64,
    ) -> Result<&ImageAsset, PrepError> {
        let next = self.attributes.with_rotation(degrees);
        if !next.is_quarter_turn() {
            return Err(PrepError::UnsupportedRotation { degrees });
        }
        self.commit_geometry(backend, next)
    }

    pub fn flip_horizontal(
        &mut self,
        backend: &impl ImageBackend,
    ) -> Result<&ImageAsset, PrepError> {
        let next = self.attributes.with_flip_horizontal_toggled();
        self.commit_geometry(backend, next)
    }

    pub fn flip_vertical(
        &mut self,
        backend: &impl ImageBackend,
    ) -> Result<&ImageAsset, PrepError> {
        let next = self.attributes.with_flip_vertical_toggled();
        self.commit_geometry(backend, next)
    }

    /// Merge `request` into the current transform and re-render from the
    /// original. An empty request re-renders the current state.
    pub fn manipulate(
        &mut self,
        backend: &impl ImageBackend,
        request: &ManipulationRequest,
    ) -> Result<&ImageAsset, PrepError> {
        let next = self.attributes.with_request(request);
        self.commit_geometry(backend, next)
    }

    /// Re-render `cropped` from the current transform.
    pub fn reset_compressed(
        &mut self,
        backend: &impl ImageBackend,
    ) -> Result<&ImageAsset, PrepError> {
        self.manipulate(backend, &ManipulationRequest::default())
    }

    fn commit_geometry(
        &mut self,
        backend: &impl ImageBackend,
        next: TransformState,
    ) -> Result<&ImageAsset, PrepError> {
        let asset = apply_manipulation(backend, &self.original, &next, self.max_dimensions)
            .inspect_err(|e| error!(error = %e, "Failed to apply edits"))?;
        debug!(
            width = asset.width,
            height = asset.height,
            bytes = asset.byte_size,
            "geometry applied"
        );
        self.attributes = next;
        self.stage = Stage::Cropped;
        self.emit(ImageEvent::Cropped(asset.clone()));
        // Re-rendering unchanged geometry can land on the same file.
        if let Some(stale) = self.cropped.take().filter(|s| s.path != asset.path) {
            self.release(backend, &stale.path);
        }
        Ok(self.cropped.insert(asset))
    }

    /// Hand a working file back to the backend unless a slot still points
    /// at it.
    fn release(&self, backend: &impl ImageBackend, handle: &ImageHandle) {
        let in_use = *handle == self.original.path
            || self.cropped.as_ref().is_some_and(|a| a.path == *handle)
            || self.compressed.as_ref().is_some_and(|a| a.path == *handle)
            || self
                .previous
                .as_ref()
                .and_then(|s| s.compressed.as_ref())
                .is_some_and(|a| a.path == *handle);
        if in_use {
            return;
        }
        if let Err(e) = backend.discard(handle) {
            warn!(handle = %handle, error = %e, "failed to discard working file");
        }
    }

    /// Crop through an interactive host. Failures, cancellation included,
    /// are logged and leave the image untouched. Returns whether a new
    /// cropped asset was stored.
    pub fn crop(&mut self, host: &impl CropHost) -> bool {
        let result = self.try_crop(host).map(|_| ());
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to crop photo");
                self.emit(ImageEvent::CropFailed(e.to_string()));
                false
            }
        }
    }

    /// Like [`crop`](Self::crop) but hands the error back.
    pub fn try_crop(&mut self, host: &impl CropHost) -> Result<&ImageAsset, PrepError> {
        // The editor needs an output size before it opens.
        let dims = self.upload_dimensions(self.original.dimensions(), AspectRatio::Source);
        let cropped = host.open_cropper(&CropRequest {
            source: self.original.path.clone(),
            width: dims.width,
            height: dims.height,
            free_style: true,
        })?;
        self.stage = Stage::Cropped;
        self.emit(ImageEvent::Cropped(cropped.clone()));
        Ok(self.cropped.insert(cropped))
    }

    // ── Compression ───────────────────────────────────────────────────────

    /// Compress the latest geometry result (or the original if there is
    /// none) under `max_bytes`. On exhaustion nothing is stored.
    pub fn compress(
        &mut self,
        backend: &impl ImageBackend,
        max_bytes: u64,
    ) -> Result<&ImageAsset, PrepError> {
        let source = self.cropped.as_ref().unwrap_or(&self.original);
        let out = compress_asset(backend, source, max_bytes, self.ladder)?;
        self.stage = Stage::Compressed;
        self.emit(ImageEvent::Compressed(out.asset.clone()));
        if let Some(stale) = self.compressed.take().filter(|s| s.path != out.asset.path) {
            self.release(backend, &stale.path);
        }
        Ok(self.compressed.insert(out.asset))
    }

    /// Take the upload asset and release the geometry working file behind
    /// it. `None` when compression never succeeded; the working file is
    /// released either way.
    pub fn finish(mut self, backend: &impl ImageBackend) -> Option<ImageAsset> {
        let upload = self.compressed.take();
        if let Some(cropped) = self.cropped.take() {
            let is_upload = upload.as_ref().is_some_and(|u| u.path == cropped.path);
            if !is_upload {
                self.release(backend, &cropped.path);
            }
        }
        upload
    }

    // ── Undo ──────────────────────────────────────────────────────────────

    /// Remember the current `(compressed, attributes)` for [`previous`](Self::previous).
    /// Overwrites any earlier snapshot.
    pub fn save_snapshot(&mut self) {
        self.previous = Some(Snapshot {
            compressed: self.compressed.clone(),
            attributes: self.attributes.clone(),
        });
    }

    /// Restore the saved snapshot. Returns `false` (and changes nothing)
    /// when no snapshot was ever saved.
    pub fn previous(&mut self) -> bool {
        let Some(snapshot) = self.previous.clone() else {
            return false;
        };
        self.compressed = snapshot.compressed;
        self.attributes = snapshot.attributes;
        self.stage = match (&self.compressed, &self.cropped) {
            (Some(_), _) => Stage::Compressed,
            (None, Some(_)) => Stage::Cropped,
            (None, None) => Stage::Fresh,
        };
        self.emit(ImageEvent::Restored);
        true
    }

    // ── Events ────────────────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Receiver<ImageEvent> {
        let (tx, rx) = channel();
        self.listeners.push(tx);
        rx
    }

    fn emit(&mut self, event: ImageEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropError;
    use crate::crop::tests::ScriptedCropHost;
    use crate::imaging::backend::tests::{MockBackend, MockEncode};
    use crate::imaging::calculations::CropRegion;
    use crate::imaging::operations::MAX_IMAGE_SIZE_IN_BYTES;

    fn image(width: u32, height: u32) -> PendingImage {
        PendingImage::new(ImageAsset {
            path: "/original.jpg".into(),
            mime: JPEG_MIME.to_string(),
            byte_size: 3_000_000,
            width,
            height,
        })
    }

    #[test]
    fn fresh_image_has_only_original() {
        let img = image(3000, 2000);
        assert_eq!(img.stage(), Stage::Fresh);
        assert!(img.cropped().is_none());
        assert!(img.compressed().is_none());
        assert!(img.upload_asset().is_none());
        assert!(!img.has_previous());
    }

    #[test]
    fn ratio_multipliers_use_original_for_source() {
        let img = image(3000, 2000);
        assert_eq!(img.ratio_multiplier(AspectRatio::Source), 1.5);
        assert_eq!(img.ratio_multiplier(AspectRatio::ThreeFour), 0.75);
        assert_eq!(
            img.resized_dimensions(AspectRatio::Source, 2000),
            Dimensions::new(2000, 1333).unwrap()
        );
    }

    #[test]
    fn end_to_end_landscape_to_square() {
        let img = image(3000, 2000);
        let planned = img.upload_dimensions(img.original().dimensions(), AspectRatio::Square);
        assert_eq!(planned, Dimensions::new(2000, 2000).unwrap());

        let backend = MockBackend::with_encodes(
            3000,
            2000,
            vec![
                MockEncode::Size(2_400_000),
                MockEncode::Size(1_500_000),
                MockEncode::Size(900_000),
            ],
        );
        let mut img = img;
        img.manipulate(&backend, &ManipulationRequest::default()).unwrap();
        img.manipulate(
            &backend,
            &ManipulationRequest {
                aspect_ratio: Some(AspectRatio::Square),
                ..Default::default()
            },
        )
        .unwrap();
        let compressed = img.compress(&backend, MAX_IMAGE_SIZE_IN_BYTES).unwrap();
        assert!(compressed.byte_size < MAX_IMAGE_SIZE_IN_BYTES);
        assert!(backend.reencode_count() <= 2 + 10);
    }

    #[test]
    fn set_ratio_changes_state_without_encoding() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.set_ratio(AspectRatio::FourThree);
        assert_eq!(img.attributes().aspect_ratio, AspectRatio::FourThree);
        assert_eq!(img.stage(), Stage::Fresh);
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn rotate_and_flip_rerender() {
        let backend = MockBackend::new(3000, 2000);
        let mut img = image(3000, 2000);

        let rotated = img.set_rotate(&backend, 90.0).unwrap().clone();
        // Rotated 2000x3000, ratio 1:1 → height constrained to 2000
        assert_eq!(rotated.height, 2000);
        assert_eq!(img.attributes().rotate_degrees, 90.0);

        img.flip_horizontal(&backend).unwrap();
        img.flip_vertical(&backend).unwrap();
        assert!(img.attributes().flip_horizontal);
        assert!(img.attributes().flip_vertical);
        assert_eq!(img.stage(), Stage::Cropped);
        assert_eq!(backend.reencode_count(), 3);
    }

    #[test]
    fn empty_delta_is_idempotent() {
        let backend = MockBackend::new(1000, 1000);
        let mut img = image(1000, 1000);
        let first = img
            .manipulate(
                &backend,
                &ManipulationRequest {
                    crop: Some(CropRegion::new(0.25, 0.25, 0.5, 0.5).unwrap()),
                    aspect_ratio: Some(AspectRatio::Source),
                    ..Default::default()
                },
            )
            .unwrap()
            .dimensions();
        let again = img
            .manipulate(&backend, &ManipulationRequest::default())
            .unwrap()
            .dimensions();
        assert_eq!(first, Dimensions::new(500, 500).unwrap());
        assert_eq!(again, first);
        assert_eq!(img.reset_compressed(&backend).unwrap().dimensions(), first);
    }

    #[test]
    fn failed_encode_leaves_state_untouched() {
        let backend =
            MockBackend::with_encodes(100, 100, vec![MockEncode::Size(10), MockEncode::Fail]);
        let mut img = image(100, 100);
        img.manipulate(&backend, &ManipulationRequest::default()).unwrap();
        let before_asset = img.cropped().cloned();
        let before_state = img.attributes().clone();

        assert!(img.set_rotate(&backend, 180.0).is_err());
        assert_eq!(img.cropped().cloned(), before_asset);
        assert_eq!(img.attributes(), &before_state);
    }

    #[test]
    fn compress_uses_cropped_when_present() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let cropped_path = img
            .manipulate(&backend, &ManipulationRequest::default())
            .unwrap()
            .path
            .clone();
        img.compress(&backend, 5000).unwrap();

        let ops = backend.get_operations();
        assert!(matches!(
            ops.last().unwrap(),
            crate::imaging::backend::tests::RecordedOp::Reencode { source, .. }
                if *source == cropped_path.as_str()
        ));
        assert_eq!(img.stage(), Stage::Compressed);
    }

    #[test]
    fn compress_exhaustion_keeps_previous_compressed() {
        let mut backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.compress(&backend, 5000).unwrap();
        let kept = img.compressed().cloned();

        backend.fallback_size = 10_000;
        let err = img.compress(&backend, 5000).unwrap_err();
        assert!(matches!(err, PrepError::CompressionExhausted { .. }));
        assert_eq!(img.compressed().cloned(), kept);
    }

    #[test]
    fn edit_after_compress_returns_to_cropped() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.compress(&backend, 5000).unwrap();
        assert_eq!(img.stage(), Stage::Compressed);
        img.flip_vertical(&backend).unwrap();
        assert_eq!(img.stage(), Stage::Cropped);
    }

    #[test]
    fn previous_restores_snapshot() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.compress(&backend, 5000).unwrap();
        img.save_snapshot();
        let saved_asset = img.compressed().cloned();
        let saved_state = img.attributes().clone();

        img.set_rotate(&backend, 90.0).unwrap();
        img.compress(&backend, 5000).unwrap();
        assert_ne!(img.compressed().cloned(), saved_asset);

        assert!(img.previous());
        assert_eq!(img.compressed().cloned(), saved_asset);
        assert_eq!(img.attributes(), &saved_state);
        assert_eq!(img.stage(), Stage::Compressed);
    }

    #[test]
    fn repeated_previous_reapplies_same_snapshot() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.save_snapshot();
        img.set_rotate(&backend, 90.0).unwrap();

        assert!(img.previous());
        let once = (img.compressed().cloned(), img.attributes().clone());
        assert!(img.previous());
        assert_eq!((img.compressed().cloned(), img.attributes().clone()), once);
        assert_eq!(img.attributes().rotate_degrees, 0.0);
    }

    #[test]
    fn previous_without_snapshot_is_noop() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.set_rotate(&backend, 90.0).unwrap();
        assert!(!img.previous());
        assert_eq!(img.attributes().rotate_degrees, 90.0);
    }

    #[test]
    fn non_quarter_rotation_is_rejected_before_encoding() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let err = img.set_rotate(&backend, 45.0).unwrap_err();
        assert!(matches!(err, PrepError::UnsupportedRotation { degrees } if degrees == 45.0));
        assert_eq!(backend.reencode_count(), 0);
        assert_eq!(img.attributes().rotate_degrees, 0.0);

        img.set_rotate(&backend, -270.0).unwrap();
        assert_eq!(img.attributes().rotate_degrees, -270.0);
    }

    #[test]
    fn superseded_geometry_result_is_released() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let first = img
            .manipulate(&backend, &ManipulationRequest::default())
            .unwrap()
            .path
            .clone();
        img.flip_horizontal(&backend).unwrap();

        assert_eq!(backend.discarded(), vec![first.as_str().to_string()]);
        assert!(!backend.discarded().contains(&"/original.jpg".to_string()));
    }

    #[test]
    fn snapshot_keeps_its_compressed_file() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let saved = img.compress(&backend, 5000).unwrap().path.clone();
        img.save_snapshot();
        let second = img.compress(&backend, 5000).unwrap().path.clone();
        assert!(!backend.discarded().contains(&saved.as_str().to_string()));

        img.compress(&backend, 5000).unwrap();
        assert!(backend.discarded().contains(&second.as_str().to_string()));
        assert!(!backend.discarded().contains(&saved.as_str().to_string()));
    }

    #[test]
    fn finish_hands_over_upload_and_releases_working_file() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let cropped = img
            .manipulate(&backend, &ManipulationRequest::default())
            .unwrap()
            .path
            .clone();
        let compressed = img.compress(&backend, 5000).unwrap().clone();

        let upload = img.finish(&backend).unwrap();
        assert_eq!(upload, compressed);
        assert_eq!(backend.discarded(), vec![cropped.as_str().to_string()]);
    }

    #[test]
    fn finish_without_compression_returns_none() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        img.manipulate(&backend, &ManipulationRequest::default()).unwrap();
        assert!(img.finish(&backend).is_none());
        assert_eq!(backend.discarded().len(), 1);
    }

    #[test]
    fn crop_host_receives_upload_dimensions() {
        let host = ScriptedCropHost::confirming(2000, 1333);
        let mut img = image(3000, 2000);
        assert!(img.crop(&host));

        let requests = host.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!((requests[0].width, requests[0].height), (2000, 1333));
        assert!(requests[0].free_style);
        assert_eq!(img.cropped().unwrap().path.as_str(), "/cropped.jpg");
        assert_eq!(img.stage(), Stage::Cropped);
    }

    #[test]
    fn cancelled_crop_is_logged_not_propagated() {
        let host = ScriptedCropHost::failing(CropError::Cancelled);
        let mut img = image(3000, 2000);
        let events = img.subscribe();

        assert!(!img.crop(&host));
        assert!(img.cropped().is_none());
        assert_eq!(img.stage(), Stage::Fresh);
        assert!(matches!(events.try_recv().unwrap(), ImageEvent::CropFailed(_)));
    }

    #[test]
    fn try_crop_surfaces_cancellation() {
        let host = ScriptedCropHost::failing(CropError::Cancelled);
        let mut img = image(3000, 2000);
        assert!(matches!(img.try_crop(&host), Err(PrepError::CropCancelled)));
    }

    #[test]
    fn subscribers_see_committed_changes_in_order() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        let events = img.subscribe();

        img.manipulate(&backend, &ManipulationRequest::default()).unwrap();
        img.compress(&backend, 5000).unwrap();
        img.save_snapshot();
        img.previous();

        let seen: Vec<ImageEvent> = events.try_iter().collect();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], ImageEvent::Cropped(_)));
        assert!(matches!(seen[1], ImageEvent::Compressed(_)));
        assert_eq!(seen[2], ImageEvent::Restored);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let backend = MockBackend::new(100, 100);
        let mut img = image(100, 100);
        drop(img.subscribe());
        let live = img.subscribe();

        img.manipulate(&backend, &ManipulationRequest::default()).unwrap();
        assert_eq!(img.listeners.len(), 1);
        assert!(live.try_recv().is_ok());
    }

    #[test]
    fn from_handle_measures_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        crate::test_helpers::create_test_jpeg(&path, 64, 48);
        let expected = std::fs::metadata(&path).unwrap().len();

        let backend = crate::imaging::InlineBackend::new();
        let img = PendingImage::from_handle(&backend, path.into()).unwrap();
        assert_eq!(img.original().byte_size, expected);
        assert_eq!(img.original().dimensions(), Dimensions::new(64, 48).unwrap());
    }
}
