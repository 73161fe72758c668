//! Pending geometric edits for one image.
//!
//! [`TransformState`] is a plain value. Edits produce a new state via the
//! `with_*` methods; the owning [`PendingImage`](crate::model::PendingImage)
//! swaps it in only after the matching encode has completed.

use crate::imaging::calculations::{
    AspectRatio, CropRegion, normalize_degrees, output_dimensions, plan_upload_dimensions,
    resize_target,
};
use crate::imaging::params::{GeometryOp, ResizeTarget};
use crate::imaging::Dimensions;
use serde::{Deserialize, Serialize};

/// Pan offset from the crop UI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Accumulated transform for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    /// Any real value; applied mod 360. Planning handles any angle, but the
    /// backends only render quarter turns.
    pub rotate_degrees: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Zoom factor, > 0.
    pub scale: f64,
    pub position: Option<Position>,
    pub aspect_ratio: AspectRatio,
    /// Last crop applied. Kept so an empty edit reproduces the same output.
    pub crop: Option<CropRegion>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotate_degrees: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            scale: 1.0,
            position: None,
            aspect_ratio: AspectRatio::Square,
            crop: None,
        }
    }
}

/// Delta for one manipulate call. `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManipulationRequest {
    pub crop: Option<CropRegion>,
    pub aspect_ratio: Option<AspectRatio>,
    pub scale: Option<f64>,
    pub position: Option<Position>,
}

impl ManipulationRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TransformState {
    pub fn with_rotation(&self, degrees: f64) -> Self {
        Self {
            rotate_degrees: degrees,
            ..self.clone()
        }
    }

    pub fn with_flip_horizontal_toggled(&self) -> Self {
        Self {
            flip_horizontal: !self.flip_horizontal,
            ..self.clone()
        }
    }

    pub fn with_flip_vertical_toggled(&self) -> Self {
        Self {
            flip_vertical: !self.flip_vertical,
            ..self.clone()
        }
    }

    pub fn with_aspect_ratio(&self, aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..self.clone()
        }
    }

    /// Merge a request into this state. Non-positive or non-finite scales
    /// are ignored.
    pub fn with_request(&self, request: &ManipulationRequest) -> Self {
        let mut next = self.clone();
        if let Some(crop) = request.crop {
            next.crop = Some(crop);
        }
        if let Some(ratio) = request.aspect_ratio {
            next.aspect_ratio = ratio;
        }
        if let Some(scale) = request.scale.filter(|s| s.is_finite() && *s > 0.0) {
            next.scale = scale;
        }
        if let Some(position) = request.position {
            next.position = Some(position);
        }
        next
    }

    pub fn normalized_rotation(&self) -> f64 {
        normalize_degrees(self.rotate_degrees)
    }

    /// 0, 90, 180 or 270 after normalisation.
    pub fn is_quarter_turn(&self) -> bool {
        self.normalized_rotation() % 90.0 == 0.0
    }
}

/// Ordered ops for a manipulation plus the dimensions it was planned at.
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulationPlan {
    pub ops: Vec<GeometryOp>,
    pub upload: Dimensions,
    pub resize: ResizeTarget,
}

/// Build the op list for `state` against an original of `source` dimensions.
///
/// Order is fixed: horizontal flip, vertical flip, rotation, crop, resize.
/// Flips and rotation act on the full image. The crop region is resolved
/// against the image as it stands after rotation, so a quarter turn swaps
/// the axes the fractions refer to. Fractions are never resolved against
/// the unrotated source dimensions: for a rotated non-square image those
/// fall outside its pixels. Resize is always last,
/// planned from the cropped pixel size when a crop is present and from the
/// (rotated) source otherwise.
pub fn plan_manipulation(
    source: Dimensions,
    state: &TransformState,
    max: Dimensions,
) -> ManipulationPlan {
    let mut ops = Vec::new();
    if state.flip_horizontal {
        ops.push(GeometryOp::FlipHorizontal);
    }
    if state.flip_vertical {
        ops.push(GeometryOp::FlipVertical);
    }
    if state.normalized_rotation() != 0.0 {
        ops.push(GeometryOp::Rotate {
            degrees: state.rotate_degrees,
        });
    }
    let oriented = output_dimensions(source, &ops);

    let planned_from = match state.crop {
        Some(region) => {
            let px = region.to_pixels(oriented);
            ops.push(GeometryOp::Crop(px));
            Dimensions {
                width: px.width,
                height: px.height,
            }
        }
        None => oriented,
    };

    let upload = plan_upload_dimensions(planned_from, max, state.aspect_ratio);
    // `Source` resolves against the whole oriented image here, not the crop.
    let resize = resize_target(state.aspect_ratio.multiplier(oriented), upload);
    ops.push(GeometryOp::Resize(resize));

    ManipulationPlan {
        ops,
        upload,
        resize,
    }
}
