//! Pure calculation functions for upload dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Rounding: every computed side is rounded half away from zero
//! ([`f64::round`]) and clamped to at least one pixel.

use super::backend::Dimensions;
use super::params::{GeometryOp, PixelCrop, ResizeTarget};
use crate::error::PrepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target aspect-ratio policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "4:3")]
    FourThree,
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    ThreeFour,
    /// Keep whatever ratio the image being planned already has.
    #[serde(rename = "None")]
    Source,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::FourThree,
        AspectRatio::Square,
        AspectRatio::ThreeFour,
        AspectRatio::Source,
    ];

    /// `width / height` for this policy. [`AspectRatio::Source`] resolves
    /// against `source`, so it differs per image.
    pub fn multiplier(self, source: Dimensions) -> f64 {
        match self {
            AspectRatio::FourThree => 4.0 / 3.0,
            AspectRatio::Square => 1.0,
            AspectRatio::ThreeFour => 3.0 / 4.0,
            AspectRatio::Source => source.ratio(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::FourThree => "4:3",
            AspectRatio::Square => "1:1",
            AspectRatio::ThreeFour => "3:4",
            AspectRatio::Source => "None",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4:3" => Ok(AspectRatio::FourThree),
            "1:1" => Ok(AspectRatio::Square),
            "3:4" => Ok(AspectRatio::ThreeFour),
            "None" | "none" | "source" => Ok(AspectRatio::Source),
            other => Err(format!(
                "unknown aspect ratio '{other}' (expected 4:3, 1:1, 3:4 or None)"
            )),
        }
    }
}

/// Crop rectangle normalised to `[0, 1]` against the source dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegion {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Slack for `origin + extent <= 1` so UI-computed fractions like
/// `0.1 + 0.9` are not rejected.
const CROP_EPSILON: f64 = 1e-9;

impl CropRegion {
    /// Validates that every field is in `[0, 1]`, extents are non-zero and
    /// the rectangle stays inside the unit square.
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Result<Self, PrepError> {
        let unit = |name: &str, v: f64| {
            if v.is_finite() && (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(PrepError::InvalidCrop(format!("{name} = {v} is outside [0, 1]")))
            }
        };
        unit("originX", origin_x)?;
        unit("originY", origin_y)?;
        unit("width", width)?;
        unit("height", height)?;
        if width == 0.0 || height == 0.0 {
            return Err(PrepError::InvalidCrop("width and height must be non-zero".into()));
        }
        if origin_x + width > 1.0 + CROP_EPSILON || origin_y + height > 1.0 + CROP_EPSILON {
            return Err(PrepError::InvalidCrop(format!(
                "region ({origin_x}, {origin_y}) + ({width}, {height}) leaves the image"
            )));
        }
        Ok(Self {
            origin_x,
            origin_y,
            width,
            height,
        })
    }

    /// Convert to pixel coordinates against `source`.
    pub fn to_pixels(self, source: Dimensions) -> PixelCrop {
        let sw = source.width as f64;
        let sh = source.height as f64;
        let origin_x = ((self.origin_x * sw).round() as u32).min(source.width - 1);
        let origin_y = ((self.origin_y * sh).round() as u32).min(source.height - 1);
        let width = ((self.width * sw).round() as u32).clamp(1, source.width - origin_x);
        let height = ((self.height * sh).round() as u32).clamp(1, source.height - origin_y);
        PixelCrop {
            origin_x,
            origin_y,
            width,
            height,
        }
    }
}

impl FromStr for CropRegion {
    type Err = PrepError;

    /// Parses `originX,originY,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| PrepError::InvalidCrop(format!("'{s}': {e}")))?;
        match parts.as_slice() {
            [x, y, w, h] => CropRegion::new(*x, *y, *w, *h),
            _ => Err(PrepError::InvalidCrop(format!(
                "'{s}': expected four comma-separated numbers"
            ))),
        }
    }
}

fn side(v: f64) -> u32 {
    (v.round() as u32).max(1)
}

/// Dimensions to upload `source` at.
///
/// Returns `source` unchanged when it already fits strictly inside `max` —
/// nothing is ever upscaled. Otherwise resizes to the policy ratio with the
/// long edge at `min(max.width, max.height)`.
///
/// [`AspectRatio::Source`] resolves against `source` itself, so when a crop
/// is planned the cropped pixel dimensions define the kept ratio.
pub fn plan_upload_dimensions(
    source: Dimensions,
    max: Dimensions,
    policy: AspectRatio,
) -> Dimensions {
    if source.fits_strictly_within(max) {
        return source;
    }
    let max_side = max.width.min(max.height);
    plan_resized_dimensions(policy.multiplier(source), max_side)
}

/// Dimensions for a `width / height` ratio with the long edge at `max_side`.
///
/// - ratio `== 1`: `max_side × max_side`
/// - ratio `< 1` (portrait): `max_side·ratio × max_side`
/// - ratio `> 1` (landscape): `max_side × max_side/ratio`
pub fn plan_resized_dimensions(ratio: f64, max_side: u32) -> Dimensions {
    let m = max_side as f64;
    if ratio == 1.0 {
        Dimensions {
            width: max_side,
            height: max_side,
        }
    } else if ratio < 1.0 {
        Dimensions {
            width: side(m * ratio),
            height: max_side,
        }
    } else {
        Dimensions {
            width: max_side,
            height: side(m / ratio),
        }
    }
}

/// Constrain only one axis of the final resize so an encoder that derives
/// the other axis is not over-constrained: width for landscape ratios,
/// height otherwise.
pub fn resize_target(ratio: f64, upload: Dimensions) -> ResizeTarget {
    if ratio > 1.0 {
        ResizeTarget::Width(upload.width)
    } else {
        ResizeTarget::Height(upload.height)
    }
}

/// Normalise degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Predict the dimensions produced by applying `ops` to an image of
/// `source` dimensions.
pub fn output_dimensions(source: Dimensions, ops: &[GeometryOp]) -> Dimensions {
    ops.iter().fold(source, |dims, op| match *op {
        GeometryOp::FlipHorizontal | GeometryOp::FlipVertical => dims,
        GeometryOp::Rotate { degrees } => rotated_bounds(dims, degrees),
        GeometryOp::Crop(crop) => Dimensions {
            width: crop.width,
            height: crop.height,
        },
        GeometryOp::Resize(ResizeTarget::Width(w)) => Dimensions {
            width: w,
            height: side(dims.height as f64 * w as f64 / dims.width as f64),
        },
        GeometryOp::Resize(ResizeTarget::Height(h)) => Dimensions {
            width: side(dims.width as f64 * h as f64 / dims.height as f64),
            height: h,
        },
        GeometryOp::Resize(ResizeTarget::Exact { width, height, .. }) => {
            Dimensions { width, height }
        }
    })
}

fn rotated_bounds(dims: Dimensions, degrees: f64) -> Dimensions {
    let d = normalize_degrees(degrees);
    if d == 0.0 || d == 180.0 {
        return dims;
    }
    if d == 90.0 || d == 270.0 {
        return Dimensions {
            width: dims.height,
            height: dims.width,
        };
    }
    let (sin, cos) = d.to_radians().sin_cos();
    let (w, h) = (dims.width as f64, dims.height as f64);
    Dimensions {
        width: side(w * cos.abs() + h * sin.abs()),
        height: side(w * sin.abs() + h * cos.abs()),
    }
}
