//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the planning code (which decides the geometry) and the
//! [`backend`](super::backend) (which moves pixels), so backends can be
//! swapped for a mock without touching the planning logic.
//!
//! ## Types
//!
//! - [`Quality`] — lossy encoding quality in tenths (0.1–1.0).
//! - [`GeometryOp`] — one step of the ordered transform list.
//! - [`ResizeTarget`] / [`ResizeMode`] — how the final resize is constrained.
//! - [`EncodeParams`] — source handle + ops + quality for one re-encode.

use super::backend::ImageHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality for lossy encoding, stored as an integer count of tenths.
///
/// Keeping the step count integral means `0.3` is always exactly `3 / 10`,
/// never `1.0 - 0.1 - 0.1 - 0.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(1);
    pub const MAX: Quality = Quality(10);

    /// Clamped to `1..=10`.
    pub fn from_tenths(tenths: u32) -> Self {
        Self(tenths.clamp(1, 10) as u8)
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    /// Quality as a factor in `(0, 1]`.
    pub fn factor(self) -> f32 {
        self.0 as f32 / 10.0
    }

    /// Quality on the 1–100 scale JPEG encoders take.
    pub fn percent(self) -> u8 {
        self.0 * 10
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.factor())
    }
}

/// How an exact-box resize treats a source with a different aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Fit inside the box, centred on a black canvas of the box size.
    Contain,
    /// Cover the box, centre-cropping the overflow.
    Cover,
    /// Fill the box exactly; aspect ratio is not preserved.
    #[default]
    Stretch,
}

/// Constraint for the final resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Fixed width; height follows the current aspect ratio.
    Width(u32),
    /// Fixed height; width follows the current aspect ratio.
    Height(u32),
    /// Exact output box.
    Exact {
        width: u32,
        height: u32,
        mode: ResizeMode,
    },
}

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCrop {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

/// One geometric step. Backends apply a list of these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryOp {
    FlipHorizontal,
    FlipVertical,
    /// Clockwise rotation.
    Rotate { degrees: f64 },
    Crop(PixelCrop),
    Resize(ResizeTarget),
}

/// Parameters for a single re-encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: ImageHandle,
    pub ops: Vec<GeometryOp>,
    pub quality: Quality,
}
