//! Crop-UI host capability.
//!
//! Some platforms crop through a native, interactive editor that hands back
//! an already-cropped file. The editor needs the output size up front, so
//! the caller plans upload dimensions before opening it.

use crate::error::PrepError;
use crate::imaging::{ImageAsset, ImageHandle};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("Crop cancelled by user")]
    Cancelled,
    #[error("Crop editor failed: {0}")]
    Failed(String),
}

impl From<CropError> for PrepError {
    fn from(e: CropError) -> Self {
        match e {
            CropError::Cancelled => PrepError::CropCancelled,
            CropError::Failed(reason) => PrepError::CropFailed(reason),
        }
    }
}

/// What the crop editor is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropRequest {
    pub source: ImageHandle,
    /// Output width the editor must deliver.
    pub width: u32,
    /// Output height the editor must deliver.
    pub height: u32,
    /// Let the user drag a free-form rectangle instead of a locked ratio.
    pub free_style: bool,
}

/// An interactive crop editor. Blocks until the user confirms or cancels.
pub trait CropHost {
    fn open_cropper(&self, request: &CropRequest) -> Result<ImageAsset, CropError>;
}
