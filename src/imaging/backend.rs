//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the capability contract for everything that
//! touches pixels: decoding dimensions and re-encoding with a list of
//! geometric operations at a given quality. Dimension planning is not part of
//! the trait; it lives in pure functions so every backend plans identically.
//!
//! Two variants exist, chosen once from configuration through [`Backend`]:
//!
//! | Variant | Output handle |
//! |---|---|
//! | [`FileBackend`](super::rust_backend::FileBackend) | path to a `.jpg` in the output directory |
//! | [`InlineBackend`](super::inline_backend::InlineBackend) | `data:image/jpeg;base64,…` URI |

use super::inline_backend::InlineBackend;
use super::params::EncodeParams;
use super::rust_backend::FileBackend;
use crate::config::{BackendKind, PrepConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Pixel dimensions. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Returns `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// `width / height`.
    pub fn ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// True when both sides are strictly smaller than `max`.
    pub fn fits_strictly_within(self, max: Dimensions) -> bool {
        self.width < max.width && self.height < max.height
    }

    pub fn long_edge(self) -> u32 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque reference to an image: a filesystem path or a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// The handle as a path. Only meaningful when not a data URI.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<&str> for ImageHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<PathBuf> for ImageHandle {
    fn from(p: PathBuf) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data_uri() {
            // Data URIs run to megabytes; show the header only.
            let head: String = self.0.chars().take(32).collect();
            write!(f, "{head}… ({} chars)", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Raw output of a re-encode.
///
/// `byte_size` is `None` when the encoder returned a handle whose payload
/// could not be measured; callers must not read that as "small".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub handle: ImageHandle,
    pub byte_size: Option<u64>,
    pub width: u32,
    pub height: u32,
}

/// An immutable, fully-measured image: what gets stored in an asset slot
/// and eventually uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub path: ImageHandle,
    pub mime: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// MIME type of everything the backends produce.
pub const JPEG_MIME: &str = "image/jpeg";

impl ImageAsset {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait for image backends.
///
/// Every backend implements both operations so the planning and compression
/// code stays backend-agnostic. See the [module docs](self) for the variants.
pub trait ImageBackend: Sync {
    /// Decode enough of the image to report its pixel dimensions.
    fn identify(&self, handle: &ImageHandle) -> Result<Dimensions, BackendError>;

    /// Apply `params.ops` in order, then encode as JPEG at `params.quality`.
    fn reencode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError>;

    /// Release an output this backend produced that nobody will read again.
    /// Handles the backend did not create are left alone.
    fn discard(&self, _handle: &ImageHandle) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Backend selected at startup from [`PrepConfig::backend`].
pub enum Backend {
    File(FileBackend),
    Inline(InlineBackend),
}

impl Backend {
    pub fn from_config(config: &PrepConfig) -> Self {
        match config.backend {
            BackendKind::File => Self::File(FileBackend::new(&config.output_dir)),
            BackendKind::Inline => Self::Inline(InlineBackend::new()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::File(_) => BackendKind::File,
            Self::Inline(_) => BackendKind::Inline,
        }
    }
}

impl ImageBackend for Backend {
    fn identify(&self, handle: &ImageHandle) -> Result<Dimensions, BackendError> {
        match self {
            Self::File(b) => b.identify(handle),
            Self::Inline(b) => b.identify(handle),
        }
    }

    fn reencode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError> {
        match self {
            Self::File(b) => b.reencode(params),
            Self::Inline(b) => b.reencode(params),
        }
    }

    fn discard(&self, handle: &ImageHandle) -> Result<(), BackendError> {
        match self {
            Self::File(b) => b.discard(handle),
            Self::Inline(b) => b.discard(handle),
        }
    }
}
