//! Pure Rust pixel pipeline and the file-writing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate, format sniffed from content |
//! | Decode `data:` URIs | `base64` payload → `ImageReader` over the bytes |
//! | Flip | `DynamicImage::fliph` / `flipv` |
//! | Rotate | `rotate90` / `rotate180` / `rotate270` (quarter turns only) |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `resize_exact` / `resize_to_fill` / `resize` + `overlay`, Lanczos3 |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Output naming | SHA-256 of the encoded bytes (`sha2`) |
//!
//! [`render`] is shared with the [`InlineBackend`](super::inline_backend::InlineBackend);
//! only where the encoded bytes end up differs.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend, ImageHandle};
use super::calculations::{normalize_degrees, output_dimensions};
use super::data_uri;
use super::params::{EncodeParams, GeometryOp, Quality, ResizeMode, ResizeTarget};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load and decode an image from a path or `data:` URI.
pub(crate) fn load_image(handle: &ImageHandle) -> Result<DynamicImage, BackendError> {
    if handle.is_data_uri() {
        let (_, bytes) = data_uri::decode(handle.as_str())?;
        return ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode data URI: {e}")));
    }
    let path = handle.as_path();
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Read dimensions from the image header without a full decode.
pub(crate) fn identify_handle(handle: &ImageHandle) -> Result<Dimensions, BackendError> {
    let dims = if handle.is_data_uri() {
        let (_, bytes) = data_uri::decode(handle.as_str())?;
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()
    } else {
        image::image_dimensions(handle.as_path())
    };
    let (width, height) = dims
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read dimensions: {e}")))?;

    Dimensions::new(width, height).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Image {handle} has zero-sized dimensions"))
    })
}

/// An encoded JPEG plus its pixel size.
pub(crate) struct Rendered {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode, apply the ops in order, and encode as JPEG.
pub(crate) fn render(params: &EncodeParams) -> Result<Rendered, BackendError> {
    let img = load_image(&params.source)?;
    let img = apply_ops(img, &params.ops)?;
    let bytes = encode_jpeg(&img, params.quality)?;
    debug!(
        width = img.width(),
        height = img.height(),
        quality = %params.quality,
        bytes = bytes.len(),
        "rendered"
    );
    Ok(Rendered {
        bytes,
        width: img.width(),
        height: img.height(),
    })
}

fn apply_ops(img: DynamicImage, ops: &[GeometryOp]) -> Result<DynamicImage, BackendError> {
    ops.iter().try_fold(img, |img, op| match op {
        GeometryOp::FlipHorizontal => Ok(img.fliph()),
        GeometryOp::FlipVertical => Ok(img.flipv()),
        GeometryOp::Rotate { degrees } => rotate(img, *degrees),
        GeometryOp::Crop(c) => {
            if c.origin_x + c.width > img.width() || c.origin_y + c.height > img.height() {
                return Err(BackendError::ProcessingFailed(format!(
                    "Crop {}x{}+{}+{} outside {}x{} image",
                    c.width,
                    c.height,
                    c.origin_x,
                    c.origin_y,
                    img.width(),
                    img.height()
                )));
            }
            Ok(img.crop_imm(c.origin_x, c.origin_y, c.width, c.height))
        }
        GeometryOp::Resize(target) => Ok(resize(img, *target)),
    })
}

fn rotate(img: DynamicImage, degrees: f64) -> Result<DynamicImage, BackendError> {
    let d = normalize_degrees(degrees);
    if d == 0.0 {
        Ok(img)
    } else if d == 90.0 {
        Ok(img.rotate90())
    } else if d == 180.0 {
        Ok(img.rotate180())
    } else if d == 270.0 {
        Ok(img.rotate270())
    } else {
        Err(BackendError::Unsupported(format!(
            "rotation by {degrees}° (only quarter turns are supported)"
        )))
    }
}

fn resize(img: DynamicImage, target: ResizeTarget) -> DynamicImage {
    let current = Dimensions {
        width: img.width(),
        height: img.height(),
    };
    match target {
        ResizeTarget::Width(_) | ResizeTarget::Height(_) => {
            let out = output_dimensions(current, &[GeometryOp::Resize(target)]);
            img.resize_exact(out.width, out.height, FilterType::Lanczos3)
        }
        ResizeTarget::Exact {
            width,
            height,
            mode: ResizeMode::Stretch,
        } => img.resize_exact(width, height, FilterType::Lanczos3),
        ResizeTarget::Exact {
            width,
            height,
            mode: ResizeMode::Cover,
        } => img.resize_to_fill(width, height, FilterType::Lanczos3),
        ResizeTarget::Exact {
            width,
            height,
            mode: ResizeMode::Contain,
        } => {
            let fitted = img.resize(width, height, FilterType::Lanczos3).to_rgb8();
            let mut canvas = RgbImage::new(width, height);
            let x = (width - fitted.width()) / 2;
            let y = (height - fitted.height()) / 2;
            image::imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
            DynamicImage::ImageRgb8(canvas)
        }
    }
}

/// Encode as baseline JPEG. Alpha is dropped.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.percent());
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Backend that writes each encode to `<output_dir>/<sha256-prefix>.jpg`.
///
/// Names are content-addressed, so re-encoding identical input at the same
/// quality reuses the same file instead of piling up copies. Rejected ladder
/// steps and superseded geometry results are removed through
/// [`discard`](ImageBackend::discard); files outside `output_dir` are never
/// touched.
pub struct FileBackend {
    output_dir: PathBuf,
}

impl FileBackend {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn content_name(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    format!("{}.jpg", &digest[..16])
}

impl ImageBackend for FileBackend {
    fn identify(&self, handle: &ImageHandle) -> Result<Dimensions, BackendError> {
        identify_handle(handle)
    }

    fn reencode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError> {
        let rendered = render(params)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(content_name(&rendered.bytes));
        std::fs::write(&path, &rendered.bytes)?;

        // Measure what actually landed on disk, not the buffer.
        let byte_size = std::fs::metadata(&path).ok().map(|m| m.len());
        Ok(EncodedImage {
            handle: path.into(),
            byte_size,
            width: rendered.width,
            height: rendered.height,
        })
    }

    fn discard(&self, handle: &ImageHandle) -> Result<(), BackendError> {
        if handle.is_data_uri() || handle.as_path().parent() != Some(self.output_dir.as_path()) {
            return Ok(());
        }
        match std::fs::remove_file(handle.as_path()) {
            Ok(()) => {
                debug!(path = %handle, "discarded output");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
