//! Backend that keeps encodes in memory as `data:` URIs.
//!
//! The counterpart of rendering to a canvas and reading back
//! `toDataURL("image/jpeg", q)`: nothing touches the filesystem, and the
//! byte size is the decoded payload size of the URI.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend, ImageHandle, JPEG_MIME};
use super::data_uri;
use super::params::EncodeParams;
use super::rust_backend::{identify_handle, render};

#[derive(Debug, Default)]
pub struct InlineBackend;

impl InlineBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for InlineBackend {
    fn identify(&self, handle: &ImageHandle) -> Result<Dimensions, BackendError> {
        identify_handle(handle)
    }

    fn reencode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError> {
        let rendered = render(params)?;
        let uri = data_uri::encode(JPEG_MIME, &rendered.bytes);
        Ok(EncodedImage {
            byte_size: data_uri::decoded_size(&uri),
            handle: ImageHandle::new(uri),
            width: rendered.width,
            height: rendered.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{GeometryOp, Quality, ResizeMode, ResizeTarget};
    use crate::test_helpers::create_test_jpeg;

    #[test]
    fn reencode_returns_measured_data_uri() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 80);

        let backend = InlineBackend::new();
        let encoded = backend
            .reencode(&EncodeParams {
                source: source.into(),
                ops: vec![GeometryOp::Resize(ResizeTarget::Exact {
                    width: 60,
                    height: 60,
                    mode: ResizeMode::Cover,
                })],
                quality: Quality::from_tenths(8),
            })
            .unwrap();

        assert!(encoded.handle.as_str().starts_with("data:image/jpeg;base64,"));
        let (_, bytes) = data_uri::decode(encoded.handle.as_str()).unwrap();
        assert_eq!(encoded.byte_size, Some(bytes.len() as u64));
        assert_eq!((encoded.width, encoded.height), (60, 60));
    }

    #[test]
    fn output_can_be_fed_back_in() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 50, 40);

        let backend = InlineBackend::new();
        let first = backend
            .reencode(&EncodeParams {
                source: source.into(),
                ops: vec![GeometryOp::Rotate { degrees: 90.0 }],
                quality: Quality::MAX,
            })
            .unwrap();
        let dims = backend.identify(&first.handle).unwrap();
        assert_eq!((dims.width, dims.height), (40, 50));
    }
}
