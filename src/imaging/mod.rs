//! Image processing: planning, compression, and the pixel backends.
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (aspect policies, upload planning,
//!   crop resolution, resize targets)
//! - **Parameters**: data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait, the [`Backend`] selector, and the
//!   [`FileBackend`] / [`InlineBackend`] variants
//! - **Compress**: the quality ladder loop
//! - **Operations**: high-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod compress;
pub mod data_uri;
pub mod inline_backend;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{
    Backend, BackendError, Dimensions, EncodedImage, ImageAsset, ImageBackend, ImageHandle,
    JPEG_MIME,
};
pub use calculations::{AspectRatio, CropRegion};
pub use compress::{Compressed, QualityLadder};
pub use inline_backend::InlineBackend;
pub use operations::{
    MAX_IMAGE_SIZE_IN_BYTES, apply_manipulation, compress_asset, compress_if_needed,
    get_dimensions, resize_to_budget,
};
pub use params::{Quality, ResizeMode};
pub use rust_backend::FileBackend;
