//! Shared test utilities: synthetic JPEG fixtures.
//!
//! Real photos are avoided so the suite has no binary fixtures. The gradient
//! compresses well; the noise image does not, which is what budget tests need.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a smooth gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgb([r, g, 128])
    });
    write_jpeg(path, &img, 90);
}

/// Write a high-entropy JPEG that stays large at high quality.
///
/// Pixels come from a fixed-seed LCG so the output is identical on every run.
pub fn create_noise_jpeg(path: &Path, width: u32, height: u32) {
    let mut state: u32 = 0x2545_f491;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    let mut img = RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Rgb([next(), next(), next()]);
    }
    write_jpeg(path, &img, 95);
}

fn write_jpeg(path: &Path, img: &RgbImage, quality: u8) {
    let file = BufWriter::new(File::create(path).unwrap());
    img.write_with_encoder(JpegEncoder::new_with_quality(file, quality))
        .unwrap();
}
