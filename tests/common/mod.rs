//! Synthetic JPEG fixtures shared by the integration tests.
//!
//! The gradient compresses well; the noise image does not, which is what
//! budget tests need.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn write_jpeg(path: &Path, img: &RgbImage, quality: u8) {
    let file = BufWriter::new(File::create(path).unwrap());
    img.write_with_encoder(JpegEncoder::new_with_quality(file, quality))
        .unwrap();
}

pub fn gradient_jpeg(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join(format!("gradient-{width}x{height}.jpg"));
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 96])
    });
    write_jpeg(&path, &img, 92);
    path
}

pub fn noise_jpeg(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join(format!("noise-{width}x{height}.jpg"));
    let mut state: u32 = 0x9e37_79b9;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    let mut img = RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Rgb([next(), next(), next()]);
    }
    write_jpeg(&path, &img, 95);
    path
}
