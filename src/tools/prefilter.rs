//! Image pre-filter for OMR input
//!
//! Stateless bytes-to-bytes cleanup that improves recognition on phone
//! photos and low-resolution scans: grayscale, contrast boost, sharpen,
//! and upscaling to a minimum width. Has no effect on arrangement
//! correctness, only on downstream OMR accuracy, so a decode failure just
//! returns the input unchanged.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// Pages narrower than this get doubled in size before OMR.
const MIN_WIDTH: u32 = 1000;

/// Contrast adjustment applied after grayscaling.
const CONTRAST_BOOST: f32 = 50.0;

/// 3x3 sharpening kernel.
const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

fn apply(img: DynamicImage) -> DynamicImage {
    let mut img = img.grayscale().adjust_contrast(CONTRAST_BOOST).filter3x3(&SHARPEN);
    if img.width() < MIN_WIDTH {
        img = img.resize(img.width() * 2, img.height() * 2, FilterType::Lanczos3);
    }
    img
}

/// Pre-process raw image bytes for OMR; returns PNG bytes, or the input
/// unchanged when it cannot be decoded.
pub fn prefilter_image(bytes: &[u8]) -> Vec<u8> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("pre-filter skipped, image decode failed: {}", e);
            return bytes.to_vec();
        }
    };

    let processed = apply(img);
    let mut out = Cursor::new(Vec::new());
    match processed.write_to(&mut out, ImageFormat::Png) {
        Ok(()) => out.into_inner(),
        Err(e) => {
            log::warn!("pre-filter skipped, PNG encode failed: {}", e);
            bytes.to_vec()
        }
    }
}
