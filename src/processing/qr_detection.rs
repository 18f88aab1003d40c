use anyhow::anyhow;
use image::GrayImage;
use shared::{AppError, Result};
use std::time::Instant;
use tracing::{debug, info};

/// Decoded QR payload and the cascade level that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrScanResult {
    pub content: String,
    /// 1 = raw grayscale, 2 = equalized + binarized, 3 = rotated
    pub level_used: u8,
}

/// Histogram equalization followed by Otsu's global binarization.
fn preprocess_image(gray: &GrayImage) -> GrayImage {
    let mut processed = gray.clone();

    debug!("🔧 Applying simple histogram equalization");
    imageproc::contrast::equalize_histogram_mut(&mut processed);

    debug!("🔧 Applying Otsu's binarization");
    let threshold = imageproc::contrast::otsu_level(&processed);
    imageproc::contrast::threshold_mut(&mut processed, threshold, imageproc::contrast::ThresholdType::Binary);

    processed
}

/// Try decoding with rqrr library
fn try_decode_with_rqrr(gray_image: &GrayImage) -> anyhow::Result<String> {
    let mut img = rqrr::PreparedImage::prepare(gray_image.clone());
    let grids = img.detect_grids();

    if let Some(grid) = grids.first() {
        let (_, content) = grid.decode()?;
        Ok(content)
    } else {
        Err(anyhow!("No QR grid detected by rqrr"))
    }
}

fn rotate(gray: &GrayImage, angle: u32) -> GrayImage {
    match angle {
        90 => image::imageops::rotate90(gray),
        180 => image::imageops::rotate180(gray),
        _ => image::imageops::rotate270(gray),
    }
}

/// 3-level QR detection cascade
///
/// LEVEL 1: rqrr on the plain grayscale image
/// LEVEL 2: rqrr after equalization + Otsu binarization
/// LEVEL 3: rqrr on the preprocessed image rotated 90°/180°/270°
pub fn decode_qr_cascade(image_bytes: &[u8]) -> Result<QrScanResult> {
    let start_time = Instant::now();

    let img = image::load_from_memory(image_bytes)?;
    let gray = img.to_luma8();
    info!("📊 QR detection on {}x{} image", gray.width(), gray.height());

    let finish = |content: String, level_used: u8| {
        info!("✅ QR decoded at level {} in {}ms", level_used, start_time.elapsed().as_millis());
        QrScanResult { content, level_used }
    };

    match try_decode_with_rqrr(&gray) {
        Ok(content) => return Ok(finish(content, 1)),
        Err(e) => debug!("❌ Level 1 failed: {}", e),
    }

    let processed = preprocess_image(&gray);
    match try_decode_with_rqrr(&processed) {
        Ok(content) => return Ok(finish(content, 2)),
        Err(e) => debug!("❌ Level 2 failed: {}", e),
    }

    for angle in [90u32, 180, 270] {
        debug!("🔄 Trying {}° rotation", angle);
        if let Ok(content) = try_decode_with_rqrr(&rotate(&processed, angle)) {
            debug!("✅ Rotation {}° matched", angle);
            return Ok(finish(content, 3));
        }
    }

    info!("❌ No QR found after {}ms", start_time.elapsed().as_millis());
    Err(AppError::QrNotFound)
}
