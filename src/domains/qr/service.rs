use anyhow::anyhow;
use shared::{AppError, Result};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::models::scan::BarcodeEvent;
use crate::processing::qr_detection::{decode_qr_cascade, QrScanResult};

/// Turns still images into detector events, standing in for the live camera
/// feed.
#[derive(Clone, Default)]
pub struct QrService {}

impl QrService {
    pub fn new() -> Self {
        info!("🚀 Initializing QR service (rqrr cascade)");
        Self {}
    }

    /// Decode the first QR code in an encoded image (PNG/JPEG).
    #[instrument(skip(self, image_bytes), fields(image_size = image_bytes.len()))]
    pub async fn decode_image_bytes(&self, image_bytes: Vec<u8>) -> Result<QrScanResult> {
        tokio::task::spawn_blocking(move || decode_qr_cascade(&image_bytes))
            .await
            .map_err(|e| AppError::Generic(anyhow!("QR decoding task failed: {}", e)))?
    }

    /// Read an image from disk and report what the detector saw.
    pub async fn scan_file(&self, path: impl AsRef<Path>) -> Result<BarcodeEvent> {
        let path = path.as_ref();
        info!("📷 Scanning image {}", path.display());

        let bytes = tokio::fs::read(path).await?;
        match self.decode_image_bytes(bytes).await {
            Ok(result) => {
                info!("🔍 QR leído de {} (nivel {})", path.display(), result.level_used);
                Ok(BarcodeEvent::qr(result.content))
            }
            Err(e) => {
                warn!("❌ QR detection failed for {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}
