use serde::{Deserialize, Serialize};

/// Barcode symbologies a detector can report. Only QR is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Qr,
    Ean13,
    Code128,
    Other,
}

/// One detection event from the camera layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeEvent {
    pub symbology: Symbology,
    pub data: String,
}

impl BarcodeEvent {
    pub fn qr(data: impl Into<String>) -> Self {
        Self {
            symbology: Symbology::Qr,
            data: data.into(),
        }
    }
}

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    /// Not answered yet; the screen waits.
    #[default]
    Undetermined,
    Denied,
    Granted,
}
