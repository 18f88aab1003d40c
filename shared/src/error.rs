//! Error handling shared by the scanner crates

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, AppError>;

/// Structured form of an error, used for log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub user_message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No QR code found in image")]
    QrNotFound,

    #[error("{service} is unreachable")]
    ServiceUnavailable { service: String },

    #[error("{service} failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::QrNotFound => "QR_NOT_FOUND",
            AppError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            AppError::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            AppError::Configuration { .. } => "CONFIG_ERROR",
            AppError::Timeout { .. } => "TIMEOUT",
            AppError::Image(_) => "IMAGE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Generic(_) => "GENERIC_ERROR",
        }
    }

    /// One-line message shown to the user in a non-blocking notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::PermissionDenied => "Sin acceso a la cámara",
            AppError::QrNotFound => "No se encontró ningún código QR en la imagen",
            AppError::Image(_) | AppError::Io(_) => "No se pudo leer la imagen",
            AppError::Timeout { .. } => {
                "El servicio de facturas no respondió a tiempo. Ingresa los datos manualmente."
            }
            AppError::ServiceUnavailable { .. } | AppError::ExternalService { .. } => {
                "No se pudo obtener la información de la factura. Ingresa los datos manualmente."
            }
            AppError::Validation { .. } => "Datos de entrada inválidos",
            AppError::Configuration { .. } | AppError::Generic(_) => "Ocurrió un error inesperado",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            user_message: self.user_message().to_string(),
        }
    }
}
