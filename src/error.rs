// Error types module

use std::path::PathBuf;
use thiserror::Error;

/// Centralized error type for QR generation and compositing
///
/// Three categories matter to callers: invalid input (the request itself is
/// wrong), a missing local resource, and everything else, which is an
/// unexpected failure whose details stay server-side.
#[derive(Debug, Error)]
pub enum QrBuilderError {
    /// Request rejected by validation (empty data, out-of-range size, etc.)
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced local file (background, logo, picture) does not exist
    #[error("File not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// The QR codec failed for a reason other than the input
    #[error("QR encoding failed: {0}")]
    Codec(String),

    /// Decoding, resampling or encoding an image failed
    #[error("Image processing failed: {0}")]
    Image(String),

    /// Writing the batch archive failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else (external command failure, task panic, ...)
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, QrBuilderError>;

impl QrBuilderError {
    /// Maps errors to HTTP status codes
    ///
    /// - InvalidInput → 400 (Bad Request)
    /// - ResourceNotFound → 404 (Not Found)
    /// - everything else → 500 (Internal Server Error)
    pub fn to_http_status(&self) -> u16 {
        match self {
            QrBuilderError::InvalidInput(_) => 400,
            QrBuilderError::ResourceNotFound(_) => 404,
            QrBuilderError::Codec(_)
            | QrBuilderError::Image(_)
            | QrBuilderError::Archive(_)
            | QrBuilderError::Config(_)
            | QrBuilderError::Io(_)
            | QrBuilderError::Internal(_) => 500,
        }
    }

    /// Whether the caller caused the error and may see its message
    pub fn is_client_error(&self) -> bool {
        self.to_http_status() < 500
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        QrBuilderError::InvalidInput(message.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        QrBuilderError::ResourceNotFound(path.into())
    }

    pub fn image(message: impl ToString) -> Self {
        QrBuilderError::Image(message.to_string())
    }

    pub fn internal(message: impl ToString) -> Self {
        QrBuilderError::Internal(message.to_string())
    }
}

impl From<zip::result::ZipError> for QrBuilderError {
    fn from(err: zip::result::ZipError) -> Self {
        QrBuilderError::Archive(err.to_string())
    }
}
