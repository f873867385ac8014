//! Error types for tvr-lpr

use thiserror::Error;

/// Result type for recognition operations
pub type Result<T> = std::result::Result<T, LprError>;

/// Recognition pipeline errors
#[derive(Debug, Error)]
pub enum LprError {
    /// Image could not be read or decoded
    #[error("Image error: {0}")]
    Image(String),

    /// Object detector failure (model load or inference)
    #[error("Detection error: {0}")]
    Detection(String),

    /// OCR service failure
    #[error("OCR error: {0}")]
    Ocr(String),

    /// OCR service returned an API-level error
    #[error("OCR API error {0}: {1}")]
    OcrApi(u16, String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for LprError {
    fn from(err: image::ImageError) -> Self {
        LprError::Image(err.to_string())
    }
}
