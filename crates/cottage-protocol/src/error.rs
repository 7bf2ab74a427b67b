//! Error types for the inspection pipeline.

use thiserror::Error;

/// Errors raised between receiving an image and producing a label.
///
/// Every variant renders to the message the client sees in the
/// `{"error": ...}` payload of `/predict`.
#[derive(Debug, Error)]
pub enum InspectionError {
    #[error("No image provided")]
    NoImage,
    #[error("could not read upload: {0}")]
    Upload(String),
    #[error("invalid image data url: {0}")]
    InvalidDataUrl(String),
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unknown class label: {0}")]
    UnknownLabel(String),
}

/// Convenience result type for inspection operations.
pub type CottageResult<T> = Result<T, InspectionError>;
