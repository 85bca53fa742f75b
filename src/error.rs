//! Error kinds for the cover normalization pipeline
//!
//! The HTTP boundary collapses every variant into one generic failure
//! payload; inside the crate callers and tests branch on the variant.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NormalizeError>;

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// URL unreachable, timed out, or answered with a non-success status
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    /// Bytes are not valid base64 or not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Artifact write or public URL retrieval failed
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to update record image: {0}")]
    RecordUpdate(String),

    /// The blocking worker running decode/compress panicked or was cancelled
    #[error("Image worker failed: {0}")]
    Worker(String),
}

impl NormalizeError {
    /// Stable code for logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::Fetch(_) => "FETCH_FAILED",
            NormalizeError::Decode(_) => "DECODE_FAILED",
            NormalizeError::InputTooLarge { .. } => "INPUT_TOO_LARGE",
            NormalizeError::Encode(_) => "ENCODE_FAILED",
            NormalizeError::Storage(_) => "STORAGE_FAILED",
            NormalizeError::RecordUpdate(_) => "RECORD_UPDATE_FAILED",
            NormalizeError::Worker(_) => "WORKER_FAILED",
        }
    }
}

impl From<image::ImageError> for NormalizeError {
    fn from(e: image::ImageError) -> Self {
        NormalizeError::Decode(e.to_string())
    }
}

impl From<tokio::task::JoinError> for NormalizeError {
    fn from(e: tokio::task::JoinError) -> Self {
        NormalizeError::Worker(e.to_string())
    }
}
