//! Error types for the meme engine.

use thiserror::Error;

/// Errors that can occur while loading, editing, or rendering a meme.
#[derive(Error, Debug)]
pub enum MemeError {
    /// Image decoding failed (corrupt or unsupported data).
    #[error("failed to load image: {message}")]
    ImageLoad {
        /// Description of the decode failure
        message: String,
    },

    /// Fetching a remote image source failed.
    #[error("failed to fetch image from {url}: {message}")]
    Http {
        /// The URL that was requested
        url: String,
        /// Description of the network failure
        message: String,
    },

    /// A mutation referenced an annotation index that does not exist.
    /// Treated as a programmer error, not a user-facing failure.
    #[error("annotation index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Current annotation count
        len: usize,
    },

    /// No usable font could be loaded, so text cannot be measured.
    #[error("text measurement unavailable: {message}")]
    MeasurementUnavailable {
        /// Why no font was available
        message: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {value:?}")]
    InvalidColor {
        /// The rejected color string
        value: String,
    },

    /// A persisted annotation failed boundary validation.
    #[error("invalid annotation data: {message}")]
    InvalidData {
        /// Description of the validation failure
        message: String,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding error during export
    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MemeError>;
