//! Error types for the rcard-core library.
//!
//! Field extraction itself never fails; these errors belong to the
//! collaborators around it. OCR failures are an outcome of reading a card
//! rather than an error of the library, so they stay an [`OcrError`] and are
//! folded into the extraction result by the parser.

use thiserror::Error;

/// Main error type for the rcard library.
#[derive(Error, Debug)]
pub enum CardError {
    /// Image enhancement error.
    #[error("preprocessing error: {0}")]
    Preprocess(#[from] PreprocessError),

    /// Image decoding/encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors reported by an OCR provider.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No API key in the config or the configured environment variable.
    #[error("missing API key (set {0} or ocr.api_key)")]
    MissingApiKey(String),

    /// The HTTP request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with an error message.
    #[error("provider error: {0}")]
    Api(String),

    /// The provider answered with something we could not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors related to image enhancement.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// The input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The enhanced image could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Invalid enhancement parameters.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Result type for the rcard library.
pub type Result<T> = std::result::Result<T, CardError>;
