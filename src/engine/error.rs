use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThumbnailError>;

/// Failures while setting up or driving the composer
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No usable font found (tried: {0})")]
    FontUnavailable(String),

    #[error("Invalid font file: {0}")]
    InvalidFont(String),

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
}

/// Failures while turning an image source into a bitmap.
///
/// The pipeline never surfaces these to its caller; a failed load
/// degrades to the text-only composition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("I/O error while reading image: {0}")]
    Io(#[from] io::Error),

    #[error("Could not decode image {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("Malformed data URL: {0}")]
    InvalidDataUrl(String),
}

/// Reasons an export artifact could not be produced
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Complete required fields to export (author: {author_missing}, reference: {reference_missing})")]
    MissingRequiredFields {
        author_missing: bool,
        reference_missing: bool,
    },

    #[error("No preview has been rendered yet")]
    NothingRendered,

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error while writing export: {0}")]
    Io(#[from] io::Error),
}
