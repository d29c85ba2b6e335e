//! Error taxonomy shared by every operation.
//!
//! Each variant carries a stable numeric code (see [`ImageError::code`]) so
//! callers can branch on the failure kind without matching on message text.
//! Failures abort the current chain immediately; nothing here is retried.

use crate::config::ConfigError;
use thiserror::Error;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Unable to load font file: {0}")]
    FontFile(String),
    #[error("TrueType support is not enabled in this build")]
    FreetypeNotEnabled,
    #[error("Required imaging library is not loaded: {0}")]
    LibNotLoaded(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("WEBP support is not enabled in this build")]
    WebpNotEnabled,
    #[error("Failed to write image to file: {0}")]
    Write(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ImageError {
    /// Stable code for programmatic handling. `Io` and `Config` report 0;
    /// code 4 is unused.
    pub fn code(&self) -> u32 {
        match self {
            Self::FileNotFound(_) => 1,
            Self::FontFile(_) => 2,
            Self::FreetypeNotEnabled => 3,
            Self::InvalidColor(_) => 5,
            Self::InvalidDataUri(_) => 6,
            Self::InvalidImage(_) => 7,
            Self::LibNotLoaded(_) => 8,
            Self::UnsupportedFormat(_) => 9,
            Self::WebpNotEnabled => 10,
            Self::Write(_) => 11,
            Self::InvalidCoordinate(_) => 12,
            Self::Io(_) | Self::Config(_) => 0,
        }
    }
}
