//! Error types for carousel generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, merging or splitting decks.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not a presentation package we can handle.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The presentation package is structurally broken.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// A part the package must contain is missing.
    #[error("Missing part in package: {0}")]
    MissingPart(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Invalid hex color string.
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A template could not be filled or merged.
    #[error("Template error: {0}")]
    TemplateError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}
