use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error types for pdbscraper.
#[derive(Error, Debug)]
pub enum AppError {
    /// The config file given on the command line does not exist.
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The config file exists but cannot be used.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// A selector matched nothing in the rendered document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A record container is missing a required sub-element.
    #[error("Extraction error ({field}): {message}")]
    ExtractionError { field: &'static str, message: String },

    /// Navigating to a page failed.
    #[error("Navigation error: {0}")]
    NavigationError(String),

    /// Browser launch or protocol failure outside navigation.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// The output file could not be written.
    #[error("Cannot write output file {}: {message}", .path.display())]
    WriteError { path: PathBuf, message: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if the run recovers from this error locally
    /// (a warning is emitted and processing continues).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::ConfigNotFound(_) | AppError::ElementNotFound(_) | AppError::WriteError { .. }
        )
    }

    /// Returns true if the error means a selector matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::ElementNotFound(_))
    }
}
