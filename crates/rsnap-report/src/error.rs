//! Error types for snapshot export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that abort an export.
///
/// Per-module and per-chart problems never surface here; they degrade to
/// in-document placeholders instead.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Another export is still running on the same exporter.
    #[error("an export is already in progress")]
    AlreadyRunning,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The artifact could not be handed to its destination.
    #[error("failed to deliver '{file_name}' to {dir}: {source}")]
    DeliveryError {
        file_name: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The view document is unusable.
    #[error("invalid view: {0}")]
    InvalidView(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Preferences could not be loaded.
    #[error(transparent)]
    Preferences(#[from] rsnap_config::PreferenceError),
}

/// Errors converting one live chart into a static image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// The runtime produced no image data.
    #[error("chart '{0}' produced no image data")]
    EmptyImage(String),

    /// The stored image payload is not valid base64.
    #[error("chart '{id}' has an undecodable image payload: {reason}")]
    InvalidPayload { id: String, reason: String },

    /// The runtime refused or failed the conversion.
    #[error("chart runtime error: {0}")]
    Runtime(String),
}
