//! Error types for the hiit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hiit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Requested workout is not in the catalog
    #[error("Unknown workout: {0}")]
    UnknownWorkout(String),

    /// The persistence gateway rejected or failed to store a result
    #[error("Failed to save session result: {0}")]
    Persistence(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
