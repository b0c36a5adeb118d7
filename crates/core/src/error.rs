//! Error types shared across the hamlet crates.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration and file access.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Config error in '{path}': {message}")]
    Config {
        /// File the configuration was read from.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Result type alias using the hamlet Error type.
pub type Result<T> = std::result::Result<T, Error>;
