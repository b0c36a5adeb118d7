//! Error types for resource creation and loading.

use std::path::PathBuf;

use hamlet_rhi::RhiError;
use thiserror::Error;

/// Error type for resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The device rejected a program, buffer or texture.
    #[error(transparent)]
    Rhi(#[from] RhiError),

    /// Image decoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An asynchronous texture load failed.
    #[error("Failed to load texture '{path}': {message}")]
    TextureLoad {
        /// Path of the image that failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Texture loads did not complete in time.
    #[error("Timed out with {pending} texture(s) still loading")]
    TextureTimeout {
        /// Loads still outstanding.
        pending: usize,
    },
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
