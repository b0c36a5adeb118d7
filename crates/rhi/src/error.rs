//! RHI-specific error types.

use thiserror::Error;

/// RHI-specific error type.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Shader stage failed to compile
    #[error("Shader compile error ({stage}): {message}")]
    ShaderCompile {
        /// Stage that failed ("vertex" or "fragment").
        stage: &'static str,
        /// Compiler message.
        message: String,
    },

    /// Program failed to link
    #[error("Program link error: {0}")]
    ProgramLink(String),

    /// Buffer creation error
    #[error("Buffer error: {0}")]
    Buffer(String),

    /// Texture creation error
    #[error("Texture error: {0}")]
    Texture(String),

    /// Vertex layout tag not in the supported set
    #[error("Unrecognized vertex layout '{0}'")]
    UnknownVertexLayout(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;
