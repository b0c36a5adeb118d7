//! Error types for scene assembly.

use hamlet_resources::ResourceError;
use hamlet_rhi::RhiError;
use thiserror::Error;

use crate::transform::TransformId;

/// Error type for scene operations.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Creating a shader, shape or texture failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The device rejected a call.
    #[error(transparent)]
    Rhi(#[from] RhiError),

    #[error("Unknown shader: {0:?}")]
    UnknownShader(hamlet_resources::ShaderId),

    #[error("Unknown material: {0:?}")]
    UnknownMaterial(hamlet_resources::MaterialId),

    #[error("Unknown shape: {0:?}")]
    UnknownShape(hamlet_resources::ShapeId),

    #[error("Unknown transform: {0:?}")]
    UnknownTransform(TransformId),

    /// Parenting would make a transform its own ancestor.
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    TransformCycle {
        child: TransformId,
        parent: TransformId,
    },
}

/// Result type alias for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
