//! GPU-backed resources shared between renderers.
//!
//! This crate holds the objects a scene binds while drawing:
//! - [`Shader`]: a linked program with cached input locations
//! - [`Material`]: a shader plus its non-transform uniform values
//! - [`Shape`]: a vertex buffer with topology and layout
//! - [`BindState`]: the last-bound identities used to skip redundant state changes
//! - Asynchronous texture loading and a procedural unit cube

mod error;

pub mod bind_state;
pub mod handle;
pub mod material;
pub mod primitives;
pub mod shader;
pub mod shape;
pub mod texture;

pub use bind_state::BindState;
pub use error::{ResourceError, ResourceResult};
pub use handle::{MaterialId, ShaderId, ShapeId};
pub use material::Material;
pub use shader::{Shader, ShaderFeatures};
pub use shape::Shape;
pub use texture::{AsyncTextures, FileImageLoader, ImageLoader, SolidColorLoader};
