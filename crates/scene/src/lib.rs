//! Scene graph and draw submission.
//!
//! This crate provides scene management:
//! - Transform hierarchy in an id-addressed arena
//! - Renderers binding material, shape and transform
//! - Camera with lazy view-projection and the per-renderer draw sequence
//! - Scene-wide ambient and directional light
//! - The [`Scene`] root owning device, resources and draw list

pub mod camera;
mod error;
pub mod light;
pub mod renderer;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use error::{SceneError, SceneResult};
pub use light::{DirectionalLight, Light};
pub use renderer::{DrawContext, Renderer, RendererId};
pub use scene::Scene;
pub use transform::{Transform, TransformId, Transforms, normal_matrix};
