//! Render Hardware Interface.
//!
//! This crate defines the small immediate-mode GPU surface the scene graph
//! drives, without tying it to a particular graphics backend:
//! - [`GpuDevice`]: program, buffer, uniform, texture and draw entry points
//! - Opaque handle and location types
//! - [`VertexLayout`]: the closed set of interleaved vertex formats
//! - [`HeadlessDevice`]: a recording implementation for tests and offline runs

mod error;

pub mod device;
pub mod headless;
pub mod vertex;

pub use device::{
    AttribLocation, BufferHandle, GpuDevice, PrimitiveTopology, ProgramHandle, TextureHandle,
    TextureImage, UniformLocation, UniformValue,
};
pub use error::{RhiError, RhiResult};
pub use headless::{GpuCommand, HeadlessDevice};
pub use vertex::{AttributeSemantic, VertexAttribute, VertexLayout};
