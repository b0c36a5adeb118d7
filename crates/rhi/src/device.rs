//! The GPU capability injected into the scene graph.
//!
//! [`GpuDevice`] is the whole surface the upper layers use: compile and bind
//! programs, look up uniform and attribute slots, upload vertex data, set
//! uniforms, attach textures to units and issue non-indexed draw calls.
//!
//! # Example
//!
//! ```
//! use hamlet_rhi::{GpuDevice, HeadlessDevice, PrimitiveTopology, UniformValue};
//!
//! # fn example() -> hamlet_rhi::RhiResult<()> {
//! let mut device = HeadlessDevice::new();
//! let program = device.create_program(
//!     "uniform mat4 u_transform; attribute vec4 a_pos; void main() {}",
//!     "uniform vec3 u_color; void main() {}",
//! )?;
//! device.use_program(program);
//!
//! let location = device.uniform_location(program, "u_color").unwrap();
//! device.set_uniform(location, UniformValue::Vec3(glam::Vec3::ONE));
//!
//! let buffer = device.create_vertex_buffer(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0])?;
//! device.bind_vertex_buffer(buffer);
//! device.draw_arrays(PrimitiveTopology::Triangles, 0, 3);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::RhiResult;

/// Linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Vertex buffer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Texture object bound to a texture unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Uniform slot within one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Vertex attribute slot within one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

/// How vertices are assembled into primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    Points,
    /// Each pair of vertices is a line.
    Lines,
    /// Connected line segments.
    LineStrip,
    /// Connected line segments, closed.
    LineLoop,
    /// Each three vertices form a triangle.
    #[default]
    Triangles,
    /// Each vertex after the second forms a triangle with the previous two.
    TriangleStrip,
    /// Triangles sharing the first vertex.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Returns a human-readable name for the topology.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveTopology::Points => "points",
            PrimitiveTopology::Lines => "lines",
            PrimitiveTopology::LineStrip => "line strip",
            PrimitiveTopology::LineLoop => "line loop",
            PrimitiveTopology::Triangles => "triangles",
            PrimitiveTopology::TriangleStrip => "triangle strip",
            PrimitiveTopology::TriangleFan => "triangle fan",
        }
    }
}

impl fmt::Display for PrimitiveTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A value that can be written to a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// GLSL type name of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

/// Decoded RGBA8 pixel data ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA rows in upload order, bottom row first.
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Expected byte length for the image dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Immediate-mode GPU entry points consumed by the scene graph.
///
/// Implementations own all backend state. Calls are made from a single thread
/// in frame order; there is no synchronization contract beyond that.
pub trait GpuDevice {
    /// Compiles both stages and links them into a program.
    fn create_program(&mut self, vertex_src: &str, fragment_src: &str)
    -> RhiResult<ProgramHandle>;

    /// Makes `program` the target of subsequent uniform and attribute calls.
    fn use_program(&mut self, program: ProgramHandle);

    /// Looks up a uniform slot. `None` if the program has no active uniform `name`.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Looks up an attribute slot. `None` if the program has no active attribute `name`.
    fn attrib_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    /// Uploads interleaved `f32` vertex data into a new static buffer.
    fn create_vertex_buffer(&mut self, data: &[f32]) -> RhiResult<BufferHandle>;

    /// Binds `buffer` as the source for subsequent attribute pointers.
    fn bind_vertex_buffer(&mut self, buffer: BufferHandle);

    /// Points an attribute at the bound buffer and enables it.
    ///
    /// `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: u32,
        stride: u32,
        offset: u32,
    );

    /// Writes a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Creates a texture from `image` and binds it to texture unit `unit`.
    fn create_texture(&mut self, unit: u32, image: &TextureImage) -> RhiResult<TextureHandle>;

    /// Draws `count` vertices starting at `first` from the bound attributes.
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32);
}

impl<D: GpuDevice + ?Sized> GpuDevice for Box<D> {
    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> RhiResult<ProgramHandle> {
        (**self).create_program(vertex_src, fragment_src)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        (**self).use_program(program)
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn attrib_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        (**self).attrib_location(program, name)
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> RhiResult<BufferHandle> {
        (**self).create_vertex_buffer(data)
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) {
        (**self).bind_vertex_buffer(buffer)
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: u32,
        stride: u32,
        offset: u32,
    ) {
        (**self).vertex_attrib_pointer(location, components, stride, offset)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        (**self).set_uniform(location, value)
    }

    fn create_texture(&mut self, unit: u32, image: &TextureImage) -> RhiResult<TextureHandle> {
        (**self).create_texture(unit, image)
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        (**self).draw_arrays(topology, first, count)
    }
}
