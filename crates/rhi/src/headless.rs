//! Headless recording device.
//!
//! [`HeadlessDevice`] implements [`GpuDevice`] without a GPU. It validates
//! what a real driver would reject (missing entry points, empty buffers,
//! malformed images, out-of-range texture units), resolves uniform and
//! attribute slots from the GLSL declarations in the program source, and
//! records every state change and draw as a [`GpuCommand`].
//!
//! Tests read the command log to assert on exactly what reached the GPU;
//! the demo binary uses it to run frames offline.

use tracing::{debug, warn};

use crate::device::{
    AttribLocation, BufferHandle, GpuDevice, PrimitiveTopology, ProgramHandle, TextureHandle,
    TextureImage, UniformLocation, UniformValue,
};
use crate::error::{RhiError, RhiResult};

/// Number of texture units exposed by default.
pub const DEFAULT_TEXTURE_UNITS: u32 = 16;

/// One recorded device call.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
    UseProgram(ProgramHandle),
    BindVertexBuffer(BufferHandle),
    VertexAttribPointer {
        program: ProgramHandle,
        name: String,
        components: u32,
        stride: u32,
        offset: u32,
    },
    SetUniform {
        program: ProgramHandle,
        name: String,
        value: UniformValue,
    },
    CreateTexture {
        unit: u32,
        texture: TextureHandle,
    },
    DrawArrays {
        program: Option<ProgramHandle>,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    },
}

/// Active inputs of one linked program.
#[derive(Debug, Default)]
struct ProgramInfo {
    uniforms: Vec<String>,
    attributes: Vec<String>,
}

/// A [`GpuDevice`] that records instead of rendering.
#[derive(Debug)]
pub struct HeadlessDevice {
    programs: Vec<ProgramInfo>,
    /// Float count of each buffer.
    buffers: Vec<usize>,
    textures: u32,
    texture_units: u32,
    current_program: Option<ProgramHandle>,
    bound_buffer: Option<BufferHandle>,
    commands: Vec<GpuCommand>,
}

impl HeadlessDevice {
    /// Creates a device with [`DEFAULT_TEXTURE_UNITS`] texture units.
    pub fn new() -> Self {
        Self::with_texture_units(DEFAULT_TEXTURE_UNITS)
    }

    /// Creates a device exposing `texture_units` texture units.
    pub fn with_texture_units(texture_units: u32) -> Self {
        Self {
            programs: Vec::new(),
            buffers: Vec::new(),
            textures: 0,
            texture_units,
            current_program: None,
            bound_buffer: None,
            commands: Vec::new(),
        }
    }

    /// Every command recorded since creation or the last [`clear`](Self::clear).
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Drains the command log.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Empties the command log. Device objects are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded draw calls as `(topology, first, count)`.
    pub fn draw_calls(&self) -> Vec<(PrimitiveTopology, u32, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::DrawArrays {
                    topology,
                    first,
                    count,
                    ..
                } => Some((*topology, *first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Every value written to uniforms called `name`, in order.
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// The most recent value written to a uniform called `name`.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniform_writes(name).pop()
    }

    /// Number of uniform writes of any name.
    pub fn uniform_write_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::SetUniform { .. }))
            .count()
    }

    /// Number of recorded program binds.
    pub fn program_switches(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::UseProgram(_)))
            .count()
    }

    /// Names of the attributes pointed at, in order.
    pub fn attribute_bindings(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::VertexAttribPointer { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of programs linked so far.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn program(&self, program: ProgramHandle) -> Option<&ProgramInfo> {
        self.programs.get(program.0 as usize)
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuDevice for HeadlessDevice {
    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> RhiResult<ProgramHandle> {
        check_stage("vertex", vertex_src)?;
        check_stage("fragment", fragment_src)?;

        let mut uniforms = declared_names(vertex_src, "uniform");
        for name in declared_names(fragment_src, "uniform") {
            if !uniforms.contains(&name) {
                uniforms.push(name);
            }
        }
        let attributes = declared_names(vertex_src, "attribute");
        if attributes.is_empty() {
            return Err(RhiError::ProgramLink(
                "vertex stage declares no attributes".to_string(),
            ));
        }

        let handle = ProgramHandle(self.programs.len() as u32);
        debug!(
            "Linked program {:?}: {} uniforms, {} attributes",
            handle,
            uniforms.len(),
            attributes.len()
        );
        self.programs.push(ProgramInfo {
            uniforms,
            attributes,
        });
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let info = self.program(program)?;
        info.uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn attrib_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        let info = self.program(program)?;
        info.attributes
            .iter()
            .position(|a| a == name)
            .map(|i| AttribLocation(i as u32))
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> RhiResult<BufferHandle> {
        if data.is_empty() {
            return Err(RhiError::Buffer("vertex data is empty".to_string()));
        }
        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(data.len());
        debug!("Created vertex buffer {:?}: {} floats", handle, data.len());
        Ok(handle)
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.bound_buffer = Some(buffer);
        self.commands.push(GpuCommand::BindVertexBuffer(buffer));
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: u32,
        stride: u32,
        offset: u32,
    ) {
        let Some(program) = self.current_program else {
            warn!("Attribute pointer set with no program in use");
            return;
        };
        if self.bound_buffer.is_none() {
            warn!("Attribute pointer set with no vertex buffer bound");
        }
        let name = self
            .program(program)
            .and_then(|info| info.attributes.get(location.0 as usize))
            .cloned();
        match name {
            Some(name) => self.commands.push(GpuCommand::VertexAttribPointer {
                program,
                name,
                components,
                stride,
                offset,
            }),
            None => warn!("Invalid attribute location {:?} for {:?}", location, program),
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.current_program else {
            warn!("Uniform set with no program in use");
            return;
        };
        let name = self
            .program(program)
            .and_then(|info| info.uniforms.get(location.0 as usize))
            .cloned();
        match name {
            Some(name) => self.commands.push(GpuCommand::SetUniform {
                program,
                name,
                value,
            }),
            None => warn!("Invalid uniform location {:?} for {:?}", location, program),
        }
    }

    fn create_texture(&mut self, unit: u32, image: &TextureImage) -> RhiResult<TextureHandle> {
        if unit >= self.texture_units {
            return Err(RhiError::Texture(format!(
                "texture unit {} out of range (device has {})",
                unit, self.texture_units
            )));
        }
        if image.width == 0 || image.height == 0 || image.pixels.len() != image.expected_len() {
            return Err(RhiError::Texture(format!(
                "malformed {}x{} image with {} bytes",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }
        let texture = TextureHandle(self.textures);
        self.textures += 1;
        self.commands
            .push(GpuCommand::CreateTexture { unit, texture });
        debug!(
            "Created texture {:?} on unit {} ({}x{})",
            texture, unit, image.width, image.height
        );
        Ok(texture)
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        if let Some(buffer) = self.bound_buffer {
            let floats = self.buffers.get(buffer.0 as usize).copied().unwrap_or(0);
            if (first + count) as usize > floats {
                warn!(
                    "Draw of {} vertices exceeds buffer {:?} ({} floats)",
                    count, buffer, floats
                );
            }
        }
        self.commands.push(GpuCommand::DrawArrays {
            program: self.current_program,
            topology,
            first,
            count,
        });
    }
}

/// Rejects a stage with no `main` entry point.
fn check_stage(stage: &'static str, src: &str) -> RhiResult<()> {
    let has_main = strip_comments(src)
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token == "main");
    if has_main {
        Ok(())
    } else {
        Err(RhiError::ShaderCompile {
            stage,
            message: "no entry point 'main'".to_string(),
        })
    }
}

fn strip_comments(src: &str) -> String {
    src.lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Names declared with `qualifier` at global scope, in declaration order.
///
/// Handles precision qualifiers, comma-separated declarators and array suffixes.
fn declared_names(src: &str, qualifier: &str) -> Vec<String> {
    let mut names = Vec::new();
    for statement in strip_comments(src).split(';') {
        let mut tokens = statement.split_whitespace();
        if tokens.next() != Some(qualifier) {
            continue;
        }
        let rest: Vec<&str> = tokens
            .skip_while(|t| matches!(*t, "lowp" | "mediump" | "highp"))
            .skip(1)
            .collect();
        for declarator in rest.join(" ").split(',') {
            let name = declarator.split('[').next().unwrap_or("").trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const VERT: &str = "
        uniform mat4 u_transform;
        uniform highp vec3 u_lightDir, u_lightColor;
        attribute vec4 a_pos;
        attribute vec2 a_uv; // texture coordinates
        void main() { gl_Position = u_transform * a_pos; }
    ";
    const FRAG: &str = "
        precision mediump float;
        uniform vec3 u_color;
        uniform vec3 u_lightDir;
        void main() { gl_FragColor = vec4(u_color, 1.0); }
    ";

    #[test]
    fn test_declared_names() {
        assert_eq!(
            declared_names(VERT, "uniform"),
            vec!["u_transform", "u_lightDir", "u_lightColor"]
        );
        assert_eq!(declared_names(VERT, "attribute"), vec!["a_pos", "a_uv"]);
        assert_eq!(
            declared_names("uniform float u_weights[4];", "uniform"),
            vec!["u_weights"]
        );
    }

    #[test]
    fn test_program_locations_merge_stages() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(VERT, FRAG).unwrap();

        assert!(device.uniform_location(program, "u_color").is_some());
        assert_eq!(
            device.uniform_location(program, "u_lightDir"),
            Some(UniformLocation(1))
        );
        assert!(device.uniform_location(program, "u_missing").is_none());
        assert_eq!(
            device.attrib_location(program, "a_uv"),
            Some(AttribLocation(1))
        );
        assert!(device.attrib_location(program, "a_normal").is_none());
    }

    #[test]
    fn test_missing_main_fails_compile() {
        let mut device = HeadlessDevice::new();
        let err = device
            .create_program(VERT, "uniform vec3 u_color; // main()")
            .unwrap_err();
        assert!(matches!(err, RhiError::ShaderCompile { stage: "fragment", .. }));
        assert_eq!(device.program_count(), 0);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let mut device = HeadlessDevice::new();
        assert!(matches!(
            device.create_vertex_buffer(&[]),
            Err(RhiError::Buffer(_))
        ));
    }

    #[test]
    fn test_texture_unit_range() {
        let mut device = HeadlessDevice::with_texture_units(2);
        let image = TextureImage {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        assert!(device.create_texture(1, &image).is_ok());
        assert!(device.create_texture(2, &image).is_err());

        let short = TextureImage {
            width: 2,
            height: 2,
            pixels: vec![0; 4],
        };
        assert!(device.create_texture(0, &short).is_err());
    }

    #[test]
    fn test_records_uniforms_and_draws() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(VERT, FRAG).unwrap();
        device.use_program(program);

        let color = device.uniform_location(program, "u_color").unwrap();
        device.set_uniform(color, UniformValue::Vec3(Vec3::X));

        let buffer = device.create_vertex_buffer(&[0.0; 12]).unwrap();
        device.bind_vertex_buffer(buffer);
        let pos = device.attrib_location(program, "a_pos").unwrap();
        device.vertex_attrib_pointer(pos, 2, 8, 0);
        device.draw_arrays(PrimitiveTopology::Triangles, 0, 3);

        assert_eq!(device.program_switches(), 1);
        assert_eq!(
            device.last_uniform("u_color"),
            Some(UniformValue::Vec3(Vec3::X))
        );
        assert_eq!(device.attribute_bindings(), vec!["a_pos"]);
        assert_eq!(
            device.draw_calls(),
            vec![(PrimitiveTopology::Triangles, 0, 3)]
        );

        device.clear();
        assert!(device.commands().is_empty());
    }

    #[test]
    fn test_uniform_without_program_is_dropped() {
        let mut device = HeadlessDevice::new();
        device.set_uniform(UniformLocation(0), UniformValue::Float(1.0));
        assert_eq!(device.uniform_write_count(), 0);
    }
}
