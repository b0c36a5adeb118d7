//! Shader program management.
//!
//! A [`Shader`] wraps one linked program together with lazily populated
//! uniform and attribute location caches and a [`ShaderFeatures`] set that
//! says which inputs the program actually consumes.
//!
//! # Example
//!
//! ```
//! use hamlet_resources::{BindState, Shader, ShaderFeatures, ShaderId};
//! use hamlet_rhi::HeadlessDevice;
//!
//! # fn example() -> hamlet_resources::ResourceResult<()> {
//! let mut device = HeadlessDevice::new();
//! let mut shader = Shader::new(
//!     &mut device,
//!     ShaderId(0),
//!     "uniform mat4 u_transform; attribute vec4 a_pos; void main() {}",
//!     "uniform vec3 u_color; void main() {}",
//! )?;
//! shader.set_features(ShaderFeatures::empty());
//!
//! let mut state = BindState::new();
//! assert!(shader.pre_draw(&mut device, &mut state));
//! assert!(!shader.pre_draw(&mut device, &mut state));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use bitflags::bitflags;
use hamlet_rhi::{AttribLocation, GpuDevice, ProgramHandle, UniformLocation, UniformValue};
use tracing::{debug, error, warn};

use crate::bind_state::BindState;
use crate::error::ResourceResult;
use crate::handle::ShaderId;

bitflags! {
    /// Vertex and uniform data a program consumes.
    ///
    /// Shapes only bind the optional attributes a shader wants, and the scene
    /// light only uploads the light terms it wants.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShaderFeatures: u8 {
        /// Reads `a_normal` and `u_normTransform`.
        const NORMALS = 1 << 0;
        /// Reads `u_lightDir` and `u_lightColor`.
        const DIFFUSE_LIGHT = 1 << 1;
        /// Reads `u_ambientLightColor`.
        const AMBIENT_LIGHT = 1 << 2;
        /// Reads `a_uv`.
        const UV1 = 1 << 3;
        /// Reads `a_uv2`.
        const UV2 = 1 << 4;
    }
}

impl Default for ShaderFeatures {
    /// Lit, textured with one UV set.
    fn default() -> Self {
        Self::NORMALS | Self::DIFFUSE_LIGHT | Self::AMBIENT_LIGHT | Self::UV1
    }
}

/// One linked program plus cached input locations.
#[derive(Debug)]
pub struct Shader {
    id: ShaderId,
    program: ProgramHandle,
    /// Lookup results by name. Misses are cached as `None` so each warns once.
    uniforms: HashMap<String, Option<UniformLocation>>,
    attributes: HashMap<String, Option<AttribLocation>>,
    features: ShaderFeatures,
}

impl Shader {
    /// Compiles and links a program from vertex and fragment source.
    ///
    /// # Errors
    ///
    /// Returns the device error if either stage fails to compile or the
    /// program fails to link. The scene cannot draw with this shader, so
    /// callers should abort setup.
    pub fn new<D: GpuDevice + ?Sized>(
        device: &mut D,
        id: ShaderId,
        vertex_src: &str,
        fragment_src: &str,
    ) -> ResourceResult<Self> {
        let program = device
            .create_program(vertex_src, fragment_src)
            .inspect_err(|e| error!("Shader {:?} failed to build: {}", id, e))?;

        debug!("Created shader {:?} with program {:?}", id, program);

        Ok(Self {
            id,
            program,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            features: ShaderFeatures::default(),
        })
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn features(&self) -> ShaderFeatures {
        self.features
    }

    /// Declares which inputs the program consumes.
    pub fn set_features(&mut self, features: ShaderFeatures) -> &mut Self {
        self.features = features;
        self
    }

    /// True if every flag in `features` is set.
    #[inline]
    pub fn wants(&self, features: ShaderFeatures) -> bool {
        self.features.contains(features)
    }

    /// Cached lookup of a uniform slot.
    ///
    /// A missing uniform logs a warning the first time and returns `None`;
    /// writes to it are skipped.
    pub fn uniform<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        name: &str,
    ) -> Option<UniformLocation> {
        if let Some(location) = self.uniforms.get(name) {
            return *location;
        }
        let location = device.uniform_location(self.program, name);
        if location.is_none() {
            warn!("Shader {:?}: failed to get location for uniform {}", self.id, name);
        }
        self.uniforms.insert(name.to_string(), location);
        location
    }

    /// Cached lookup of an attribute slot.
    ///
    /// A missing attribute logs a warning the first time and returns `None`.
    pub fn attribute<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        name: &str,
    ) -> Option<AttribLocation> {
        if let Some(location) = self.attributes.get(name) {
            return *location;
        }
        let location = device.attrib_location(self.program, name);
        if location.is_none() {
            warn!("Shader {:?}: failed to get location for attribute {}", self.id, name);
        }
        self.attributes.insert(name.to_string(), location);
        location
    }

    /// Binds the program if another shader was bound last.
    ///
    /// Returns true when the program changed, meaning material and shape
    /// state must be pushed again.
    pub fn pre_draw<D: GpuDevice + ?Sized>(&self, device: &mut D, state: &mut BindState) -> bool {
        if state.last_shader == Some(self.id) {
            return false;
        }
        device.use_program(self.program);
        state.last_shader = Some(self.id);
        true
    }

    /// Writes a uniform of this program. The program must be bound.
    pub fn set_uniform<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        name: &str,
        value: UniformValue,
    ) {
        if let Some(location) = self.uniform(device, name) {
            device.set_uniform(location, value);
        }
    }

    /// Points attribute `name` into the bound vertex buffer.
    ///
    /// `stride` and `offset` are in bytes.
    pub fn set_attribute<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        name: &str,
        components: u32,
        stride: u32,
        offset: u32,
    ) {
        if let Some(location) = self.attribute(device, name) {
            device.vertex_attrib_pointer(location, components, stride, offset);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::Vec3;
    use hamlet_rhi::HeadlessDevice;

    pub(crate) const LIT_VERT: &str = "
        uniform mat4 u_transform;
        uniform mat4 u_normTransform;
        uniform vec3 u_color;
        uniform float u_uvWeight;
        uniform vec3 u_lightDir;
        uniform vec3 u_lightColor;
        uniform vec3 u_ambientLightColor;
        attribute vec4 a_pos;
        attribute vec4 a_normal;
        attribute vec2 a_uv;
        attribute vec2 a_uv2;
        void main() {}
    ";
    pub(crate) const LIT_FRAG: &str = "
        precision mediump float;
        uniform sampler2D u_texture;
        void main() {}
    ";
    pub(crate) const FLAT_VERT: &str = "
        uniform mat4 u_transform;
        attribute vec4 a_pos;
        void main() {}
    ";
    pub(crate) const FLAT_FRAG: &str = "
        precision mediump float;
        uniform vec3 u_color;
        void main() {}
    ";

    #[test]
    fn test_pre_draw_switches_once() {
        let mut device = HeadlessDevice::new();
        let a = Shader::new(&mut device, ShaderId(0), LIT_VERT, LIT_FRAG).unwrap();
        let b = Shader::new(&mut device, ShaderId(1), FLAT_VERT, FLAT_FRAG).unwrap();
        let mut state = BindState::new();

        assert!(a.pre_draw(&mut device, &mut state));
        assert!(!a.pre_draw(&mut device, &mut state));
        assert!(!a.pre_draw(&mut device, &mut state));
        assert!(b.pre_draw(&mut device, &mut state));
        assert!(a.pre_draw(&mut device, &mut state));
        assert_eq!(device.program_switches(), 3);
    }

    #[test]
    fn test_reset_state_forces_rebind() {
        let mut device = HeadlessDevice::new();
        let shader = Shader::new(&mut device, ShaderId(0), FLAT_VERT, FLAT_FRAG).unwrap();
        let mut state = BindState::new();

        assert!(shader.pre_draw(&mut device, &mut state));
        state.reset();
        assert!(shader.pre_draw(&mut device, &mut state));
    }

    #[test]
    fn test_compile_failure_is_error() {
        let mut device = HeadlessDevice::new();
        let result = Shader::new(&mut device, ShaderId(0), "attribute vec4 a_pos;", FLAT_FRAG);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_uniform_is_skipped() {
        let mut device = HeadlessDevice::new();
        let mut shader = Shader::new(&mut device, ShaderId(0), FLAT_VERT, FLAT_FRAG).unwrap();
        let mut state = BindState::new();
        shader.pre_draw(&mut device, &mut state);

        assert!(shader.uniform(&mut device, "u_lightDir").is_none());
        shader.set_uniform(&mut device, "u_lightDir", UniformValue::Vec3(Vec3::X));
        shader.set_uniform(&mut device, "u_color", UniformValue::Vec3(Vec3::Y));

        assert!(device.uniform_writes("u_lightDir").is_empty());
        assert_eq!(
            device.last_uniform("u_color"),
            Some(UniformValue::Vec3(Vec3::Y))
        );
    }

    #[test]
    fn test_locations_are_cached() {
        let mut device = HeadlessDevice::new();
        let mut shader = Shader::new(&mut device, ShaderId(0), LIT_VERT, LIT_FRAG).unwrap();

        let first = shader.attribute(&mut device, "a_uv2");
        let second = shader.attribute(&mut device, "a_uv2");
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(shader.attribute(&mut device, "a_tangent"), None);
    }

    #[test]
    fn test_default_features() {
        let features = ShaderFeatures::default();
        assert!(features.contains(ShaderFeatures::NORMALS | ShaderFeatures::UV1));
        assert!(!features.contains(ShaderFeatures::UV2));
    }
}
