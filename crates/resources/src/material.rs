//! Materials: a shader plus its non-transform uniform values.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3, Vec4};
use hamlet_rhi::{GpuDevice, UniformValue};

use crate::bind_state::BindState;
use crate::handle::{MaterialId, ShaderId};
use crate::shader::Shader;

/// Base color multiplied into lighting.
pub const COLOR_UNIFORM: &str = "u_color";
/// Blend between the first and second UV set.
pub const UV_WEIGHT_UNIFORM: &str = "u_uvWeight";
/// Sampler bound to the material's texture unit.
pub const TEXTURE_UNIFORM: &str = "u_texture";

/// Named uniform values bound to one shader.
///
/// Values are uploaded lazily: [`Material::pre_draw`] only pushes them when the
/// material is dirty or the device may hold another material's values.
#[derive(Clone, Debug)]
pub struct Material {
    id: MaterialId,
    shader: ShaderId,
    floats: BTreeMap<String, f32>,
    vec2s: BTreeMap<String, Vec2>,
    vec3s: BTreeMap<String, Vec3>,
    vec4s: BTreeMap<String, Vec4>,
    texture_unit: Option<u32>,
    dirty: bool,
}

impl Material {
    /// Creates a white material with the first UV set selected.
    pub fn new(id: MaterialId, shader: ShaderId) -> Self {
        let mut material = Self {
            id,
            shader,
            floats: BTreeMap::new(),
            vec2s: BTreeMap::new(),
            vec3s: BTreeMap::new(),
            vec4s: BTreeMap::new(),
            texture_unit: None,
            dirty: true,
        };
        material.set_float(UV_WEIGHT_UNIFORM, 0.0).set_color(Vec3::ONE);
        material
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn texture_unit(&self) -> Option<u32> {
        self.texture_unit
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        self.vec3s.get(name).copied()
    }

    /// Number of stored uniform values, excluding the texture unit.
    pub fn value_count(&self) -> usize {
        self.floats.len() + self.vec2s.len() + self.vec3s.len() + self.vec4s.len()
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.floats.insert(name.to_string(), value);
        self.dirty = true;
        self
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> &mut Self {
        self.vec2s.insert(name.to_string(), value);
        self.dirty = true;
        self
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> &mut Self {
        self.vec3s.insert(name.to_string(), value);
        self.dirty = true;
        self
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> &mut Self {
        self.vec4s.insert(name.to_string(), value);
        self.dirty = true;
        self
    }

    /// Sets the base color (`u_color`).
    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.set_vec3(COLOR_UNIFORM, color)
    }

    /// Samples `u_texture` from `unit`.
    pub fn set_texture_unit(&mut self, unit: u32) -> &mut Self {
        self.texture_unit = Some(unit);
        self.dirty = true;
        self
    }

    /// Stops sampling a texture.
    pub fn clear_texture_unit(&mut self) -> &mut Self {
        self.texture_unit = None;
        self.dirty = true;
        self
    }

    /// Drops every stored value called `name`, whatever its type.
    ///
    /// Use this for shaders that do not declare one of the default uniforms.
    pub fn remove_uniform(&mut self, name: &str) -> &mut Self {
        self.floats.remove(name);
        self.vec2s.remove(name);
        self.vec3s.remove(name);
        self.vec4s.remove(name);
        self.dirty = true;
        self
    }

    /// Binds the shader and pushes stored values when needed.
    ///
    /// Values are uploaded when the shader switched, another material was
    /// used last, or this material changed since its last upload. Returns
    /// whether the shader switched.
    pub fn pre_draw<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        shader: &mut Shader,
        state: &mut BindState,
    ) -> bool {
        debug_assert_eq!(shader.id(), self.shader, "material drawn with foreign shader");

        let switched_shader = shader.pre_draw(device, state);
        let switched_material = state.last_material != Some(self.id);

        if switched_shader || switched_material || self.dirty {
            for (name, value) in &self.floats {
                shader.set_uniform(device, name, UniformValue::Float(*value));
            }
            for (name, value) in &self.vec2s {
                shader.set_uniform(device, name, UniformValue::Vec2(*value));
            }
            for (name, value) in &self.vec3s {
                shader.set_uniform(device, name, UniformValue::Vec3(*value));
            }
            for (name, value) in &self.vec4s {
                shader.set_uniform(device, name, UniformValue::Vec4(*value));
            }
            if let Some(unit) = self.texture_unit {
                shader.set_uniform(device, TEXTURE_UNIFORM, UniformValue::Int(unit as i32));
            }

            self.dirty = false;
            state.last_material = Some(self.id);
        }

        switched_shader
    }
}
