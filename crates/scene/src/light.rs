//! Scene lighting.

use glam::Vec3;
use hamlet_resources::{Shader, ShaderFeatures};
use hamlet_rhi::{GpuDevice, UniformValue};

pub const AMBIENT_COLOR_UNIFORM: &str = "u_ambientLightColor";
pub const LIGHT_DIR_UNIFORM: &str = "u_lightDir";
pub const LIGHT_COLOR_UNIFORM: &str = "u_lightColor";

/// A directional light (sun-like).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light comes from, not necessarily normalized.
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::X,
            color: Vec3::ONE,
        }
    }
}

/// The scene-wide light: one ambient term plus one directional light.
///
/// Values are pushed to the bound shader only when the shader switched or
/// the light changed since its last upload.
#[derive(Clone, Debug)]
pub struct Light {
    ambient: Vec3,
    directional: DirectionalLight,
    dirty: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.5),
            directional: DirectionalLight::default(),
            dirty: true,
        }
    }
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn directional(&self) -> DirectionalLight {
        self.directional
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_ambient(&mut self, color: Vec3) -> &mut Self {
        self.ambient = color;
        self.dirty = true;
        self
    }

    pub fn set_direction(&mut self, direction: Vec3) -> &mut Self {
        self.directional.direction = direction;
        self.dirty = true;
        self
    }

    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.directional.color = color;
        self.dirty = true;
        self
    }

    /// Uploads the light terms `shader` wants, if anything needs pushing.
    pub fn pre_draw<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        shader: &mut Shader,
        switched_shader: bool,
    ) {
        if !(switched_shader || self.dirty) {
            return;
        }
        if shader.wants(ShaderFeatures::AMBIENT_LIGHT) {
            shader.set_uniform(device, AMBIENT_COLOR_UNIFORM, UniformValue::Vec3(self.ambient));
        }
        if shader.wants(ShaderFeatures::DIFFUSE_LIGHT) {
            shader.set_uniform(
                device,
                LIGHT_DIR_UNIFORM,
                UniformValue::Vec3(self.directional.direction),
            );
            shader.set_uniform(
                device,
                LIGHT_COLOR_UNIFORM,
                UniformValue::Vec3(self.directional.color),
            );
        }
        self.dirty = false;
    }
}
