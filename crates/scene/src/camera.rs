//! Camera and draw submission.
//!
//! The camera owns view and projection matrices and caches their product.
//! [`Camera::draw`] is where a renderer's CPU-side state becomes GPU work:
//! renderer, material and shape binding, light upload, the transform
//! uniforms and finally one draw call.

use glam::{Mat4, Vec3};
use hamlet_resources::ShaderFeatures;
use hamlet_rhi::{GpuDevice, UniformValue};

use crate::error::{SceneError, SceneResult};
use crate::renderer::{DrawContext, Renderer};
use crate::transform::normal_matrix;

/// Model-view-projection matrix.
pub const TRANSFORM_UNIFORM: &str = "u_transform";
/// Inverse-transpose of the model matrix.
pub const NORM_TRANSFORM_UNIFORM: &str = "u_normTransform";

/// A camera for rendering the scene.
///
/// Uses OpenGL conventions: right-handed view space, clip depth in `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            dirty: false,
        }
    }
}

impl Camera {
    /// Create a camera with identity view and projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the camera from `eye` toward `center`.
    pub fn set_look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) -> &mut Self {
        self.view = Mat4::look_at_rh(eye, center, up);
        self.dirty = true;
        self
    }

    /// Sets a perspective projection. `fovy` is the vertical field of view in degrees.
    pub fn set_perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        self.projection = Mat4::perspective_rh_gl(fovy.to_radians(), aspect, near, far);
        self.dirty = true;
        self
    }

    pub fn set_view(&mut self, view: Mat4) -> &mut Self {
        self.view = view;
        self.dirty = true;
        self
    }

    pub fn set_projection(&mut self, projection: Mat4) -> &mut Self {
        self.projection = projection;
        self.dirty = true;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// `projection · view`, recomputed if either changed.
    pub fn view_projection_matrix(&mut self) -> Mat4 {
        self.pre_draw();
        self.view_projection
    }

    /// Refreshes the cached view-projection matrix.
    pub fn pre_draw(&mut self) {
        if self.dirty {
            self.view_projection = self.projection * self.view;
            self.dirty = false;
        }
    }

    /// Draws one renderer, regardless of its enabled flag.
    ///
    /// # Errors
    ///
    /// Fails if the renderer references resources missing from `ctx`.
    pub fn draw<D: GpuDevice + ?Sized>(
        &mut self,
        renderer: &mut Renderer,
        ctx: &mut DrawContext<'_, D>,
    ) -> SceneResult<()> {
        self.pre_draw();
        let switched_shader = renderer.pre_draw(ctx)?;

        let shader_id = ctx.material(renderer.material())?.shader();
        let shape = ctx.shape(renderer.shape())?;
        let (topology, vertex_count) = (shape.topology(), shape.vertex_count());
        let shader = ctx
            .shaders
            .get_mut(shader_id.index())
            .ok_or(SceneError::UnknownShader(shader_id))?;

        ctx.light.pre_draw(ctx.device, shader, switched_shader);

        let model = renderer.model_matrix();
        shader.set_uniform(
            ctx.device,
            TRANSFORM_UNIFORM,
            UniformValue::Mat4(self.view_projection * model),
        );
        if shader.wants(ShaderFeatures::NORMALS) {
            shader.set_uniform(
                ctx.device,
                NORM_TRANSFORM_UNIFORM,
                UniformValue::Mat4(normal_matrix(model)),
            );
        }

        ctx.device.draw_arrays(topology, 0, vertex_count);
        Ok(())
    }

    /// Draws every enabled renderer in order and returns how many were drawn.
    pub fn draw_all<'r, D: GpuDevice + ?Sized>(
        &mut self,
        renderers: impl IntoIterator<Item = &'r mut Renderer>,
        ctx: &mut DrawContext<'_, D>,
    ) -> SceneResult<usize> {
        let mut drawn = 0;
        for renderer in renderers {
            if renderer.enabled {
                self.draw(renderer, ctx)?;
                drawn += 1;
            }
        }
        Ok(drawn)
    }
}
