//! Drawable bindings of material, shape and transform.

use glam::Mat4;
use hamlet_resources::{BindState, Material, MaterialId, Shader, Shape, ShapeId};
use hamlet_rhi::GpuDevice;

use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::transform::{TransformId, Transforms};

/// Identity of a [`Renderer`] within its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub u32);

/// Everything a draw pass touches, borrowed from the scene for one frame.
pub struct DrawContext<'a, D: GpuDevice + ?Sized> {
    pub device: &'a mut D,
    pub shaders: &'a mut [Shader],
    pub materials: &'a mut [Material],
    pub shapes: &'a mut [Shape],
    pub transforms: &'a mut Transforms,
    pub light: &'a mut Light,
    pub state: &'a mut BindState,
}

impl<D: GpuDevice + ?Sized> DrawContext<'_, D> {
    pub(crate) fn material(&self, id: MaterialId) -> SceneResult<&Material> {
        self.materials
            .get(id.index())
            .ok_or(SceneError::UnknownMaterial(id))
    }

    pub(crate) fn shape(&self, id: ShapeId) -> SceneResult<&Shape> {
        self.shapes.get(id.index()).ok_or(SceneError::UnknownShape(id))
    }
}

/// One drawable: a material and shape placed by a transform.
///
/// The renderer owns its transform slot; other transforms may use it as a
/// parent.
#[derive(Clone, Debug)]
pub struct Renderer {
    id: RendererId,
    material: MaterialId,
    shape: ShapeId,
    transform: TransformId,
    model_matrix: Mat4,
    /// Disabled renderers stay in the draw list but are skipped.
    pub enabled: bool,
}

impl Renderer {
    pub fn new(
        id: RendererId,
        material: MaterialId,
        shape: ShapeId,
        transform: TransformId,
    ) -> Self {
        Self {
            id,
            material,
            shape,
            transform,
            model_matrix: Mat4::IDENTITY,
            enabled: true,
        }
    }

    pub fn id(&self) -> RendererId {
        self.id
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// Model matrix as of the last [`Renderer::pre_draw`].
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    /// Resolves the model matrix and binds material and shape.
    ///
    /// Returns whether the shader switched.
    ///
    /// # Errors
    ///
    /// Fails if the material, its shader or the shape is not in `ctx`.
    pub fn pre_draw<D: GpuDevice + ?Sized>(
        &mut self,
        ctx: &mut DrawContext<'_, D>,
    ) -> SceneResult<bool> {
        self.model_matrix = ctx.transforms.apply(self.transform, Mat4::IDENTITY);

        let material = ctx
            .materials
            .get_mut(self.material.index())
            .ok_or(SceneError::UnknownMaterial(self.material))?;
        let shader_id = material.shader();
        let shader = ctx
            .shaders
            .get_mut(shader_id.index())
            .ok_or(SceneError::UnknownShader(shader_id))?;
        let shape = ctx
            .shapes
            .get_mut(self.shape.index())
            .ok_or(SceneError::UnknownShape(self.shape))?;

        let switched_shader = material.pre_draw(ctx.device, shader, ctx.state);
        shape.pre_draw(ctx.device, switched_shader, shader, ctx.state);
        Ok(switched_shader)
    }
}
