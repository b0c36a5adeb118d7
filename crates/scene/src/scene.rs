//! The scene root.
//!
//! [`Scene`] owns the device, the camera, the light, every GPU resource and
//! the ordered renderer list. Resources are stored in arenas and addressed by
//! typed ids, so many materials can share a shader and many renderers can
//! share a material or shape.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use hamlet_resources::primitives::{unit_cube_data, MeshVertex};
//! use hamlet_rhi::{HeadlessDevice, PrimitiveTopology};
//! use hamlet_scene::Scene;
//!
//! # fn example() -> hamlet_scene::SceneResult<()> {
//! let mut scene = Scene::new(HeadlessDevice::new());
//! scene
//!     .camera_mut()
//!     .set_perspective(90.0, 1.0, 0.5, 1000.0)
//!     .set_look_at(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO, Vec3::Y);
//!
//! let shader = scene.create_shader(
//!     "uniform mat4 u_transform; attribute vec4 a_pos; void main() {}",
//!     "uniform vec3 u_color; void main() {}",
//! )?;
//! let material = scene.create_material(shader)?;
//! let cube = scene.create_shape(
//!     MeshVertex::LAYOUT,
//!     PrimitiveTopology::Triangles,
//!     &unit_cube_data(),
//! )?;
//! scene.create_renderer(material, cube, None)?;
//!
//! assert_eq!(scene.render()?, 1);
//! # Ok(())
//! # }
//! ```

use hamlet_resources::{
    BindState, Material, MaterialId, Shader, ShaderId, Shape, ShapeId,
};
use hamlet_rhi::{GpuDevice, PrimitiveTopology, VertexLayout};
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::renderer::{DrawContext, Renderer, RendererId};
use crate::transform::{Transform, TransformId, Transforms};

/// Aggregate root of a renderable scene.
pub struct Scene<D: GpuDevice> {
    device: D,
    camera: Camera,
    light: Light,
    shaders: Vec<Shader>,
    materials: Vec<Material>,
    shapes: Vec<Shape>,
    transforms: Transforms,
    /// Draw list; order is draw order.
    renderers: Vec<Renderer>,
    next_renderer: u32,
    state: BindState,
}

impl<D: GpuDevice> Scene<D> {
    /// Creates an empty scene drawing through `device`.
    pub fn new(device: D) -> Self {
        Self {
            device,
            camera: Camera::new(),
            light: Light::new(),
            shaders: Vec::new(),
            materials: Vec::new(),
            shapes: Vec::new(),
            transforms: Transforms::new(),
            renderers: Vec::new(),
            next_renderer: 0,
            state: BindState::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    // Resources

    /// Compiles a shader program.
    ///
    /// # Errors
    ///
    /// Compile or link failure; the scene cannot draw with it.
    pub fn create_shader(&mut self, vertex_src: &str, fragment_src: &str) -> SceneResult<ShaderId> {
        let id = ShaderId(self.shaders.len() as u32);
        let shader = Shader::new(&mut self.device, id, vertex_src, fragment_src)?;
        self.shaders.push(shader);
        Ok(id)
    }

    pub fn shader(&self, id: ShaderId) -> Option<&Shader> {
        self.shaders.get(id.index())
    }

    pub fn shader_mut(&mut self, id: ShaderId) -> Option<&mut Shader> {
        self.shaders.get_mut(id.index())
    }

    /// Creates a default material for `shader`.
    pub fn create_material(&mut self, shader: ShaderId) -> SceneResult<MaterialId> {
        if self.shader(shader).is_none() {
            return Err(SceneError::UnknownShader(shader));
        }
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(Material::new(id, shader));
        debug!("Created material {:?} for shader {:?}", id, shader);
        Ok(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.index())
    }

    /// Uploads vertex data as a new shape.
    pub fn create_shape(
        &mut self,
        layout: VertexLayout,
        topology: PrimitiveTopology,
        data: &[f32],
    ) -> SceneResult<ShapeId> {
        let id = ShapeId(self.shapes.len() as u32);
        let shape = Shape::new(&mut self.device, id, layout, topology, data)?;
        self.shapes.push(shape);
        Ok(id)
    }

    /// Like [`Scene::create_shape`], with the layout given by its tag.
    pub fn create_shape_tagged(
        &mut self,
        tag: &str,
        topology: PrimitiveTopology,
        data: &[f32],
    ) -> SceneResult<ShapeId> {
        let id = ShapeId(self.shapes.len() as u32);
        let shape = Shape::from_tag(&mut self.device, id, tag, topology, data)?;
        self.shapes.push(shape);
        Ok(id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    // Transforms

    /// Adds an identity transform, optionally under `parent`.
    pub fn create_transform(&mut self, parent: Option<TransformId>) -> SceneResult<TransformId> {
        self.transforms.create(parent)
    }

    pub fn transform(&self, id: TransformId) -> Option<&Transform> {
        self.transforms.get(id)
    }

    pub fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.transforms.get_mut(id)
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut Transforms {
        &mut self.transforms
    }

    /// Re-links `child` under `parent`, rejecting cycles.
    pub fn set_parent(
        &mut self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> SceneResult<()> {
        self.transforms.set_parent(child, parent)
    }

    // Renderers

    /// Creates a renderer and appends it to the draw list.
    ///
    /// With `transform == None` a fresh root transform is created for it.
    pub fn create_renderer(
        &mut self,
        material: MaterialId,
        shape: ShapeId,
        transform: Option<TransformId>,
    ) -> SceneResult<RendererId> {
        let renderer = self.build_renderer(material, shape, transform)?;
        let id = renderer.id();
        self.renderers.push(renderer);
        Ok(id)
    }

    /// Creates a renderer without adding it to the draw list.
    pub fn build_renderer(
        &mut self,
        material: MaterialId,
        shape: ShapeId,
        transform: Option<TransformId>,
    ) -> SceneResult<Renderer> {
        if self.material(material).is_none() {
            return Err(SceneError::UnknownMaterial(material));
        }
        if self.shape(shape).is_none() {
            return Err(SceneError::UnknownShape(shape));
        }
        let transform = match transform {
            Some(id) if self.transforms.get(id).is_none() => {
                return Err(SceneError::UnknownTransform(id));
            }
            Some(id) => id,
            None => self.transforms.insert(Transform::new()),
        };

        let id = RendererId(self.next_renderer);
        self.next_renderer += 1;
        Ok(Renderer::new(id, material, shape, transform))
    }

    /// Appends `renderer` to the draw list.
    ///
    /// Returns false, leaving the list unchanged, if a renderer with the same
    /// id is already present.
    pub fn add_renderer(&mut self, renderer: Renderer) -> bool {
        if self.renderers.iter().any(|r| r.id() == renderer.id()) {
            warn!("Renderer {:?} is already in the scene", renderer.id());
            return false;
        }
        self.renderers.push(renderer);
        true
    }

    /// Takes a renderer out of the draw list, preserving the order of the rest.
    pub fn remove_renderer(&mut self, id: RendererId) -> Option<Renderer> {
        let index = self.renderers.iter().position(|r| r.id() == id)?;
        Some(self.renderers.remove(index))
    }

    pub fn renderer(&self, id: RendererId) -> Option<&Renderer> {
        self.renderers.iter().find(|r| r.id() == id)
    }

    pub fn renderer_mut(&mut self, id: RendererId) -> Option<&mut Renderer> {
        self.renderers.iter_mut().find(|r| r.id() == id)
    }

    /// Renderers in draw order.
    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    /// Enables or disables a renderer. Returns false for an unknown id.
    pub fn set_enabled(&mut self, id: RendererId, enabled: bool) -> bool {
        match self.renderer_mut(id) {
            Some(renderer) => {
                renderer.enabled = enabled;
                true
            }
            None => false,
        }
    }

    // Drawing

    /// Forgets the last-bound shader, material and shape.
    ///
    /// Call after anything else touched the device so the next frame
    /// rebinds everything.
    pub fn reset_bind_state(&mut self) {
        self.state.reset();
    }

    pub fn bind_state(&self) -> &BindState {
        &self.state
    }

    /// Draws every enabled renderer in list order.
    ///
    /// The caller clears the framebuffer first. Returns the number of draw
    /// calls issued.
    pub fn render(&mut self) -> SceneResult<usize> {
        let mut ctx = DrawContext {
            device: &mut self.device,
            shaders: &mut self.shaders,
            materials: &mut self.materials,
            shapes: &mut self.shapes,
            transforms: &mut self.transforms,
            light: &mut self.light,
            state: &mut self.state,
        };
        self.camera.draw_all(self.renderers.iter_mut(), &mut ctx)
    }
}
