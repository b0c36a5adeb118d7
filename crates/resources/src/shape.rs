//! Vertex geometry ready for draw calls.

use hamlet_rhi::{
    AttributeSemantic, BufferHandle, GpuDevice, PrimitiveTopology, RhiError, VertexLayout,
};
use tracing::{debug, warn};

use crate::bind_state::BindState;
use crate::error::ResourceResult;
use crate::handle::ShapeId;
use crate::shader::{Shader, ShaderFeatures};

/// Optional attributes and the shader feature that requests each.
const OPTIONAL_INPUTS: [(ShaderFeatures, AttributeSemantic); 3] = [
    (ShaderFeatures::NORMALS, AttributeSemantic::Normal),
    (ShaderFeatures::UV1, AttributeSemantic::Uv),
    (ShaderFeatures::UV2, AttributeSemantic::Uv2),
];

/// One static vertex buffer plus the information needed to draw it.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    buffer: BufferHandle,
    layout: VertexLayout,
    topology: PrimitiveTopology,
    vertex_count: u32,
    /// Set until the attribute pointers have been bound once.
    dirty: bool,
}

impl Shape {
    /// Uploads `data` as interleaved `layout` records.
    ///
    /// The vertex count is `data.len() / layout.floats_per_vertex()`; a
    /// trailing partial record is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot create the buffer.
    pub fn new<D: GpuDevice + ?Sized>(
        device: &mut D,
        id: ShapeId,
        layout: VertexLayout,
        topology: PrimitiveTopology,
        data: &[f32],
    ) -> ResourceResult<Self> {
        let floats = layout.floats_per_vertex();
        if data.len() % floats != 0 {
            warn!(
                "Shape {:?}: {} floats is not a whole number of {} vertices",
                id,
                data.len(),
                layout
            );
        }
        let vertex_count = (data.len() / floats) as u32;

        let buffer = device.create_vertex_buffer(data)?;
        debug!(
            "Created shape {:?}: {} {} vertices as {}",
            id, vertex_count, layout, topology
        );

        Ok(Self {
            id,
            buffer,
            layout,
            topology,
            vertex_count,
            dirty: true,
        })
    }

    /// Like [`Shape::new`], with the layout given by its tag (e.g. `"pos3_norm_uv"`).
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::UnknownVertexLayout`] for an unrecognized tag.
    pub fn from_tag<D: GpuDevice + ?Sized>(
        device: &mut D,
        id: ShapeId,
        tag: &str,
        topology: PrimitiveTopology,
        data: &[f32],
    ) -> ResourceResult<Self> {
        let layout: VertexLayout = tag.parse::<VertexLayout>().map_err(|e: RhiError| {
            warn!("Shape {:?}: {}", id, e);
            e
        })?;
        Self::new(device, id, layout, topology, data)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Binds the buffer and attribute pointers for `shader` when needed.
    ///
    /// Bindings persist on the device, so nothing is issued when neither the
    /// shader nor the shape changed since the last draw.
    pub fn pre_draw<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        switched_shader: bool,
        shader: &mut Shader,
        state: &mut BindState,
    ) {
        let switched_shape = state.last_shape != Some(self.id);
        if !(switched_shader || switched_shape || self.dirty) {
            return;
        }

        device.bind_vertex_buffer(self.buffer);
        let stride = self.layout.stride();
        for attribute in self.layout.attributes() {
            let wanted = match attribute.semantic {
                AttributeSemantic::Position => true,
                AttributeSemantic::Normal => shader.wants(ShaderFeatures::NORMALS),
                AttributeSemantic::Uv => shader.wants(ShaderFeatures::UV1),
                AttributeSemantic::Uv2 => shader.wants(ShaderFeatures::UV2),
            };
            if wanted {
                shader.set_attribute(
                    device,
                    attribute.semantic.shader_name(),
                    attribute.components,
                    stride,
                    attribute.byte_offset(),
                );
            }
        }

        for (feature, semantic) in OPTIONAL_INPUTS {
            if shader.wants(feature) && !self.layout.has(semantic) {
                warn!(
                    "Shader {:?} wants {} but shape {:?} ({}) has no such data",
                    shader.id(),
                    semantic.shader_name(),
                    self.id,
                    self.layout
                );
            }
        }

        self.dirty = false;
        state.last_shape = Some(self.id);
    }
}
