//! Transform hierarchy for scene objects.
//!
//! A [`Transform`] holds scale, rotation (Euler degrees) and translation and
//! caches its local matrix. Transforms live in a [`Transforms`] arena and
//! refer to their parent by [`TransformId`], so a parent can be shared by any
//! number of children and outlives none of them by accident.
//!
//! The local matrix is `T · Rz(roll) · Rx(pitch) · Ry(yaw) · S`: scale first,
//! then yaw, pitch and roll, then translation. World matrices are composed
//! root to leaf on every [`Transforms::apply`], so moving a parent is visible
//! to its children on the next frame without any invalidation pass.
//!
//! # Example
//!
//! ```
//! use hamlet_scene::{Transform, Transforms};
//! use glam::{Mat4, Vec3};
//!
//! # fn example() -> hamlet_scene::SceneResult<()> {
//! let mut transforms = Transforms::new();
//!
//! let mut parent = Transform::new();
//! parent.set_translate(10.0, 0.0, 0.0);
//! let parent = transforms.insert(parent);
//!
//! let child = transforms.create(Some(parent))?;
//! transforms.get_mut(child).unwrap().set_translate(0.0, 5.0, 0.0);
//!
//! let world = transforms.apply(child, Mat4::IDENTITY);
//! let position = world.transform_point3(Vec3::ZERO);
//! assert!((position - Vec3::new(10.0, 5.0, 0.0)).length() < 0.001);
//! # Ok(())
//! # }
//! ```

use glam::{Mat4, Vec3};
use tracing::warn;

use crate::error::{SceneError, SceneResult};

/// Index of a [`Transform`] in a [`Transforms`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(pub u32);

impl TransformId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Wraps an angle into `[0, 360)`.
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Scale, rotation and translation of one node.
///
/// Every mutator marks the cached local matrix dirty and returns `&mut Self`
/// so calls chain: `t.set_scale(3.0, 2.0, 3.0).rotate(0.0, 45.0, 0.0)`.
#[derive(Clone, Debug)]
pub struct Transform {
    scale: Vec3,
    /// Degrees about X (pitch), Y (yaw) and Z (roll), each in `[0, 360)`.
    rotate: Vec3,
    translate: Vec3,
    parent: Option<TransformId>,
    local: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotate: Vec3::ZERO,
            translate: Vec3::ZERO,
            parent: None,
            local: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

impl Transform {
    /// Create an identity transform with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores unit scale, zero rotation and zero translation.
    ///
    /// The parent link is kept.
    pub fn reset(&mut self) -> &mut Self {
        self.scale = Vec3::ONE;
        self.rotate = Vec3::ZERO;
        self.translate = Vec3::ZERO;
        self.dirty = true;
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.scale = Vec3::new(x, y, z);
        self.dirty = true;
        self
    }

    /// Multiplies the current scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.scale *= Vec3::new(x, y, z);
        self.dirty = true;
        self
    }

    /// Sets pitch (`x`), yaw (`y`) and roll (`z`) in degrees.
    pub fn set_rotate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.rotate = Vec3::new(x, y, z);
        self.wrap_rotation();
        self.dirty = true;
        self
    }

    /// Adds to the current rotation, in degrees.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.rotate += Vec3::new(x, y, z);
        self.wrap_rotation();
        self.dirty = true;
        self
    }

    pub fn set_translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translate = Vec3::new(x, y, z);
        self.dirty = true;
        self
    }

    /// Adds to the current translation.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translate += Vec3::new(x, y, z);
        self.dirty = true;
        self
    }

    pub fn scale_factors(&self) -> Vec3 {
        self.scale
    }

    /// Rotation in degrees, each component in `[0, 360)`.
    pub fn rotation_degrees(&self) -> Vec3 {
        self.rotate
    }

    pub fn translation(&self) -> Vec3 {
        self.translate
    }

    pub fn has_scale(&self) -> bool {
        self.scale != Vec3::ONE
    }

    pub fn has_rotate(&self) -> bool {
        self.rotate != Vec3::ZERO
    }

    pub fn has_translate(&self) -> bool {
        self.translate != Vec3::ZERO
    }

    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The local matrix, rebuilt first if any component changed.
    pub fn local_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.local = self.compose();
            self.dirty = false;
        }
        self.local
    }

    fn compose(&self) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        if self.has_translate() {
            matrix *= Mat4::from_translation(self.translate);
        }
        if self.has_rotate() {
            matrix *= Mat4::from_rotation_z(self.rotate.z.to_radians())
                * Mat4::from_rotation_x(self.rotate.x.to_radians())
                * Mat4::from_rotation_y(self.rotate.y.to_radians());
        }
        if self.has_scale() {
            matrix *= Mat4::from_scale(self.scale);
        }
        matrix
    }

    fn wrap_rotation(&mut self) {
        self.rotate = Vec3::new(
            wrap_degrees(self.rotate.x),
            wrap_degrees(self.rotate.y),
            wrap_degrees(self.rotate.z),
        );
    }
}

/// Arena owning every transform in a scene.
#[derive(Debug, Default)]
pub struct Transforms {
    nodes: Vec<Transform>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `transform` and returns its id.
    ///
    /// A parent already set on `transform` is kept as is; use
    /// [`Transforms::set_parent`] to link validated ids.
    pub fn insert(&mut self, transform: Transform) -> TransformId {
        let id = TransformId(self.nodes.len() as u32);
        self.nodes.push(transform);
        id
    }

    /// Adds an identity transform under `parent`.
    pub fn create(&mut self, parent: Option<TransformId>) -> SceneResult<TransformId> {
        if let Some(parent) = parent {
            self.check(parent)?;
        }
        let id = self.insert(Transform::new());
        self.nodes[id.index()].parent = parent;
        Ok(id)
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Links `child` under `parent`, or detaches it with `None`.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids, and with [`SceneError::TransformCycle`] when
    /// `child` is `parent` or one of its ancestors.
    pub fn set_parent(
        &mut self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> SceneResult<()> {
        self.check(child)?;
        if let Some(parent) = parent {
            self.check(parent)?;
            let mut cursor = Some(parent);
            while let Some(id) = cursor {
                if id == child {
                    return Err(SceneError::TransformCycle { child, parent });
                }
                cursor = self.nodes[id.index()].parent;
            }
        }
        self.nodes[child.index()].parent = parent;
        Ok(())
    }

    /// Composes the chain ending at `id` onto `matrix`.
    ///
    /// Returns `matrix · root_local · … · local(id)`. An unknown id leaves
    /// `matrix` unchanged.
    pub fn apply(&mut self, id: TransformId, matrix: Mat4) -> Mat4 {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current.index()) else {
                warn!("Transform chain references unknown {:?}", current);
                break;
            };
            chain.push(current);
            cursor = node.parent;
        }

        chain
            .into_iter()
            .rev()
            .fold(matrix, |acc, current| {
                acc * self.nodes[current.index()].local_matrix()
            })
    }

    /// World matrix of `id`.
    pub fn world_matrix(&mut self, id: TransformId) -> Mat4 {
        self.apply(id, Mat4::IDENTITY)
    }

    fn check(&self, id: TransformId) -> SceneResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownTransform(id))
        }
    }
}

/// Inverse-transpose of `model`, for transforming normals.
///
/// A singular `model` (e.g. zero scale) yields the identity instead of
/// NaN/Inf values.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    const EPSILON: f32 = 1e-6;
    if model.determinant().abs() < EPSILON {
        Mat4::IDENTITY
    } else {
        model.inverse().transpose()
    }
}
