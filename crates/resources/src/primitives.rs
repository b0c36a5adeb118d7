//! Procedural geometry.
//!
//! [`unit_cube`] builds the box every prop in the hamlet is made from: a cube
//! one unit on each side, centered on the Y axis with its base at `y = 0`, so
//! scaling it grows it upward from the ground.
//!
//! # Example
//!
//! ```
//! use hamlet_resources::primitives::{unit_cube, unit_cube_data, CUBE_VERTEX_COUNT};
//! use hamlet_rhi::VertexLayout;
//!
//! let vertices = unit_cube();
//! assert_eq!(vertices.len(), CUBE_VERTEX_COUNT);
//! assert_eq!(
//!     unit_cube_data().len(),
//!     CUBE_VERTEX_COUNT * VertexLayout::Pos3NormUvUv2.floats_per_vertex()
//! );
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use hamlet_rhi::VertexLayout;

/// Vertices in [`unit_cube`]: six faces of two triangles.
pub const CUBE_VERTEX_COUNT: usize = 36;

/// One vertex in the [`VertexLayout::Pos3NormUvUv2`] record format.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Coordinates into the cross-shaped atlas.
    pub uv: [f32; 2],
    /// Per-face coordinates covering the whole texture.
    pub uv2: [f32; 2],
}

impl MeshVertex {
    /// Layout matching this struct's memory representation.
    pub const LAYOUT: VertexLayout = VertexLayout::Pos3NormUvUv2;
}

/// A cube face: outward normal, in-plane axes and its atlas cell origin.
struct Face {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
    cell: Vec2,
}

/// `u × v == normal` for every face, so triangles wind counter-clockwise
/// seen from outside.
const FACES: [Face; 6] = [
    Face {
        normal: Vec3::X,
        u: Vec3::NEG_Z,
        v: Vec3::Y,
        cell: Vec2::new(0.75, 0.25),
    },
    Face {
        normal: Vec3::NEG_X,
        u: Vec3::Z,
        v: Vec3::Y,
        cell: Vec2::new(0.25, 0.25),
    },
    Face {
        normal: Vec3::Y,
        u: Vec3::X,
        v: Vec3::NEG_Z,
        cell: Vec2::new(0.5, 0.5),
    },
    Face {
        normal: Vec3::NEG_Y,
        u: Vec3::X,
        v: Vec3::Z,
        cell: Vec2::new(0.5, 0.0),
    },
    Face {
        normal: Vec3::Z,
        u: Vec3::X,
        v: Vec3::Y,
        cell: Vec2::new(0.5, 0.25),
    },
    Face {
        normal: Vec3::NEG_Z,
        u: Vec3::NEG_X,
        v: Vec3::Y,
        cell: Vec2::new(0.0, 0.25),
    },
];

/// Corner parameters of the two triangles on each face.
const QUAD: [(f32, f32); 6] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
];

const ATLAS_CELL: f32 = 0.25;

/// Builds the unit cube as an unindexed triangle list.
pub fn unit_cube() -> Vec<MeshVertex> {
    let center = Vec3::new(0.0, 0.5, 0.0);
    let mut vertices = Vec::with_capacity(CUBE_VERTEX_COUNT);

    for face in &FACES {
        for &(s, t) in &QUAD {
            let position =
                center + face.normal * 0.5 + face.u * (s - 0.5) + face.v * (t - 0.5);
            let uv = face.cell + Vec2::new(s, t) * ATLAS_CELL;
            vertices.push(MeshVertex {
                position: position.to_array(),
                normal: face.normal.to_array(),
                uv: uv.to_array(),
                uv2: [s, t],
            });
        }
    }

    vertices
}

/// The unit cube flattened into interleaved floats for upload.
pub fn unit_cube_data() -> Vec<f32> {
    bytemuck::cast_slice(&unit_cube()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_vertex_matches_layout() {
        assert_eq!(
            std::mem::size_of::<MeshVertex>() as u32,
            MeshVertex::LAYOUT.stride()
        );
    }

    #[test]
    fn test_cube_bounds() {
        for vertex in unit_cube() {
            let [x, y, z] = vertex.position;
            assert!((-0.5..=0.5).contains(&x));
            assert!((0.0..=1.0).contains(&y));
            assert!((-0.5..=0.5).contains(&z));
        }
    }

    #[test]
    fn test_winding_matches_normals() {
        let vertices = unit_cube();
        for triangle in vertices.chunks(3) {
            let a = Vec3::from(triangle[0].position);
            let b = Vec3::from(triangle[1].position);
            let c = Vec3::from(triangle[2].position);
            let face_normal = (b - a).cross(c - a).normalize();
            let normal = Vec3::from(triangle[0].normal);
            assert!((face_normal - normal).length() < EPSILON);
        }
    }

    #[test]
    fn test_vertices_lie_on_their_face() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        for vertex in unit_cube() {
            let offset = Vec3::from(vertex.position) - center;
            let normal = Vec3::from(vertex.normal);
            assert!((offset.dot(normal) - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn test_uvs_in_range() {
        for vertex in unit_cube() {
            for coord in vertex.uv.iter().chain(vertex.uv2.iter()) {
                assert!((0.0..=1.0).contains(coord));
            }
        }
    }

    #[test]
    fn test_data_is_interleaved() {
        let data = unit_cube_data();
        let first = unit_cube()[0];
        assert_eq!(&data[0..3], &first.position);
        assert_eq!(&data[3..6], &first.normal);
        assert_eq!(&data[8..10], &first.uv2);
    }
}
