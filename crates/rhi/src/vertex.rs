//! Interleaved vertex layouts.
//!
//! Vertex buffers are flat `f32` arrays whose per-vertex record is one of a
//! small closed set of layouts. Each layout fixes the attribute table used to
//! point shader inputs into the buffer.
//!
//! | Layout          | Tag                | Floats | Attributes |
//! |-----------------|--------------------|--------|------------|
//! | `Pos2`          | `pos2`             | 2      | position(2) |
//! | `Pos2Uv`        | `pos2_uv`          | 4      | position(2), uv(2) |
//! | `Pos3NormUv`    | `pos3_norm_uv`     | 8      | position(3), normal(3), uv(2) |
//! | `Pos3NormUvUv2` | `pos3_norm_uv_uv2` | 10     | position(3), normal(3), uv(2), uv2(2) |

use std::fmt;
use std::str::FromStr;

use crate::error::RhiError;

/// Size of one vertex component in bytes.
pub const FLOAT_SIZE: u32 = std::mem::size_of::<f32>() as u32;

/// What a vertex attribute carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Uv,
    Uv2,
}

impl AttributeSemantic {
    /// Shader input name bound for this semantic.
    pub fn shader_name(self) -> &'static str {
        match self {
            AttributeSemantic::Position => "a_pos",
            AttributeSemantic::Normal => "a_normal",
            AttributeSemantic::Uv => "a_uv",
            AttributeSemantic::Uv2 => "a_uv2",
        }
    }
}

/// One attribute within an interleaved vertex record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: AttributeSemantic,
    /// Number of `f32` components.
    pub components: u32,
    /// Offset from the start of the record, in floats.
    pub offset: u32,
}

impl VertexAttribute {
    const fn new(semantic: AttributeSemantic, components: u32, offset: u32) -> Self {
        Self {
            semantic,
            components,
            offset,
        }
    }

    /// Offset from the start of the record, in bytes.
    pub fn byte_offset(&self) -> u32 {
        self.offset * FLOAT_SIZE
    }
}

const POS2: [VertexAttribute; 1] = [VertexAttribute::new(AttributeSemantic::Position, 2, 0)];

const POS2_UV: [VertexAttribute; 2] = [
    VertexAttribute::new(AttributeSemantic::Position, 2, 0),
    VertexAttribute::new(AttributeSemantic::Uv, 2, 2),
];

const POS3_NORM_UV: [VertexAttribute; 3] = [
    VertexAttribute::new(AttributeSemantic::Position, 3, 0),
    VertexAttribute::new(AttributeSemantic::Normal, 3, 3),
    VertexAttribute::new(AttributeSemantic::Uv, 2, 6),
];

const POS3_NORM_UV_UV2: [VertexAttribute; 4] = [
    VertexAttribute::new(AttributeSemantic::Position, 3, 0),
    VertexAttribute::new(AttributeSemantic::Normal, 3, 3),
    VertexAttribute::new(AttributeSemantic::Uv, 2, 6),
    VertexAttribute::new(AttributeSemantic::Uv2, 2, 8),
];

/// Interleaved vertex record format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    Pos2,
    Pos2Uv,
    Pos3NormUv,
    Pos3NormUvUv2,
}

impl VertexLayout {
    /// Floats per vertex record.
    pub fn floats_per_vertex(self) -> usize {
        let last = self.attributes()[self.attributes().len() - 1];
        (last.offset + last.components) as usize
    }

    /// Bytes per vertex record.
    pub fn stride(self) -> u32 {
        self.floats_per_vertex() as u32 * FLOAT_SIZE
    }

    /// Attribute table, position first.
    pub fn attributes(self) -> &'static [VertexAttribute] {
        match self {
            VertexLayout::Pos2 => &POS2,
            VertexLayout::Pos2Uv => &POS2_UV,
            VertexLayout::Pos3NormUv => &POS3_NORM_UV,
            VertexLayout::Pos3NormUvUv2 => &POS3_NORM_UV_UV2,
        }
    }

    /// The attribute carrying `semantic`, if this layout has one.
    pub fn attribute(self, semantic: AttributeSemantic) -> Option<VertexAttribute> {
        self.attributes()
            .iter()
            .copied()
            .find(|a| a.semantic == semantic)
    }

    /// Whether records carry `semantic`.
    pub fn has(self, semantic: AttributeSemantic) -> bool {
        self.attribute(semantic).is_some()
    }

    /// Short tag used in asset descriptions.
    pub fn tag(self) -> &'static str {
        match self {
            VertexLayout::Pos2 => "pos2",
            VertexLayout::Pos2Uv => "pos2_uv",
            VertexLayout::Pos3NormUv => "pos3_norm_uv",
            VertexLayout::Pos3NormUvUv2 => "pos3_norm_uv_uv2",
        }
    }
}

impl FromStr for VertexLayout {
    type Err = RhiError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "pos2" => Ok(VertexLayout::Pos2),
            "pos2_uv" => Ok(VertexLayout::Pos2Uv),
            "pos3_norm_uv" => Ok(VertexLayout::Pos3NormUv),
            "pos3_norm_uv_uv2" => Ok(VertexLayout::Pos3NormUvUv2),
            other => Err(RhiError::UnknownVertexLayout(other.to_string())),
        }
    }
}

impl fmt::Display for VertexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats_per_vertex() {
        assert_eq!(VertexLayout::Pos2.floats_per_vertex(), 2);
        assert_eq!(VertexLayout::Pos2Uv.floats_per_vertex(), 4);
        assert_eq!(VertexLayout::Pos3NormUv.floats_per_vertex(), 8);
        assert_eq!(VertexLayout::Pos3NormUvUv2.floats_per_vertex(), 10);
        assert_eq!(VertexLayout::Pos3NormUvUv2.stride(), 40);
    }

    #[test]
    fn test_position_always_first() {
        for layout in [
            VertexLayout::Pos2,
            VertexLayout::Pos2Uv,
            VertexLayout::Pos3NormUv,
            VertexLayout::Pos3NormUvUv2,
        ] {
            let first = layout.attributes()[0];
            assert_eq!(first.semantic, AttributeSemantic::Position);
            assert_eq!(first.offset, 0);
        }
    }

    #[test]
    fn test_optional_attributes() {
        assert!(!VertexLayout::Pos2.has(AttributeSemantic::Uv));
        assert!(!VertexLayout::Pos2Uv.has(AttributeSemantic::Normal));
        assert!(VertexLayout::Pos3NormUv.has(AttributeSemantic::Normal));
        assert!(!VertexLayout::Pos3NormUv.has(AttributeSemantic::Uv2));

        let uv2 = VertexLayout::Pos3NormUvUv2
            .attribute(AttributeSemantic::Uv2)
            .unwrap();
        assert_eq!(uv2.byte_offset(), 32);
    }

    #[test]
    fn test_tag_round_trip_and_unknown() {
        let layout: VertexLayout = "pos3_norm_uv".parse().unwrap();
        assert_eq!(layout, VertexLayout::Pos3NormUv);
        assert_eq!(layout.tag(), "pos3_norm_uv");

        let err = "pos4".parse::<VertexLayout>().unwrap_err();
        assert!(matches!(err, RhiError::UnknownVertexLayout(tag) if tag == "pos4"));
    }
}
