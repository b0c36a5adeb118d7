//! Last-bound resource identities.

use crate::handle::{MaterialId, ShaderId, ShapeId};

/// Identities of the shader, material and shape most recently pushed to the
/// device during a draw sequence.
///
/// Purely a state-change cache: clearing it only costs redundant uploads on
/// the next draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindState {
    pub last_shader: Option<ShaderId>,
    pub last_material: Option<MaterialId>,
    pub last_shape: Option<ShapeId>,
}

impl BindState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every binding so the next draw re-pushes all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
