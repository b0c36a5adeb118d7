//! Typed identities for shared resources.
//!
//! Identities index the owning scene's arenas and double as the keys of the
//! [`BindState`](crate::BindState) cache.

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Position in the owning arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

resource_id!(
    /// Identity of a [`Shader`](crate::Shader).
    ShaderId
);
resource_id!(
    /// Identity of a [`Material`](crate::Material).
    MaterialId
);
resource_id!(
    /// Identity of a [`Shape`](crate::Shape).
    ShapeId
);
