//! Typed arena identifiers.
//!
//! Every symbol the engine touches lives in an arena (the symbol graph, the
//! package tree, the override-group table) and is referred to by a 4-byte
//! index. Using distinct index types keeps a `FieldId` from ever being used
//! to index the method arena.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw index.
            #[inline]
            pub const fn index(self) -> u32 {
                self.0
            }

            /// Id of arena slot `idx`.
            ///
            /// # Panics
            ///
            /// Panics if `idx` does not fit in a `u32`. Two slots never
            /// share an id.
            #[inline]
            pub(crate) fn from_usize(idx: usize) -> Self {
                match u32::try_from(idx) {
                    Ok(raw) => Self(raw),
                    Err(_) => panic!(concat!($tag, " arena overflow at slot {}"), idx),
                }
            }

            #[inline]
            pub(crate) const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

arena_id!(
    /// A class or interface in the symbol graph.
    TypeId,
    "TypeId"
);
arena_id!(
    /// A field declared on a type.
    FieldId,
    "FieldId"
);
arena_id!(
    /// A method declared on a type.
    MethodId,
    "MethodId"
);
arena_id!(
    /// A node of the package tree. Index 0 is always the root.
    PackageId,
    "PackageId"
);
arena_id!(
    /// An override group in the group arena.
    GroupId,
    "GroupId"
);

impl PackageId {
    /// The root package (empty name, no parent).
    pub const ROOT: PackageId = PackageId(0);
}
