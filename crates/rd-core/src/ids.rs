//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into arena `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.
//!
//! `INVALID` doubles as the tombstone marker: a destroyed molecule has its
//! `species` set to `SpeciesId::INVALID` until its arena slot is reclaimed.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — the type's maximum value.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a species in the species table.
    /// Using `u16` keeps per-molecule storage compact (max 65,534 species).
    pub struct SpeciesId(u16);
}

typed_id! {
    /// Index of a subvolume in the spatial partition.
    pub struct SubvolumeId(u32);
}

typed_id! {
    /// Index of a triangular wall element.
    pub struct WallId(u32);
}

typed_id! {
    /// Index of a molecule slot in the arena.  Slots are reused after
    /// reclamation, so a `MoleculeId` is only meaningful while the slot is
    /// alive.
    pub struct MoleculeId(u32);
}

typed_id! {
    /// Index of a reaction in the reaction table.
    pub struct ReactionId(u32);
}
