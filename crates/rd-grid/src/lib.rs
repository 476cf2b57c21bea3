//! `rd-grid` — spatial subvolume grid, wall geometry, and molecule storage.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`partition`]  | `Partition` (non-uniform lattice), `Face`, point lookup |
//! | [`wall`]       | `Wall` triangles with precomputed projection basis      |
//! | [`molecule`]   | `Molecule`, `MoleculeArena` (tombstoning slot arena)    |
//! | [`subvolume`]  | `Subvolume` — wall list, per-species molecule lists, local scheduler |
//! | [`world`]      | `World` — placement, migration, destruction             |
//! | [`builder`]    | `WorldBuilder` (validating fluent construction)         |
//!
//! # Ownership model
//!
//! All molecules live in one arena; subvolume lists and scheduler queues hold
//! `MoleculeId` indices, never references.  A live molecule is a member of
//! exactly one subvolume's per-species list; `World::migrate` moves it
//! between lists in O(1) by back-patching the swapped entry's `list_pos`.
//!
//! Destruction is two-phase: the molecule is unlinked from its list and
//! tombstoned immediately (species set to `SpeciesId::INVALID`), but the
//! arena slot is only recycled when the molecule's scheduler entry surfaces
//! and the driver calls [`MoleculeArena::reclaim`].  The scheduler entry is
//! the longest-lived reference to a slot, so recycling there makes stale-ID
//! reuse impossible.

pub mod builder;
pub mod molecule;
pub mod partition;
pub mod subvolume;
pub mod wall;
pub mod world;


pub use builder::{SchedulerParams, WorldBuilder};
pub use molecule::{Location, Molecule, MoleculeArena};
pub use partition::{Face, Partition};
pub use subvolume::Subvolume;
pub use wall::{SurfaceClass, Wall};
pub use world::World;
