//! `rd-core` — foundational types for the `rust_rd` reaction-diffusion kernel.
//!
//! This crate is a dependency of every other `rd-*` crate.  It intentionally
//! has no `rd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `SpeciesId`, `SubvolumeId`, `WallId`, `MoleculeId`, `ReactionId` |
//! | [`vec`]      | `Vec3`, dot/cross/reflection helpers                    |
//! | [`species`]  | `Species` table entry (diffusion constant, step lengths)|
//! | [`config`]   | `RunConfig`, `OverprobPolicy`                           |
//! | [`rng`]      | `SimRng` (deterministic uniform stream)                 |
//! | [`error`]    | `RdError`, `RdResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config and ID types.     |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod species;
pub mod vec;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{OverprobPolicy, RunConfig};
pub use error::{RdError, RdResult};
pub use ids::{MoleculeId, ReactionId, SpeciesId, SubvolumeId, WallId};
pub use rng::SimRng;
pub use species::{Species, SpeciesKind};
pub use vec::Vec3;

/// Relative tolerance used throughout the kernel's geometric comparisons.
///
/// One step of a walk never trusts a ray/wall classification closer to an
/// edge than this, and reflection times are biased early by exactly one EPS
/// so a reflected ray cannot re-hit the wall it just left.
pub const EPS: f64 = 1.0e-12;

/// Collision-time ties closer than this are broken in favor of
/// subvolume-boundary events (see `rd-walk`).
pub const TIE_EPS: f64 = 10.0 * EPS;
