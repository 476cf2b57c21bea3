//! `rd-walk` — the ray-traced Brownian-dynamics walk engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`tables`]   | `StepTables`: radial inverse-CDF and direction sampling  |
//! | [`collide`]  | ray/wall, ray/molecule and subvolume-exit tests          |
//! | [`engine`]   | `diffuse_molecule`: the collision-resolution loop        |
//! | [`counters`] | aggregate event counters                                 |
//! | [`error`]    | `WalkError`, `WalkResult<T>`                             |
//!
//! # How a step works
//!
//! One call to [`engine::diffuse_molecule`] moves one volume molecule by one
//! (possibly merged) diffusion step:
//!
//! 1. pick the step duration — merge elementary steps only when the nearest
//!    obstacle is comfortably farther than the expected displacement;
//! 2. sample a random displacement from [`StepTables`];
//! 3. ray-trace the displacement through the current subvolume, collecting
//!    wall, molecule and boundary-crossing candidates;
//! 4. resolve the earliest candidate (react / reflect / absorb / migrate)
//!    and continue with the remaining displacement until nothing intercepts.
//!
//! The resolution loop is an explicit loop over mutable step state, never
//! recursion, so deep reflection chains cannot overflow the stack.

pub mod collide;
pub mod counters;
pub mod engine;
pub mod error;
pub mod tables;


pub use collide::{collide_mol, collide_wall, exit_subvolume, sort_candidates, Collision, Target, WallHit};
pub use counters::Counters;
pub use engine::{diffuse_molecule, StepResult, WalkScratch};
pub use error::{WalkError, WalkResult};
pub use tables::StepTables;
