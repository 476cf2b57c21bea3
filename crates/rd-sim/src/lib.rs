//! `rd-sim` — the timestep driver tying scheduler, grid, sampler and walk
//! engine together.
//!
//! # Crate layout
//!
//! | Module       | Contents                                           |
//! |--------------|----------------------------------------------------|
//! | [`sim`]      | `Sim`: the per-iteration event loop                |
//! | [`builder`]  | `SimBuilder`: validating fluent constructor        |
//! | [`observer`] | `SimObserver` trait + `NoopObserver`               |
//! | [`error`]    | `SimError`, `SimResult<T>`                          |
//!
//! # The iteration loop
//!
//! One iteration is one global timestep.  For every subvolume the driver
//! opens the next window of the local timing wheel and drains it: tombstoned
//! entries reclaim their arena slot, molecules past their unimolecular
//! deadline fire, and everything else takes one diffusion step bounded by
//! `min(t2 − t, max_timestep, next barrier − t)`.  Survivors are rescheduled
//! at their updated clock in their (possibly new) subvolume's wheel.

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use rd_walk::Counters;
pub use sim::Sim;
