//! `rd-react` — reaction tables and the stochastic reaction sampler.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`reaction`]   | `Reaction`, `Pathway`, `RateUpdate`, `ReactionTable`  |
//! | [`sampler`]    | `unimolecular_lifetime`, `which_unimolecular`, `test_bimolecular`, `test_many` |
//! | [`error`]      | `ReactError`, `ReactResult<T>`                        |
//!
//! # Probability model
//!
//! The external reaction-network compiler converts physical rate constants
//! into per-timestep probabilities and hands this crate a finished table: for
//! each reaction, an ordered pathway list and its prefix-sum
//! cumulative-probability array (`cum_probs`, strictly non-decreasing, last
//! entry = total reaction probability).  Sampling is then one uniform draw
//! plus a binary search; ties on an exact cumulative boundary resolve to the
//! lower pathway index.
//!
//! A reaction's probabilities may change mid-run through a `(time, pathway,
//! value)` schedule, applied lazily by [`Reaction::update_probs`] just before
//! the reaction is sampled.

pub mod error;
pub mod reaction;
pub mod sampler;


pub use error::{ReactError, ReactResult};
pub use reaction::{Pathway, RateUpdate, Reaction, ReactionTable};
pub use sampler::{
    pathway_index, test_bimolecular, test_many, unimolecular_lifetime, which_unimolecular,
};
