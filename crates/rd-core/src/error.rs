//! Kernel base error type.
//!
//! Sub-crates define their own error enums and either convert into `RdError`
//! via `From` impls or wrap it as one variant.  Both patterns are acceptable;
//! prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{MoleculeId, SpeciesId, SubvolumeId};

/// The top-level error type for `rd-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum RdError {
    #[error("species {0} not found")]
    SpeciesNotFound(SpeciesId),

    #[error("molecule {0} not found or already destroyed")]
    MoleculeNotFound(MoleculeId),

    #[error("subvolume {0} not found")]
    SubvolumeNotFound(SubvolumeId),

    #[error("position {0} lies outside the spatial partition")]
    OutOfWorld(crate::Vec3),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `rd-*` crates.
pub type RdResult<T> = Result<T, RdError>;
