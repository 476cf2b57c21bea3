//! Species table entries.
//!
//! A `Species` is immutable during a run except for its population counter,
//! which the grid updates as molecules are created and destroyed.  The table
//! itself is built by the external reaction-network compiler; this kernel
//! only reads it.
//!
//! # Units
//!
//! All quantities are in *internal* units: lengths in world length units,
//! times in global timesteps.  The external builder converts physical units
//! (cm²/s, seconds) before handing the table over.  With that convention the
//! characteristic displacement of one elementary diffusion step is
//!
//! ```text
//! space_step = sqrt(4 · D · time_step)
//! ```

use crate::SpeciesId;

/// Whether instances of this species diffuse freely in 3-D or sit on a wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeciesKind {
    /// Diffuses freely in 3-D space.
    Volume,
    /// Constrained to a 2-D position on a wall.  Surface diffusion is
    /// unimplemented in this kernel; surface molecules only age toward their
    /// unimolecular deadline.
    Surface,
}

/// One molecule type.
#[derive(Clone, Debug)]
pub struct Species {
    pub id: SpeciesId,

    /// Human-readable name, used only in diagnostics.
    pub name: String,

    pub kind: SpeciesKind,

    /// Diffusion constant, internal length² per timestep.
    pub d: f64,

    /// Duration of one elementary diffusion step, in global timesteps.
    /// Usually 1.0; slow species may use a custom longer step.
    pub time_step: f64,

    /// Characteristic displacement of one elementary step:
    /// `sqrt(4 · d · time_step)`.
    pub space_step: f64,

    /// Live instance count.  Maintained by the molecule arena.
    pub population: u64,

    /// `true` if at least one bimolecular reaction lists this species as a
    /// reactant.  Lets the walk engine skip the pair lookup entirely for
    /// inert species.
    pub can_collide: bool,
}

impl Species {
    /// Build a species entry, deriving `space_step` from `d` and `time_step`.
    pub fn new(id: SpeciesId, name: impl Into<String>, kind: SpeciesKind, d: f64) -> Self {
        Self::with_time_step(id, name, kind, d, 1.0)
    }

    /// Build a species entry with a custom elementary time step.
    pub fn with_time_step(
        id: SpeciesId,
        name: impl Into<String>,
        kind: SpeciesKind,
        d: f64,
        time_step: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            d,
            time_step,
            space_step: (4.0 * d * time_step).sqrt(),
            population: 0,
            can_collide: false,
        }
    }

    /// `true` if this species can move at all.
    #[inline]
    pub fn diffuses(&self) -> bool {
        self.kind == SpeciesKind::Volume && self.d > 0.0
    }
}
