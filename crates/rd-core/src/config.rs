//! Run configuration.
//!
//! Typically assembled by the application layer (which owns file parsing)
//! and passed to `rd_sim::SimBuilder`.  Everything here is read-only during
//! a run.

/// What to do when a reaction's total probability per step exceeds
/// `RunConfig::overprob_threshold` after a scheduled rate update.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverprobPolicy {
    /// Ignore and continue; the sampler clamps and tallies skipped reactions.
    Cope,
    /// Log a warning (once per offending update) and continue.
    #[default]
    Warn,
    /// Stop the run with an error so pending output can be flushed.
    Error,
}

/// Top-level kernel configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Total global timesteps to simulate.
    pub iterations: u64,

    /// Physical seconds per global timestep.  Informational only inside the
    /// kernel — all internal arithmetic is in timesteps.
    pub time_unit: f64,

    /// Upper bound on how far a single molecule step may advance its clock,
    /// in timesteps.  Caps the multistep merge heuristic.
    pub max_timestep: f64,

    /// Merge elementary diffusion steps only when the nearest obstacle is
    /// farther than this multiple of the species' expected step length.
    /// The original default (2.0 ≈ 95th percentile of the radial step
    /// distribution) is kept.
    pub multistep_percentile: f64,

    /// Use direct trigonometric direction sampling instead of the
    /// precomputed quasi-uniform direction table.
    pub fully_random_directions: bool,

    /// Reaction probability above which the overprobability policy fires.
    pub overprob_threshold: f64,

    /// Policy when `overprob_threshold` is exceeded.
    pub overprob_policy: OverprobPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            iterations: 0,
            time_unit: 1.0e-6,
            max_timestep: 1.0,
            multistep_percentile: 2.0,
            fully_random_directions: false,
            overprob_threshold: 1.0,
            overprob_policy: OverprobPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Final simulated time, in timesteps (exclusive upper bound).
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.iterations as f64
    }
}
