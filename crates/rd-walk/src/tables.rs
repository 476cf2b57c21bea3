//! Precomputed step-length and direction sampling tables.
//!
//! # Radial table
//!
//! In units of a species' `space_step` (`sqrt(4·D·Δt)`), the length of one
//! 3-D Brownian displacement follows the Maxwell-like density
//!
//! ```text
//! p(x) = (4/√π) · x² · e^(−x²)
//! ```
//!
//! The table stores the numeric inverse of its CDF at `N` equally spaced
//! probabilities, so sampling a step length is one uniform index draw — no
//! per-step transcendentals.  Merging `k` elementary steps scales the drawn
//! length by `sqrt(k)`.
//!
//! # Direction table
//!
//! Directions come from a spherical Fibonacci lattice: `N` near-uniform unit
//! vectors, again sampled by index.  The lattice's slight anisotropy washes
//! out over many steps; runs that need exactly isotropic directions set
//! `RunConfig::fully_random_directions` and pay two trig calls per step.

use rd_core::{SimRng, Vec3};

/// Entries in each table.  Power of two so the index draw is cheap.
const TABLE_SIZE: usize = 1024;

/// Integration grid resolution for the CDF inversion.
const CDF_STEPS: usize = 16_384;

/// Radial density support cutoff, in `space_step` units.  The CDF mass
/// beyond 4 is below 1e-6.
const X_MAX: f64 = 4.0;

pub struct StepTables {
    /// Inverse radial CDF sampled at `(i + 0.5) / TABLE_SIZE`.
    radial: Vec<f64>,

    /// Spherical Fibonacci unit directions.
    directions: Vec<Vec3>,
}

impl StepTables {
    pub fn new() -> Self {
        Self {
            radial: build_radial_table(),
            directions: build_direction_table(),
        }
    }

    /// Step length of one elementary step, in `space_step` units.
    #[inline]
    pub fn sample_radial(&self, rng: &mut SimRng) -> f64 {
        self.radial[rng.uniform_index(self.radial.len())]
    }

    /// A quasi-uniform unit direction from the lattice.
    #[inline]
    pub fn sample_direction(&self, rng: &mut SimRng) -> Vec3 {
        self.directions[rng.uniform_index(self.directions.len())]
    }

    /// An exactly isotropic unit direction (two trig calls).
    pub fn random_direction(rng: &mut SimRng) -> Vec3 {
        let cos_theta = 2.0 * rng.uniform() - 1.0;
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = 2.0 * std::f64::consts::PI * rng.uniform();
        Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }

    /// Sample a full displacement vector for `steps` merged elementary steps
    /// of a species with the given `space_step`.
    pub fn displacement(
        &self,
        space_step: f64,
        steps: f64,
        fully_random: bool,
        rng: &mut SimRng,
    ) -> Vec3 {
        let r = self.sample_radial(rng) * space_step * steps.sqrt();
        let dir = if fully_random {
            Self::random_direction(rng)
        } else {
            self.sample_direction(rng)
        };
        dir * r
    }

    #[cfg(test)]
    pub(crate) fn radial_table(&self) -> &[f64] {
        &self.radial
    }

    #[cfg(test)]
    pub(crate) fn direction_table(&self) -> &[Vec3] {
        &self.directions
    }
}

impl Default for StepTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Numerically invert the radial CDF: integrate the density on a fine grid,
/// then walk the grid once, emitting the abscissa at each target quantile.
fn build_radial_table() -> Vec<f64> {
    let dx = X_MAX / CDF_STEPS as f64;
    let density = |x: f64| 4.0 / std::f64::consts::PI.sqrt() * x * x * (-x * x).exp();

    let mut table = Vec::with_capacity(TABLE_SIZE);
    let mut cdf = 0.0;
    let mut prev = 0.0; // density(0) = 0
    let mut next_quantile = 0.5 / TABLE_SIZE as f64;

    for i in 1..=CDF_STEPS {
        let x = i as f64 * dx;
        let cur = density(x);
        let cdf_before = cdf;
        cdf += 0.5 * (prev + cur) * dx;
        prev = cur;

        while table.len() < TABLE_SIZE && cdf >= next_quantile {
            // Linear interpolation within the grid cell.
            let frac = (next_quantile - cdf_before) / (cdf - cdf_before);
            table.push(x - dx + frac * dx);
            next_quantile = (table.len() as f64 + 0.5) / TABLE_SIZE as f64;
        }
    }
    // Tail quantiles past the cutoff clamp to X_MAX.
    while table.len() < TABLE_SIZE {
        table.push(X_MAX);
    }
    table
}

/// Spherical Fibonacci lattice of `TABLE_SIZE` unit vectors.
fn build_direction_table() -> Vec<Vec3> {
    // Golden angle in radians.
    let ga = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..TABLE_SIZE)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / TABLE_SIZE as f64;
            let r = (1.0 - z * z).sqrt();
            let phi = ga * i as f64;
            Vec3::new(r * phi.cos(), r * phi.sin(), z)
        })
        .collect()
}
