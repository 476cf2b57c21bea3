//! Fluent builder for constructing a [`Sim`].

use rd_core::RunConfig;
use rd_grid::World;
use rd_react::ReactionTable;

use crate::{Sim, SimError, SimResult};

/// Validating fluent constructor for [`Sim`].
///
/// # Required inputs
///
/// - [`RunConfig`] — seed, iteration count, step-merging limits, …
/// - [`World`] — from [`rd_grid::WorldBuilder`]
/// - [`ReactionTable`] — from the external reaction-network compiler
///
/// # Example
///
/// ```rust,ignore
/// let world = WorldBuilder::new(partition).species(table).walls(walls).build()?;
/// let mut sim = SimBuilder::new(config, world, reactions)
///     .barriers(release_times)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: RunConfig,
    world: World,
    reactions: ReactionTable,
    barriers: Vec<f64>,
}

impl SimBuilder {
    pub fn new(config: RunConfig, world: World, reactions: ReactionTable) -> Self {
        Self {
            config,
            world,
            reactions,
            barriers: Vec::new(),
        }
    }

    /// Times owned by external subsystems (releases, checkpoints) that no
    /// molecule step may cross.  Sorted internally.
    pub fn barriers(mut self, mut barriers: Vec<f64>) -> Self {
        barriers.sort_by(|a, b| a.partial_cmp(b).expect("NaN barrier time"));
        self.barriers = barriers;
        self
    }

    /// Validate the configuration and cross-references, derive the species
    /// collision flags, and assemble the `Sim`.
    pub fn build(mut self) -> SimResult<Sim> {
        if !(self.config.max_timestep > 0.0) {
            return Err(SimError::Config(format!(
                "max_timestep must be positive, got {}",
                self.config.max_timestep
            )));
        }
        if !(self.config.multistep_percentile > 0.0) {
            return Err(SimError::Config(format!(
                "multistep_percentile must be positive, got {}",
                self.config.multistep_percentile
            )));
        }
        if self.reactions.rx_radius < 0.0 {
            return Err(SimError::Config(format!(
                "interaction radius must be non-negative, got {}",
                self.reactions.rx_radius
            )));
        }
        if self.barriers.iter().any(|b| !b.is_finite()) {
            return Err(SimError::Config("barrier times must be finite".into()));
        }

        // Every reactant and product must exist in the species table.
        let n_species = self.world.species.len();
        for rx in &self.reactions.reactions {
            for &s in rx.reactants.iter().chain(rx.pathways.iter().flat_map(|p| &p.products)) {
                if s.index() >= n_species {
                    return Err(SimError::Config(format!(
                        "reaction {} references unknown species {s}",
                        rx.id
                    )));
                }
            }
        }

        // Derive the collision fast-path flag from the bimolecular index.
        for sp in &mut self.world.species {
            sp.can_collide = self.reactions.species_can_collide(sp.id);
        }

        Ok(Sim::new(self.config, self.world, self.reactions, self.barriers))
    }
}
