//! Fluent builder for constructing a [`World`].

use rd_core::{RdError, RdResult, Species, SubvolumeId};
use rd_schedule::ScheduleQueue;

use crate::{Partition, Subvolume, Wall, World};

/// Per-subvolume scheduler geometry.
///
/// The finest bucket is one global timestep wide; the horizon should cover
/// the whole run (`iterations` timesteps) so that quiet molecules park in a
/// coarse wheel instead of being re-handled every rotation.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerParams {
    pub dt_min: f64,
    pub dt_max: f64,
    pub slots: usize,
    pub start: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            dt_min: 1.0,
            dt_max: 100.0,
            slots: 100,
            start: 0.0,
        }
    }
}

/// Validating fluent constructor for [`World`].
///
/// # Example
///
/// ```rust,ignore
/// let world = WorldBuilder::new(partition)
///     .species(species_table)
///     .walls(walls)
///     .scheduler(SchedulerParams { dt_max: cfg.iterations as f64, ..Default::default() })
///     .build()?;
/// ```
pub struct WorldBuilder {
    partition: Partition,
    walls: Vec<Wall>,
    species: Vec<Species>,
    sched: SchedulerParams,
}

impl WorldBuilder {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            walls: Vec::new(),
            species: Vec::new(),
            sched: SchedulerParams::default(),
        }
    }

    /// Supply the wall list.  Wall IDs must equal their index in the vec.
    pub fn walls(mut self, walls: Vec<Wall>) -> Self {
        self.walls = walls;
        self
    }

    /// Supply the species table.  Species IDs must equal their index.
    pub fn species(mut self, species: Vec<Species>) -> Self {
        self.species = species;
        self
    }

    /// Override the per-subvolume scheduler geometry.
    pub fn scheduler(mut self, params: SchedulerParams) -> Self {
        self.sched = params;
        self
    }

    /// Validate and assemble the world.
    pub fn build(self) -> RdResult<World> {
        validate_axis("x", &self.partition.x_parts)?;
        validate_axis("y", &self.partition.y_parts)?;
        validate_axis("z", &self.partition.z_parts)?;

        for (i, sp) in self.species.iter().enumerate() {
            if sp.id.index() != i {
                return Err(RdError::Config(format!(
                    "species table out of order: entry {i} has id {}",
                    sp.id
                )));
            }
        }
        for (i, w) in self.walls.iter().enumerate() {
            if w.id.index() != i {
                return Err(RdError::Config(format!(
                    "wall list out of order: entry {i} has id {}",
                    w.id
                )));
            }
        }

        let n = self.partition.subvolume_count();
        let mut subvolumes = Vec::with_capacity(n);
        for i in 0..n {
            let queue = ScheduleQueue::new(
                self.sched.dt_min,
                self.sched.dt_max,
                self.sched.slots,
                self.sched.start,
            )
            .map_err(|e| RdError::Config(e.to_string()))?;
            subvolumes.push(Subvolume::new(SubvolumeId(i as u32), queue));
        }

        // Conservative wall assignment: every subvolume the wall's AABB
        // overlaps gets the wall in its list.
        for wall in &self.walls {
            let (lo, hi) = wall.aabb();
            let (ix0, ix1) = cell_range(&self.partition.x_parts, lo.x, hi.x);
            let (iy0, iy1) = cell_range(&self.partition.y_parts, lo.y, hi.y);
            let (iz0, iz1) = cell_range(&self.partition.z_parts, lo.z, hi.z);
            for ix in ix0..=ix1 {
                for iy in iy0..=iy1 {
                    for iz in iz0..=iz1 {
                        let sv = self.partition.id_of(ix, iy, iz);
                        subvolumes[sv.index()].walls.push(wall.id);
                    }
                }
            }
        }

        Ok(World {
            partition: self.partition,
            walls: self.walls,
            subvolumes,
            species: self.species,
            arena: crate::MoleculeArena::new(),
        })
    }
}

fn validate_axis(name: &str, parts: &[f64]) -> RdResult<()> {
    if parts.len() < 2 {
        return Err(RdError::Config(format!(
            "{name}-axis partition needs at least 2 boundaries, got {}",
            parts.len()
        )));
    }
    if !parts.windows(2).all(|w| w[0] < w[1]) {
        return Err(RdError::Config(format!(
            "{name}-axis partition boundaries must be strictly ascending"
        )));
    }
    Ok(())
}

/// Inclusive cell-index range of `[lo, hi]` along one axis, clamped to the
/// world.  A range entirely outside the world collapses to an empty-ish
/// clamped range; callers only use this for walls that intersect the world.
fn cell_range(parts: &[f64], lo: f64, hi: f64) -> (usize, usize) {
    let n = parts.len() - 1;
    let first = parts.partition_point(|&c| c <= lo).saturating_sub(1).min(n - 1);
    let last = parts.partition_point(|&c| c < hi).saturating_sub(1).min(n - 1);
    (first, last.max(first))
}
