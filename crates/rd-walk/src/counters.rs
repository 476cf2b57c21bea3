//! Aggregate event counters.
//!
//! Accumulated by the walk engine and the driver through a `&mut` borrow;
//! exposed read-only to observers at snapshot time.

/// Running totals over the whole simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    /// Diffusion steps taken (one per `diffuse_molecule` call that moved).
    pub diffusion_steps: u64,

    /// Ray/wall intersection tests performed.
    pub ray_wall_tests: u64,

    /// Ray/molecule closest-approach tests performed.
    pub ray_mol_tests: u64,

    /// Specular reflections off walls.
    pub reflections: u64,

    /// Subvolume boundary crossings (migrations).
    pub boundary_crossings: u64,

    /// Walks re-sampled after an ambiguous near-edge wall hit.
    pub redo_retries: u64,

    /// Bimolecular reactions fired by the walk engine.
    pub bimolecular_fired: u64,

    /// Unimolecular reactions fired by the driver.
    pub unimolecular_fired: u64,

    /// Molecules destroyed by absorbing walls.
    pub absorbed: u64,

    /// Molecules lost over the edge of the partitioned world.
    pub world_edge_losses: u64,

    /// Total Euclidean path length walked, summed over every traced segment
    /// (reflection legs included; discarded retraces are not counted).
    pub distance_traveled: f64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total reactions of any arity.
    #[inline]
    pub fn reactions_fired(&self) -> u64 {
        self.bimolecular_fired + self.unimolecular_fired
    }
}
