//! The `Sim` struct and its iteration loop.

use rd_core::{MoleculeId, RdError, ReactionId, RunConfig, SimRng, SpeciesId, Vec3};
use rd_grid::{Location, World};
use rd_react::{which_unimolecular, ReactionTable};
use rd_walk::{diffuse_molecule, Counters, StepResult, StepTables, WalkScratch};

use crate::{SimObserver, SimResult};

/// The timestep driver.
///
/// Owns the world, the reaction table, the sampling tables and the master
/// RNG; one iteration of [`run`](Self::run) advances the simulation by one
/// global timestep.  Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: RunConfig,
    pub world: World,
    pub reactions: ReactionTable,
    pub tables: StepTables,
    pub counters: Counters,

    /// Sorted times the external release/checkpoint subsystems own.  No
    /// molecule step may cross one.
    pub barriers: Vec<f64>,

    iteration: u64,
    rng: SimRng,
    scratch: WalkScratch,
}

impl Sim {
    pub(crate) fn new(
        config: RunConfig,
        world: World,
        reactions: ReactionTable,
        barriers: Vec<f64>,
    ) -> Self {
        let rng = SimRng::new(config.seed);
        Self {
            config,
            world,
            reactions,
            tables: StepTables::new(),
            counters: Counters::new(),
            barriers,
            iteration: 0,
            rng,
            scratch: WalkScratch::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Completed iterations so far.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Current simulation time, in timesteps.
    #[inline]
    pub fn time(&self) -> f64 {
        self.iteration as f64
    }

    /// Inject a molecule mid-run (the external release subsystem's entry
    /// point; also used by tests).
    pub fn place_molecule(
        &mut self,
        species: SpeciesId,
        pos: Vec3,
        t: f64,
    ) -> SimResult<MoleculeId> {
        Ok(self.world.place_molecule(species, pos, t)?)
    }

    /// Run from the current iteration to `config.iterations`.
    ///
    /// Observer hooks fire at every iteration boundary; on an error the
    /// observer's `on_sim_end` still runs so pending output can be flushed.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.iteration < self.config.iterations {
            self.observed_iteration(observer)?;
        }
        observer.on_sim_end(self.iteration);
        Ok(())
    }

    /// Run exactly `n` iterations from the current position (ignores
    /// `config.iterations`).  Useful for tests and incremental stepping.
    pub fn run_iterations<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_iteration(observer)?;
        }
        observer.on_sim_end(self.iteration);
        Ok(())
    }

    fn observed_iteration<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let iter = self.iteration;
        observer.on_iteration_start(iter);
        if let Err(e) = self.step_iteration() {
            log::error!("iteration {iter} failed: {e}");
            observer.on_sim_end(iter);
            return Err(e);
        }
        observer.on_iteration_end(iter, self.world.arena.len());
        observer.on_snapshot(iter, &self.counters, &self.world);
        Ok(())
    }

    // ── The iteration loop ────────────────────────────────────────────────

    /// Advance every subvolume's wheel by one window and drain it.
    ///
    /// Draining is exhaustive: a molecule whose updated clock still falls
    /// inside the open window is re-admitted to the ready list and processed
    /// again this iteration, so fast species take several elementary steps
    /// per global timestep.
    pub fn step_iteration(&mut self) -> SimResult<()> {
        for i in 0..self.world.subvolumes.len() {
            {
                let q = &mut self.world.subvolumes[i].queue;
                q.advance();
                q.sort_ready();
            }
            while let Some(entry) = self.world.subvolumes[i].queue.next() {
                self.process_due(entry.item)?;
            }
        }
        self.iteration += 1;
        Ok(())
    }

    /// Handle one scheduler entry surfacing.
    fn process_due(&mut self, id: MoleculeId) -> SimResult<()> {
        // A tombstoned entry is the destroyed molecule's last reference:
        // recycle the arena slot and move on.
        if self.world.arena.is_tombstone(id) {
            self.world.arena.reclaim(id);
            return Ok(());
        }

        let (species, t, t2, loc) = {
            let m = self
                .world
                .arena
                .get(id)
                .ok_or(RdError::MoleculeNotFound(id))?;
            (m.species, m.t, m.t2, m.loc)
        };

        // Sample the unimolecular deadline on first contact.
        let t2 = match t2 {
            Some(v) => v,
            None => {
                let v = self.sample_deadline(species, t)?;
                if let Some(m) = self.world.arena.get_mut(id) {
                    m.t2 = Some(v);
                }
                v
            }
        };

        // Deadline reached: fire from wherever diffusion carried the
        // reactant.  The legs below never step past `t2`, so equality here
        // is exact.
        if t2 <= t {
            self.fire_unimolecular(id, species, loc, t2)?;
            return Ok(());
        }

        let limit = self.step_budget(t);
        let deadline_capped = t2 - t <= limit;
        let budget = limit.min(t2 - t);

        if self.world.species(species).diffuses() && matches!(loc, Location::Volume(_)) {
            let outcome = diffuse_molecule(
                &mut self.world,
                &mut self.reactions,
                &self.tables,
                &self.config,
                &mut self.counters,
                &mut self.scratch,
                &mut self.rng,
                id,
                budget,
            )?;
            match outcome {
                StepResult::Moved { elapsed } => {
                    // Snap onto the deadline when the walk consumed the whole
                    // leg, so no rounding residue keeps the firing test false.
                    let new_t = if deadline_capped && elapsed >= budget {
                        t2
                    } else {
                        t + elapsed
                    };
                    self.reschedule(id, new_t)?;
                }
                // Consumed during its own step: this entry was already
                // popped, so reclaim right away.
                StepResult::Gone => self.world.arena.reclaim(id),
            }
        } else {
            // Surface or immobile molecule: nothing to do until its deadline
            // or the end of the budget.
            let new_t = if deadline_capped { t2 } else { t + budget };
            self.reschedule(id, new_t)?;
        }
        Ok(())
    }

    /// Largest time a step starting at `t` may consume, before the caller
    /// also caps it at the molecule's unimolecular deadline.
    fn step_budget(&self, t: f64) -> f64 {
        let mut budget = self.config.max_timestep;
        let i = self.barriers.partition_point(|&b| b <= t);
        if let Some(&b) = self.barriers.get(i) {
            budget = budget.min(b - t);
        }
        budget
    }

    fn reschedule(&mut self, id: MoleculeId, new_t: f64) -> SimResult<()> {
        let sv = {
            let m = self
                .world
                .arena
                .get_mut(id)
                .ok_or(RdError::MoleculeNotFound(id))?;
            m.t = new_t;
            m.subvol
        };
        self.world.subvolumes[sv.index()]
            .queue
            .insert_or_ready(new_t, id)?;
        Ok(())
    }

    // ── Unimolecular chemistry ────────────────────────────────────────────

    /// Absolute unimolecular deadline for a molecule of `species` at `t`.
    /// Infinity when no unimolecular reaction applies.
    fn sample_deadline(&mut self, species: SpeciesId, t: f64) -> SimResult<f64> {
        let rids: Vec<ReactionId> = self.reactions.unimolecular(species).to_vec();
        if rids.is_empty() {
            return Ok(f64::INFINITY);
        }
        let mut k_tot = 0.0;
        for &rid in &rids {
            let rx = self.reactions.get_mut(rid);
            rx.update_probs(t, self.config.overprob_threshold, self.config.overprob_policy)?;
            k_tot += rx.total();
        }
        if k_tot <= 0.0 {
            return Ok(f64::INFINITY);
        }
        Ok(t + self.rng.exponential(k_tot))
    }

    /// Fire the unimolecular reaction of `id` at its deadline `t2`:
    /// pick the reaction (weighted by totals when several compete), pick the
    /// pathway, destroy the reactant and place the products in its place.
    fn fire_unimolecular(
        &mut self,
        id: MoleculeId,
        species: SpeciesId,
        loc: Location,
        t2: f64,
    ) -> SimResult<()> {
        let rids: Vec<ReactionId> = self.reactions.unimolecular(species).to_vec();
        debug_assert!(!rids.is_empty(), "finite deadline without a reaction");

        let totals: Vec<f64> = rids.iter().map(|&r| self.reactions.get(r).total()).collect();
        let k_tot: f64 = totals.iter().sum();
        let rid = if rids.len() == 1 || k_tot <= 0.0 {
            rids[0]
        } else {
            let mut pick = self.rng.uniform() * k_tot;
            let mut chosen = rids[rids.len() - 1];
            for (&r, &w) in rids.iter().zip(&totals) {
                if pick <= w {
                    chosen = r;
                    break;
                }
                pick -= w;
            }
            chosen
        };
        let pathway = which_unimolecular(self.reactions.get(rid), &mut self.rng);
        let products = self.reactions.get(rid).pathways[pathway].products.clone();

        let pos = self.product_position(loc);
        self.world.destroy_molecule(id)?;
        // This entry was the last reference.
        self.world.arena.reclaim(id);
        self.counters.unimolecular_fired += 1;

        for p in products {
            self.world.place_molecule(p, pos, t2)?;
        }
        Ok(())
    }

    /// World-space point where a reactant's products appear.
    fn product_position(&self, loc: Location) -> Vec3 {
        match loc {
            Location::Volume(p) => p,
            Location::Surface { wall, u, v } => {
                let w = &self.world.walls[wall.index()];
                w.vert[0] + w.unit_u * u + w.unit_v * v
            }
        }
    }

    /// Subvolume currently owning `id` — test hook.
    #[cfg(test)]
    pub(crate) fn subvol_of(&self, id: MoleculeId) -> rd_core::SubvolumeId {
        self.world.arena.get(id).expect("live molecule").subvol
    }
}
