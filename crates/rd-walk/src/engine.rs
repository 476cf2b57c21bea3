//! The collision-resolution loop: one diffusion step for one molecule.

use rd_core::{MoleculeId, RdError, ReactionId, RunConfig, SimRng, SpeciesId, EPS};
use rd_grid::{Location, SurfaceClass, World};
use rd_react::{test_bimolecular, test_many, Reaction, ReactionTable};

use crate::collide::{collide_mol, collide_wall, exit_subvolume, sort_candidates, Collision, Target, WallHit};
use crate::tables::StepTables;
use crate::{Counters, WalkResult};

/// What became of the molecule after one walk call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepResult {
    /// The molecule survives; its clock advanced by `elapsed` timesteps.
    /// The caller reschedules it in its (possibly new) subvolume.
    Moved { elapsed: f64 },
    /// Consumed: reacted away, absorbed by a wall, or lost over the world
    /// edge.  The tombstoned scheduler entry still surfaces later.
    Gone,
}

/// Reusable per-walk scratch space.  Owned by the driver so the buffers'
/// capacity survives across calls.
#[derive(Default)]
pub struct WalkScratch {
    candidates: Vec<Collision>,
    rx_ids: Vec<ReactionId>,
    order: Vec<ReactionId>,
    scalings: Vec<f64>,
}

impl WalkScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Move one volume molecule by one (possibly merged) diffusion step, at most
/// `max_time` timesteps long.
///
/// Samples a displacement, ray-traces it through the subvolume grid, and
/// resolves collisions in time order: molecule candidates go to the reaction
/// sampler, walls reflect/absorb/pass, boundary crossings migrate.  The loop
/// is explicit — each reflection or migration updates the step state and
/// re-traces the remainder, so arbitrarily long bounce chains run in constant
/// stack space.
pub fn diffuse_molecule(
    world: &mut World,
    reactions: &mut ReactionTable,
    tables: &StepTables,
    config: &RunConfig,
    counters: &mut Counters,
    scratch: &mut WalkScratch,
    rng: &mut SimRng,
    id: MoleculeId,
    max_time: f64,
) -> WalkResult<StepResult> {
    let (species, start_pos, start_sv, now) = {
        let m = world
            .arena
            .get(id)
            .ok_or(RdError::MoleculeNotFound(id))?;
        let pos = m.loc.volume_pos().ok_or_else(|| {
            RdError::Config(format!("surface molecule {id} dispatched to the walk engine"))
        })?;
        (m.species, pos, m.subvol, m.t)
    };
    let sp = &world.species[species.index()];
    let (space_step, time_step, may_collide) = (sp.space_step, sp.time_step, sp.can_collide);

    // Merge elementary steps only while the expected displacement stays well
    // short of the nearest obstacle.
    let want = max_time / time_step;
    let steps = if want <= 1.0 {
        want
    } else {
        let obstacle2 = nearest_obstacle2(world, reactions, id, start_pos, start_sv, species, may_collide);
        let reach2 = (config.multistep_percentile * space_step).powi(2);
        let cap = if reach2 > 0.0 { (obstacle2 / reach2).max(1.0) } else { 1.0 };
        want.min(cap)
    };
    // Time-limited walks report exactly `max_time` so the driver's deadline
    // bookkeeping sees no rounding residue.
    let elapsed = if steps >= want { max_time } else { steps * time_step };
    let scaling = 1.0 / steps;

    let mut pos = start_pos;
    let mut sv = start_sv;
    let mut disp = tables.displacement(space_step, steps, config.fully_random_directions, rng);
    // Path length walked so far this call; committed on exit, zeroed on redo.
    let mut traveled = 0.0;

    'walk: loop {
        scratch.candidates.clear();

        let (lo, hi) = world.partition.bounds(sv);
        if let Some((t, face)) = exit_subvolume(pos, disp, lo, hi) {
            scratch.candidates.push(Collision {
                t,
                target: Target::Boundary(face),
                pt: pos + disp * t,
            });
        }

        let mut redo = false;
        for &wid in &world.subvolumes[sv.index()].walls {
            counters.ray_wall_tests += 1;
            match collide_wall(pos, disp, &world.walls[wid.index()]) {
                WallHit::Hit { t, pt } => scratch.candidates.push(Collision {
                    t,
                    target: Target::Wall(wid),
                    pt,
                }),
                WallHit::Miss => {}
                WallHit::Redo => {
                    redo = true;
                    break;
                }
            }
        }
        if redo {
            // Ambiguous near-edge hit: throw the whole trace away and walk
            // again from the starting point with a fresh displacement.
            counters.redo_retries += 1;
            if sv != start_sv {
                world.migrate(id, start_sv)?;
            }
            pos = start_pos;
            sv = start_sv;
            traveled = 0.0;
            disp = tables.displacement(space_step, steps, config.fully_random_directions, rng);
            continue 'walk;
        }

        if may_collide {
            let subvol = &world.subvolumes[sv.index()];
            for (&other_sp, list) in &subvol.mols {
                if !reactions.can_collide(species, other_sp) {
                    continue;
                }
                for &other in list {
                    if other == id {
                        continue;
                    }
                    let target = match world.arena.get(other).map(|m| m.loc) {
                        Some(Location::Volume(p)) => p,
                        _ => continue,
                    };
                    counters.ray_mol_tests += 1;
                    if let Some((t, pt)) = collide_mol(pos, disp, target, reactions.rx_radius) {
                        scratch.candidates.push(Collision {
                            t,
                            target: Target::Molecule(other),
                            pt,
                        });
                    }
                }
            }
        }

        sort_candidates(&mut scratch.candidates);

        for k in 0..scratch.candidates.len() {
            let c = scratch.candidates[k];
            match c.target {
                Target::Molecule(other) => {
                    let other_species = match world.arena.get(other) {
                        Some(m) => m.species,
                        None => continue, // consumed earlier this iteration
                    };
                    if let Some((rid, pathway)) =
                        sample_collision(reactions, scratch, species, other_species, scaling, now, config, rng)?
                    {
                        counters.bimolecular_fired += 1;
                        counters.distance_traveled += traveled + disp.length() * c.t;
                        fire_bimolecular(world, reactions, id, other, rid, pathway, c.pt, now + elapsed)?;
                        return Ok(StepResult::Gone);
                    }
                    // No reaction: the pair passes through each other.
                }
                Target::Wall(wid) => match world.walls[wid.index()].class {
                    SurfaceClass::Transparent => {}
                    SurfaceClass::Absorb => {
                        counters.distance_traveled += traveled + disp.length() * c.t;
                        world.destroy_molecule(id)?;
                        counters.absorbed += 1;
                        return Ok(StepResult::Gone);
                    }
                    SurfaceClass::Reflect => {
                        // Land a hair short of the wall so the retrace starts
                        // strictly on the origin side of the plane.
                        let t_hit = c.t * (1.0 - EPS);
                        let normal = world.walls[wid.index()].normal;
                        traveled += disp.length() * t_hit;
                        pos = pos + disp * t_hit;
                        disp = (disp * (1.0 - t_hit)).reflect(normal);
                        counters.reflections += 1;
                        continue 'walk;
                    }
                },
                Target::Boundary(face) => {
                    traveled += disp.length() * c.t;
                    pos = c.pt;
                    disp = disp * (1.0 - c.t);
                    match world.partition.neighbor(sv, face) {
                        Some(n) => {
                            world.migrate(id, n)?;
                            sv = n;
                            counters.boundary_crossings += 1;
                            continue 'walk;
                        }
                        None => {
                            counters.distance_traveled += traveled;
                            world.destroy_molecule(id)?;
                            counters.world_edge_losses += 1;
                            return Ok(StepResult::Gone);
                        }
                    }
                }
            }
        }

        // Nothing intercepted the remainder of the step.
        traveled += disp.length();
        pos = pos + disp;
        break;
    }

    counters.diffusion_steps += 1;
    counters.distance_traveled += traveled;
    let m = world
        .arena
        .get_mut(id)
        .ok_or(RdError::MoleculeNotFound(id))?;
    m.loc = Location::Volume(pos);
    Ok(StepResult::Moved { elapsed })
}

/// Squared distance from `pos` to the nearest potential obstacle: a reactive
/// neighbor molecule or the closest subvolume boundary plane.
fn nearest_obstacle2(
    world: &World,
    reactions: &ReactionTable,
    id: MoleculeId,
    pos: rd_core::Vec3,
    sv: rd_core::SubvolumeId,
    species: SpeciesId,
    may_collide: bool,
) -> f64 {
    let (lo, hi) = world.partition.bounds(sv);
    let gap = (pos.x - lo.x)
        .min(hi.x - pos.x)
        .min(pos.y - lo.y)
        .min(hi.y - pos.y)
        .min(pos.z - lo.z)
        .min(hi.z - pos.z)
        .max(0.0);
    let mut best = gap * gap;

    if may_collide {
        for (&other_sp, list) in &world.subvolumes[sv.index()].mols {
            if !reactions.can_collide(species, other_sp) {
                continue;
            }
            for &other in list {
                if other == id {
                    continue;
                }
                if let Some(Location::Volume(p)) = world.arena.get(other).map(|m| m.loc) {
                    best = best.min(pos.distance2(p));
                }
            }
        }
    }
    best
}

/// Run the reaction sampler for one molecule/molecule collision.  Applies
/// pending rate-schedule updates first, then draws: one reaction goes through
/// [`test_bimolecular`], several competitors share a draw via [`test_many`].
fn sample_collision(
    reactions: &mut ReactionTable,
    scratch: &mut WalkScratch,
    a: SpeciesId,
    b: SpeciesId,
    scaling: f64,
    now: f64,
    config: &RunConfig,
    rng: &mut SimRng,
) -> WalkResult<Option<(ReactionId, usize)>> {
    scratch.rx_ids.clear();
    scratch.rx_ids.extend_from_slice(reactions.bimolecular(a, b));
    if scratch.rx_ids.is_empty() {
        return Ok(None);
    }
    for &rid in &scratch.rx_ids {
        reactions
            .get_mut(rid)
            .update_probs(now, config.overprob_threshold, config.overprob_policy)?;
    }

    if scratch.rx_ids.len() == 1 {
        let rid = scratch.rx_ids[0];
        return Ok(test_bimolecular(reactions.get_mut(rid), scaling, rng).map(|pw| (rid, pw)));
    }

    // Competing reactions: collect disjoint mutable borrows in table order.
    // The `&mut` slice cannot outlive the call, so it alone stays local.
    scratch.order.clear();
    let mut refs: Vec<&mut Reaction> = Vec::with_capacity(scratch.rx_ids.len());
    for (i, rx) in reactions.reactions.iter_mut().enumerate() {
        if scratch.rx_ids.iter().any(|r| r.index() == i) {
            scratch.order.push(rx.id);
            refs.push(rx);
        }
    }
    scratch.scalings.clear();
    scratch.scalings.resize(refs.len(), scaling);
    Ok(test_many(&mut refs, &scratch.scalings, rng).map(|(i, pw)| (scratch.order[i], pw)))
}

/// Consume both reactants and place the chosen pathway's products at the
/// collision point, scheduled at the end of the acting molecule's step.
fn fire_bimolecular(
    world: &mut World,
    reactions: &ReactionTable,
    a: MoleculeId,
    b: MoleculeId,
    rid: ReactionId,
    pathway: usize,
    pt: rd_core::Vec3,
    t_products: f64,
) -> WalkResult<()> {
    world.destroy_molecule(a)?;
    world.destroy_molecule(b)?;
    for &product in &reactions.get(rid).pathways[pathway].products {
        world.place_molecule(product, pt, t_products)?;
    }
    Ok(())
}
