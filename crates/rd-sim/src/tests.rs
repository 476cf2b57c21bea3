use rd_core::{MoleculeId, ReactionId, RunConfig, Species, SpeciesId, SpeciesKind, Vec3, WallId};
use rd_grid::{Partition, SurfaceClass, Wall, WorldBuilder};
use rd_react::{Pathway, RateUpdate, Reaction, ReactionTable, ReactError};

use crate::{NoopObserver, Sim, SimBuilder, SimError, SimObserver};

fn uniform_partition(n: usize) -> Partition {
    let parts: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
    Partition {
        x_parts: parts.clone(),
        y_parts: parts.clone(),
        z_parts: parts,
    }
}

fn vol_species(id: u16, d: f64) -> Species {
    Species::new(SpeciesId(id), format!("sp{id}"), SpeciesKind::Volume, d)
}

/// 12 triangles forming the closed axis-aligned cube `[lo, hi]³`.
fn cube_walls(lo: f64, hi: f64, class: SurfaceClass) -> Vec<Wall> {
    let c = |x: u8, y: u8, z: u8| {
        Vec3::new(
            if x == 0 { lo } else { hi },
            if y == 0 { lo } else { hi },
            if z == 0 { lo } else { hi },
        )
    };
    let quads: [[(u8, u8, u8); 4]; 6] = [
        [(0, 0, 0), (0, 0, 1), (0, 1, 1), (0, 1, 0)],
        [(1, 0, 0), (1, 1, 0), (1, 1, 1), (1, 0, 1)],
        [(0, 0, 0), (1, 0, 0), (1, 0, 1), (0, 0, 1)],
        [(0, 1, 0), (0, 1, 1), (1, 1, 1), (1, 1, 0)],
        [(0, 0, 0), (0, 1, 0), (1, 1, 0), (1, 0, 0)],
        [(0, 0, 1), (1, 0, 1), (1, 1, 1), (0, 1, 1)],
    ];
    let mut walls = Vec::with_capacity(12);
    for q in quads {
        let [a, b, cc, d] = q.map(|(x, y, z)| c(x, y, z));
        let id = walls.len() as u32;
        walls.push(Wall::new(WallId(id), a, b, cc, class).unwrap());
        walls.push(Wall::new(WallId(id + 1), a, cc, d, class).unwrap());
    }
    walls
}

fn sim_with(
    config: RunConfig,
    cells: usize,
    walls: Vec<Wall>,
    species: Vec<Species>,
    reactions: ReactionTable,
) -> Sim {
    let world = WorldBuilder::new(uniform_partition(cells))
        .walls(walls)
        .species(species)
        .build()
        .unwrap();
    SimBuilder::new(config, world, reactions).build().unwrap()
}

fn decay_reaction(reactant: u16, product: Option<u16>, rate: f64) -> ReactionTable {
    let products = product.map(|p| vec![SpeciesId(p)]).unwrap_or_default();
    let rx = Reaction::new(
        ReactionId(0),
        vec![SpeciesId(reactant)],
        vec![Pathway { rate, products }],
    );
    ReactionTable::new(vec![rx], 0.0).unwrap()
}

mod building {
    use super::*;

    #[test]
    fn rejects_reactions_over_unknown_species() {
        let world = WorldBuilder::new(uniform_partition(1))
            .species(vec![vol_species(0, 0.0)])
            .build()
            .unwrap();
        let err = SimBuilder::new(RunConfig::default(), world, decay_reaction(5, None, 0.1)).build();
        assert!(matches!(err, Err(SimError::Config(_))));
    }

    #[test]
    fn rejects_non_positive_max_timestep() {
        let world = WorldBuilder::new(uniform_partition(1))
            .species(vec![vol_species(0, 0.0)])
            .build()
            .unwrap();
        let config = RunConfig { max_timestep: 0.0, ..Default::default() };
        let err = SimBuilder::new(config, world, ReactionTable::empty()).build();
        assert!(matches!(err, Err(SimError::Config(_))));
    }

    #[test]
    fn derives_collision_flags_from_the_table() {
        let species = vec![vol_species(0, 1e-3), vol_species(1, 1e-3), vol_species(2, 1e-3)];
        let rx = Reaction::new(
            ReactionId(0),
            vec![SpeciesId(0), SpeciesId(1)],
            vec![Pathway { rate: 0.5, products: Vec::new() }],
        );
        let reactions = ReactionTable::new(vec![rx], 0.01).unwrap();
        let sim = sim_with(RunConfig::default(), 1, Vec::new(), species, reactions);

        assert!(sim.world.species(SpeciesId(0)).can_collide);
        assert!(sim.world.species(SpeciesId(1)).can_collide);
        assert!(!sim.world.species(SpeciesId(2)).can_collide);
    }
}

mod scheduling {
    use super::*;

    #[test]
    fn tombstoned_entry_reclaims_the_slot() {
        let mut sim = sim_with(
            RunConfig::default(),
            1,
            Vec::new(),
            vec![vol_species(0, 0.0)],
            ReactionTable::empty(),
        );
        let id = sim.place_molecule(SpeciesId(0), Vec3::new(0.5, 0.5, 0.5), 0.0).unwrap();
        sim.world.destroy_molecule(id).unwrap();
        assert!(sim.world.arena.is_tombstone(id));

        // The dead molecule's entry surfaces this iteration and frees the
        // slot; the next allocation reuses it.
        sim.step_iteration().unwrap();
        let reused = sim.place_molecule(SpeciesId(0), Vec3::new(0.3, 0.3, 0.3), 1.0).unwrap();
        assert_eq!(reused, id);
        assert_eq!(sim.world.arena.len(), 1);
    }

    #[test]
    fn every_molecule_steps_once_per_iteration() {
        let config = RunConfig { seed: 3, iterations: 1, ..Default::default() };
        let mut sim = sim_with(
            config,
            1,
            cube_walls(0.05, 0.95, SurfaceClass::Reflect),
            vec![vol_species(0, 1e-3)],
            ReactionTable::empty(),
        );
        let ids: Vec<MoleculeId> = (0..20)
            .map(|i| {
                let x = 0.2 + 0.03 * i as f64;
                sim.place_molecule(SpeciesId(0), Vec3::new(x, 0.5, 0.5), 0.0).unwrap()
            })
            .collect();

        sim.run(&mut NoopObserver).unwrap();

        for id in ids {
            let m = sim.world.arena.get(id).expect("shell keeps everything alive");
            assert!((m.t - 1.0).abs() < 1e-12, "clock at {}", m.t);
        }
    }

    #[test]
    fn migrating_molecule_stays_in_exactly_one_list() {
        let config = RunConfig { seed: 11, iterations: 50, ..Default::default() };
        let mut sim = sim_with(
            config,
            2,
            cube_walls(0.1, 0.9, SurfaceClass::Reflect),
            vec![vol_species(0, 2e-3)],
            ReactionTable::empty(),
        );
        let id = sim.place_molecule(SpeciesId(0), Vec3::new(0.45, 0.45, 0.45), 0.0).unwrap();

        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.counters.boundary_crossings > 0, "never migrated");

        let home = sim.subvol_of(id);
        let mut found = 0;
        for sv in &sim.world.subvolumes {
            let hits = sv.mols_of(SpeciesId(0)).iter().filter(|&&m| m == id).count();
            if sv.id == home {
                assert_eq!(hits, 1);
            } else {
                assert_eq!(hits, 0, "stale entry in {}", sv.id);
            }
            found += hits;
        }
        assert_eq!(found, 1);
    }
}

mod chemistry {
    use super::*;

    #[test]
    fn decay_conserves_and_depletes() {
        // A → B at 0.05 per timestep; neither species moves.
        let config = RunConfig { seed: 7, iterations: 200, ..Default::default() };
        let species = vec![vol_species(0, 0.0), vol_species(1, 0.0)];
        let mut sim = sim_with(config, 1, Vec::new(), species, decay_reaction(0, Some(1), 0.05));

        for i in 0..200u32 {
            let x = 0.05 + 0.9 * (i as f64 / 200.0);
            sim.place_molecule(SpeciesId(0), Vec3::new(x, 0.5, 0.5), 0.0).unwrap();
        }

        sim.run(&mut NoopObserver).unwrap();

        let pop_a = sim.world.species(SpeciesId(0)).population;
        let pop_b = sim.world.species(SpeciesId(1)).population;
        assert_eq!(pop_a + pop_b, 200, "decay must conserve total count");
        // Expected survivors: 200·e^(−0.05·200) ≈ 0.009.
        assert!(pop_a < 10, "A population barely decayed: {pop_a}");
        assert_eq!(sim.counters.unimolecular_fired, 200 - pop_a);
        assert_eq!(sim.world.arena.len() as u64, 200);
    }

    #[test]
    fn reactant_diffuses_up_to_its_deadline() {
        // Fast decay of a diffusing species: the reactant walks the leg up
        // to its deadline before firing, so the product appears at the
        // diffused position, not at the release point.
        let config = RunConfig { seed: 19, iterations: 2, ..Default::default() };
        let species = vec![vol_species(0, 1e-3), vol_species(1, 0.0)];
        let mut sim = sim_with(
            config,
            1,
            cube_walls(0.05, 0.95, SurfaceClass::Reflect),
            species,
            decay_reaction(0, Some(1), 50.0),
        );
        let start = Vec3::new(0.5, 0.5, 0.5);
        sim.place_molecule(SpeciesId(0), start, 0.0).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.counters.unimolecular_fired, 1);
        assert_eq!(sim.world.species(SpeciesId(1)).population, 1);
        let (_, product) = sim
            .world
            .arena
            .iter_live()
            .find(|(_, m)| m.species == SpeciesId(1))
            .expect("decay product");
        let moved = product.pos().distance2(start);
        assert!(moved > 0.0, "product still at the release point");
    }

    #[test]
    fn overprobability_error_policy_stops_and_flushes() {
        #[derive(Default)]
        struct EndRecorder {
            ends: u32,
        }
        impl SimObserver for EndRecorder {
            fn on_sim_end(&mut self, _final_iteration: u64) {
                self.ends += 1;
            }
        }

        let config = RunConfig {
            iterations: 5,
            overprob_threshold: 1.0,
            overprob_policy: rd_core::OverprobPolicy::Error,
            ..Default::default()
        };
        let rx = Reaction::new(
            ReactionId(0),
            vec![SpeciesId(0)],
            vec![Pathway { rate: 0.5, products: Vec::new() }],
        )
        .with_schedule(vec![RateUpdate { time: 0.0, pathway: 0, value: 2.0 }]);
        let reactions = ReactionTable::new(vec![rx], 0.0).unwrap();

        let mut sim = sim_with(config, 1, Vec::new(), vec![vol_species(0, 0.0)], reactions);
        sim.place_molecule(SpeciesId(0), Vec3::new(0.5, 0.5, 0.5), 0.0).unwrap();

        let mut recorder = EndRecorder::default();
        let err = sim.run(&mut recorder);
        assert!(matches!(
            err,
            Err(SimError::React(ReactError::ProbabilityOverflow { .. }))
        ));
        assert_eq!(recorder.ends, 1, "on_sim_end must fire on the error path");
    }
}

mod driving {
    use super::*;

    #[test]
    fn steps_never_cross_a_barrier() {
        // max_timestep 5 would step 0 → 5 → 10; the barrier at 2.5 forces
        // 0 → 2.5 → 7.5 instead.
        let config = RunConfig {
            seed: 13,
            iterations: 3,
            max_timestep: 5.0,
            ..Default::default()
        };
        let world = WorldBuilder::new(uniform_partition(1))
            .species(vec![vol_species(0, 1e-4)])
            .build()
            .unwrap();
        let mut sim = SimBuilder::new(config, world, ReactionTable::empty())
            .barriers(vec![2.5])
            .build()
            .unwrap();
        let id = sim.place_molecule(SpeciesId(0), Vec3::new(0.5, 0.5, 0.5), 0.0).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        let m = sim.world.arena.get(id).expect("tiny steps stay in the world");
        assert!((m.t - 7.5).abs() < 1e-9, "clock at {}", m.t);
    }

    #[test]
    fn observer_sees_every_iteration() {
        #[derive(Default)]
        struct CountingObserver {
            starts: u64,
            ends: u64,
            snaps: u64,
            final_iteration: Option<u64>,
        }
        impl SimObserver for CountingObserver {
            fn on_iteration_start(&mut self, _i: u64) {
                self.starts += 1;
            }
            fn on_iteration_end(&mut self, _i: u64, _live: usize) {
                self.ends += 1;
            }
            fn on_snapshot(&mut self, _i: u64, _c: &crate::Counters, _w: &rd_grid::World) {
                self.snaps += 1;
            }
            fn on_sim_end(&mut self, final_iteration: u64) {
                self.final_iteration = Some(final_iteration);
            }
        }

        let config = RunConfig { iterations: 5, ..Default::default() };
        let mut sim = sim_with(config, 1, Vec::new(), vec![vol_species(0, 0.0)], ReactionTable::empty());
        sim.place_molecule(SpeciesId(0), Vec3::new(0.5, 0.5, 0.5), 0.0).unwrap();

        let mut obs = CountingObserver::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.starts, 5);
        assert_eq!(obs.ends, 5);
        assert_eq!(obs.snaps, 5);
        assert_eq!(obs.final_iteration, Some(5));
    }
}
