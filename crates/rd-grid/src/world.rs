//! `World` — the assembled simulation geometry plus all molecule state.
//!
//! Everything the walk engine and driver touch flows through `&mut World`;
//! there is no global state anywhere in the kernel.

use rd_core::{MoleculeId, RdError, RdResult, Species, SpeciesId, SubvolumeId, Vec3};

use crate::{Location, Molecule, MoleculeArena, Partition, Subvolume, Wall};

pub struct World {
    pub partition: Partition,
    pub walls: Vec<Wall>,
    pub subvolumes: Vec<Subvolume>,
    pub species: Vec<Species>,
    pub arena: MoleculeArena,
}

impl World {
    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn species(&self, id: SpeciesId) -> &Species {
        &self.species[id.index()]
    }

    #[inline]
    pub fn subvolume(&self, id: SubvolumeId) -> &Subvolume {
        &self.subvolumes[id.index()]
    }

    #[inline]
    pub fn subvolume_mut(&mut self, id: SubvolumeId) -> &mut Subvolume {
        &mut self.subvolumes[id.index()]
    }

    // ── Placement ─────────────────────────────────────────────────────────

    /// Create a volume molecule at `pos`, link it into the owning subvolume,
    /// and schedule it there at time `t`.
    ///
    /// This is the entry point the external release subsystem uses.
    pub fn place_molecule(
        &mut self,
        species: SpeciesId,
        pos: Vec3,
        t: f64,
    ) -> RdResult<MoleculeId> {
        if species.index() >= self.species.len() {
            return Err(RdError::SpeciesNotFound(species));
        }
        let sv = self
            .partition
            .locate(pos)
            .ok_or(RdError::OutOfWorld(pos))?;
        let id = self.arena.alloc(Molecule {
            species,
            loc: Location::Volume(pos),
            t,
            t2: None,
            subvol: sv,
            list_pos: 0,
        });
        self.link(id, sv);
        self.species[species.index()].population += 1;
        self.subvolumes[sv.index()]
            .queue
            .insert_or_ready(t, id)
            .map_err(|e| RdError::Config(e.to_string()))?;
        Ok(id)
    }

    /// Create a surface molecule at wall-local `(u, v)`.  It is linked into
    /// the subvolume containing its world-space position and scheduled there;
    /// it never moves (surface diffusion is unimplemented).
    pub fn place_surface_molecule(
        &mut self,
        species: SpeciesId,
        wall_id: rd_core::WallId,
        u: f64,
        v: f64,
        t: f64,
    ) -> RdResult<MoleculeId> {
        if species.index() >= self.species.len() {
            return Err(RdError::SpeciesNotFound(species));
        }
        let wall = &self.walls[wall_id.index()];
        let pos = wall.vert[0] + wall.unit_u * u + wall.unit_v * v;
        let sv = self
            .partition
            .locate(pos)
            .ok_or(RdError::OutOfWorld(pos))?;
        let id = self.arena.alloc(Molecule {
            species,
            loc: Location::Surface { wall: wall_id, u, v },
            t,
            t2: None,
            subvol: sv,
            list_pos: 0,
        });
        self.link(id, sv);
        self.species[species.index()].population += 1;
        self.subvolumes[sv.index()]
            .queue
            .insert_or_ready(t, id)
            .map_err(|e| RdError::Config(e.to_string()))?;
        Ok(id)
    }

    // ── Migration ─────────────────────────────────────────────────────────

    /// Move a molecule from its current subvolume's list to `dest`'s.
    /// Scheduling state is untouched — the caller reschedules when the step
    /// finishes.
    pub fn migrate(&mut self, id: MoleculeId, dest: SubvolumeId) -> RdResult<()> {
        if self.arena.get(id).is_none() {
            return Err(RdError::MoleculeNotFound(id));
        }
        self.unlink(id);
        self.link(id, dest);
        Ok(())
    }

    // ── Destruction ───────────────────────────────────────────────────────

    /// Unlink a molecule from its subvolume list and tombstone it.  The arena
    /// slot stays reserved until the driver pops the molecule's scheduler
    /// entry and calls [`MoleculeArena::reclaim`].
    pub fn destroy_molecule(&mut self, id: MoleculeId) -> RdResult<()> {
        let species = match self.arena.get(id) {
            Some(m) => m.species,
            None => return Err(RdError::MoleculeNotFound(id)),
        };
        self.unlink(id);
        self.arena.kill(id);
        self.species[species.index()].population -= 1;
        Ok(())
    }

    // ── List maintenance ──────────────────────────────────────────────────

    /// Append `id` to `sv`'s per-species list and record its position.
    fn link(&mut self, id: MoleculeId, sv: SubvolumeId) {
        let mol = self.arena.get_mut(id).expect("linking a dead molecule");
        mol.subvol = sv;
        let species = mol.species;
        let list = self.subvolumes[sv.index()].mols.entry(species).or_default();
        let pos = list.len() as u32;
        list.push(id);
        self.arena.get_mut(id).unwrap().list_pos = pos;
    }

    /// Swap-remove `id` from its subvolume list, back-patching the swapped
    /// entry's `list_pos`.  O(1).
    fn unlink(&mut self, id: MoleculeId) {
        let (sv, species, pos) = {
            let m = self.arena.get(id).expect("unlinking a dead molecule");
            (m.subvol, m.species, m.list_pos as usize)
        };
        let list = self.subvolumes[sv.index()]
            .mols
            .get_mut(&species)
            .expect("molecule missing from its subvolume list");
        debug_assert_eq!(list[pos], id);
        list.swap_remove(pos);
        if let Some(&moved) = list.get(pos) {
            self.arena.get_mut(moved).unwrap().list_pos = pos as u32;
        }
    }
}
