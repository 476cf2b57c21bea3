//! Molecule storage: slot arena with explicit tombstoning.
//!
//! A destroyed molecule's `species` becomes `SpeciesId::INVALID` (the
//! tombstone) and its slot is recycled only when [`MoleculeArena::reclaim`]
//! is called — by the driver, when the dead molecule's scheduler entry
//! surfaces.  Until then the `MoleculeId` stays unique, so no stale reference
//! can alias a new molecule.

use rd_core::{MoleculeId, SpeciesId, SubvolumeId, Vec3, WallId};

/// Where a molecule is: free in 3-D space or pinned to a wall.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Location {
    /// A volume molecule at a world-space position.
    Volume(Vec3),
    /// A surface molecule at wall-local (u, v) coordinates.  Surface
    /// diffusion is unimplemented in this kernel; these only age toward
    /// their unimolecular deadline.
    Surface { wall: WallId, u: f64, v: f64 },
}

impl Location {
    /// World-space position for volume molecules.
    #[inline]
    pub fn volume_pos(&self) -> Option<Vec3> {
        match *self {
            Location::Volume(p) => Some(p),
            Location::Surface { .. } => None,
        }
    }
}

/// One diffusing (or wall-bound) molecule.
#[derive(Clone, Debug)]
pub struct Molecule {
    /// Species, or `SpeciesId::INVALID` once tombstoned.
    pub species: SpeciesId,

    pub loc: Location,

    /// Scheduling time: when this molecule is next due to move.
    pub t: f64,

    /// Absolute unimolecular deadline, or `None` if not yet sampled.
    pub t2: Option<f64>,

    /// Owning subvolume.  Valid while alive.
    pub subvol: SubvolumeId,

    /// Index of this molecule within its subvolume's per-species list.
    /// Maintained by `World` on link/unlink; meaningless while dead.
    pub list_pos: u32,
}

impl Molecule {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.species != SpeciesId::INVALID
    }

    /// Volume position; panics on surface molecules (callers gate on kind).
    #[inline]
    pub fn pos(&self) -> Vec3 {
        match self.loc {
            Location::Volume(p) => p,
            Location::Surface { .. } => unreachable!("surface molecule has no volume position"),
        }
    }
}

// ── MoleculeArena ─────────────────────────────────────────────────────────────

/// Slot arena for all molecules in the world.
///
/// `MoleculeId` is an index into `slots`.  Dead slots are recycled through
/// `free`, but only after `reclaim` — see the module docs for the two-phase
/// destruction protocol.
#[derive(Default)]
pub struct MoleculeArena {
    slots: Vec<Molecule>,
    free: Vec<u32>,
    live: usize,
}

impl MoleculeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new molecule, reusing a reclaimed slot when one is available.
    pub fn alloc(&mut self, mol: Molecule) -> MoleculeId {
        debug_assert!(mol.is_alive());
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = mol;
                MoleculeId(slot)
            }
            None => {
                self.slots.push(mol);
                MoleculeId(self.slots.len() as u32 - 1)
            }
        }
    }

    /// Shared access; `None` for out-of-range or tombstoned slots.
    #[inline]
    pub fn get(&self, id: MoleculeId) -> Option<&Molecule> {
        self.slots.get(id.index()).filter(|m| m.is_alive())
    }

    /// Mutable access; `None` for out-of-range or tombstoned slots.
    #[inline]
    pub fn get_mut(&mut self, id: MoleculeId) -> Option<&mut Molecule> {
        self.slots.get_mut(id.index()).filter(|m| m.is_alive())
    }

    /// `true` if the slot holds a tombstone.
    #[inline]
    pub fn is_tombstone(&self, id: MoleculeId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|m| !m.is_alive())
    }

    /// Mark a molecule dead.  The slot is NOT recycled yet; call
    /// [`reclaim`](Self::reclaim) when the last reference (the scheduler
    /// entry) has been consumed.
    pub fn kill(&mut self, id: MoleculeId) {
        let m = &mut self.slots[id.index()];
        debug_assert!(m.is_alive(), "double kill of {id}");
        m.species = SpeciesId::INVALID;
        self.live -= 1;
    }

    /// Recycle a tombstoned slot.  Must be called exactly once per kill.
    pub fn reclaim(&mut self, id: MoleculeId) {
        debug_assert!(self.is_tombstone(id), "reclaiming a live slot {id}");
        self.free.push(id.0);
    }

    /// Live molecule count.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slots ever allocated (live + dead + free).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over all live molecules.
    pub fn iter_live(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_alive())
            .map(|(i, m)| (MoleculeId(i as u32), m))
    }
}
