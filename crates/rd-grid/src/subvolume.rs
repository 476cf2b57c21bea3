//! One cell of the spatial partition.

use rd_schedule::ScheduleQueue;
use rustc_hash::FxHashMap;

use rd_core::{MoleculeId, SpeciesId, SubvolumeId, WallId};

/// An axis-aligned partition cell: the kernel's unit of collision search and
/// of event scheduling.
///
/// The wall list is conservative — a wall appears in every subvolume its
/// bounding box overlaps — so the walk engine's candidate sweep may test a
/// wall the ray cannot reach; that costs a miss, never a wrong answer.
pub struct Subvolume {
    pub id: SubvolumeId,

    /// Walls overlapping this cell.
    pub walls: Vec<WallId>,

    /// Per-species lists of resident molecules.  FxHashMap: small integer
    /// keys, looked up in the hottest loop of the walk engine.
    pub mols: FxHashMap<SpeciesId, Vec<MoleculeId>>,

    /// This cell's local event queue.  The driver drains it one global
    /// timestep per iteration.
    pub queue: ScheduleQueue<MoleculeId>,
}

impl Subvolume {
    pub fn new(id: SubvolumeId, queue: ScheduleQueue<MoleculeId>) -> Self {
        Self {
            id,
            walls: Vec::new(),
            mols: FxHashMap::default(),
            queue,
        }
    }

    /// Resident molecules of one species.  Empty slice if none.
    #[inline]
    pub fn mols_of(&self, species: SpeciesId) -> &[MoleculeId] {
        self.mols.get(&species).map_or(&[], |v| v.as_slice())
    }

    /// Total resident molecules across all species.
    pub fn mol_count(&self) -> usize {
        self.mols.values().map(|v| v.len()).sum()
    }
}
