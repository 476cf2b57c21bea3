//! Reaction and pathway tables.

use rd_core::{OverprobPolicy, ReactionId, SpeciesId};
use rustc_hash::FxHashMap;

use crate::{ReactError, ReactResult};

/// One possible outcome of a reaction.
#[derive(Clone, Debug)]
pub struct Pathway {
    /// Current per-timestep probability contribution of this pathway.
    pub rate: f64,
    /// Species created when this pathway fires.  Volume products are placed
    /// at the reaction point by the walk engine / driver.
    pub products: Vec<SpeciesId>,
}

/// A scheduled mid-run probability change for one pathway.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateUpdate {
    /// Simulation time (timesteps) at which the new value takes effect.
    pub time: f64,
    /// Index of the pathway whose rate changes.
    pub pathway: usize,
    /// New per-timestep probability for that pathway.
    pub value: f64,
}

/// One chemical transformation with its cumulative-probability table.
#[derive(Clone, Debug)]
pub struct Reaction {
    pub id: ReactionId,

    /// Reactant species: one entry for unimolecular, two for bimolecular,
    /// three for trimolecular reactions.
    pub reactants: Vec<SpeciesId>,

    pub pathways: Vec<Pathway>,

    /// Prefix sums of pathway rates.  Non-decreasing; last entry = total
    /// reaction probability.  Rebuilt whenever a rate update applies.
    pub cum_probs: Vec<f64>,

    /// Pending rate updates, sorted ascending by time.  Applied lazily by
    /// [`update_probs`](Self::update_probs); `next_update` is the cursor.
    schedule: Vec<RateUpdate>,
    next_update: usize,

    /// Accumulated excess probability from draws the scaling factor could
    /// not represent ("cannot scale enough").  Tracked so aggregate rates
    /// can be corrected in post-processing.
    pub n_skipped: f64,
}

impl Reaction {
    pub fn new(id: ReactionId, reactants: Vec<SpeciesId>, pathways: Vec<Pathway>) -> Self {
        let mut rx = Self {
            id,
            reactants,
            pathways,
            cum_probs: Vec::new(),
            schedule: Vec::new(),
            next_update: 0,
            n_skipped: 0.0,
        };
        rx.rebuild_cum();
        rx
    }

    /// Attach a time-varying-rate schedule (sorted by time internally).
    pub fn with_schedule(mut self, mut updates: Vec<RateUpdate>) -> Self {
        updates.sort_by(|a, b| a.time.partial_cmp(&b.time).expect("NaN update time"));
        self.schedule = updates;
        self
    }

    fn rebuild_cum(&mut self) {
        self.cum_probs.clear();
        let mut acc = 0.0;
        for p in &self.pathways {
            acc += p.rate;
            self.cum_probs.push(acc);
        }
    }

    /// Total reaction probability (last cumulative entry).
    #[inline]
    pub fn total(&self) -> f64 {
        self.cum_probs.last().copied().unwrap_or(0.0)
    }

    /// Apply all schedule entries with `time <= now`, just in time.
    ///
    /// Returns `Ok(true)` if any probability changed.  If the updated total
    /// exceeds `threshold`, `policy` decides: `Cope` ignores, `Warn` logs
    /// once per offending update, `Error` returns
    /// [`ReactError::ProbabilityOverflow`] so the driver can flush output and
    /// stop.
    pub fn update_probs(
        &mut self,
        now: f64,
        threshold: f64,
        policy: OverprobPolicy,
    ) -> ReactResult<bool> {
        let mut changed = false;
        while let Some(upd) = self.schedule.get(self.next_update).copied() {
            if upd.time > now {
                break;
            }
            self.next_update += 1;
            if upd.pathway >= self.pathways.len() {
                return Err(ReactError::Config(format!(
                    "rate update targets pathway {} of {}-pathway reaction {}",
                    upd.pathway,
                    self.pathways.len(),
                    self.id
                )));
            }
            self.pathways[upd.pathway].rate = upd.value;
            self.rebuild_cum();
            changed = true;

            let total = self.total();
            if total > threshold {
                match policy {
                    OverprobPolicy::Cope => {}
                    OverprobPolicy::Warn => {
                        log::warn!(
                            "reaction {} probability {total} exceeds {threshold} at t = {now}",
                            self.id
                        );
                    }
                    OverprobPolicy::Error => {
                        return Err(ReactError::ProbabilityOverflow {
                            reaction: self.id,
                            total,
                            threshold,
                        });
                    }
                }
            }
        }
        Ok(changed)
    }
}

// ── ReactionTable ─────────────────────────────────────────────────────────────

/// All reactions plus the arity-keyed lookup indexes the walk engine and
/// driver use.
///
/// Bimolecular lookups are keyed by the canonically ordered species pair, so
/// `(A, B)` and `(B, A)` hit the same entry.  Trimolecular reactions are
/// stored but indexed by their first two reactants — the walk engine only
/// generates pairwise collision candidates and the sampler is arity-agnostic.
pub struct ReactionTable {
    pub reactions: Vec<Reaction>,

    /// Interaction radius for bimolecular collision tests, in world length
    /// units.  One global value, per the original design.
    pub rx_radius: f64,

    uni: FxHashMap<SpeciesId, Vec<ReactionId>>,
    bi: FxHashMap<(SpeciesId, SpeciesId), Vec<ReactionId>>,
}

#[inline]
fn pair_key(a: SpeciesId, b: SpeciesId) -> (SpeciesId, SpeciesId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl ReactionTable {
    pub fn new(reactions: Vec<Reaction>, rx_radius: f64) -> ReactResult<Self> {
        let mut uni: FxHashMap<SpeciesId, Vec<ReactionId>> = FxHashMap::default();
        let mut bi: FxHashMap<(SpeciesId, SpeciesId), Vec<ReactionId>> = FxHashMap::default();

        for (i, rx) in reactions.iter().enumerate() {
            if rx.id.index() != i {
                return Err(ReactError::Config(format!(
                    "reaction table out of order: entry {i} has id {}",
                    rx.id
                )));
            }
            if !rx.cum_probs.windows(2).all(|w| w[0] <= w[1]) {
                return Err(ReactError::Config(format!(
                    "reaction {} has a decreasing cum_probs array",
                    rx.id
                )));
            }
            match rx.reactants.len() {
                1 => uni.entry(rx.reactants[0]).or_default().push(rx.id),
                2 | 3 => bi
                    .entry(pair_key(rx.reactants[0], rx.reactants[1]))
                    .or_default()
                    .push(rx.id),
                n => {
                    return Err(ReactError::Config(format!(
                        "reaction {} has unsupported arity {n}",
                        rx.id
                    )));
                }
            }
        }

        Ok(Self { reactions, rx_radius, uni, bi })
    }

    /// An empty table (no chemistry).
    pub fn empty() -> Self {
        Self {
            reactions: Vec::new(),
            rx_radius: 0.0,
            uni: FxHashMap::default(),
            bi: FxHashMap::default(),
        }
    }

    /// Unimolecular reactions consuming `species`.
    #[inline]
    pub fn unimolecular(&self, species: SpeciesId) -> &[ReactionId] {
        self.uni.get(&species).map_or(&[], |v| v.as_slice())
    }

    /// Bimolecular reactions between `a` and `b`, order-insensitive.
    #[inline]
    pub fn bimolecular(&self, a: SpeciesId, b: SpeciesId) -> &[ReactionId] {
        self.bi.get(&pair_key(a, b)).map_or(&[], |v| v.as_slice())
    }

    /// `true` if any bimolecular reaction pairs `a` with `b`.
    #[inline]
    pub fn can_collide(&self, a: SpeciesId, b: SpeciesId) -> bool {
        self.bi.contains_key(&pair_key(a, b))
    }

    /// `true` if `species` participates in any bimolecular reaction.
    /// Used at setup to derive `Species::can_collide`.
    pub fn species_can_collide(&self, species: SpeciesId) -> bool {
        self.bi.keys().any(|&(a, b)| a == species || b == species)
    }

    #[inline]
    pub fn get(&self, id: ReactionId) -> &Reaction {
        &self.reactions[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: ReactionId) -> &mut Reaction {
        &mut self.reactions[id.index()]
    }
}
