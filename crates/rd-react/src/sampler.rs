//! Stochastic reaction tests.
//!
//! The decision of *whether* a collision reacts, and of *which* pathway
//! fires, is one uniform draw against the reaction's cumulative-probability
//! table.  `cum_probs` is non-decreasing; a draw `p` selects the first
//! pathway whose cumulative value is `>= p`, so on an exact boundary the
//! lower-indexed pathway wins and zero-width pathways are never chosen.

use rd_core::SimRng;

use crate::Reaction;

/// First index in `cum` whose value is `>= p`; `cum.len()` if `p` exceeds
/// the total.  Binary search over the prefix-sum table.
#[inline]
pub fn pathway_index(cum: &[f64], p: f64) -> usize {
    cum.partition_point(|&c| c < p)
}

/// Sample an exponential unimolecular lifetime for `rx`, in timesteps.
/// A reaction with zero total probability never fires.
pub fn unimolecular_lifetime(rx: &Reaction, rng: &mut SimRng) -> f64 {
    let k = rx.total();
    if k <= 0.0 {
        return f64::INFINITY;
    }
    rng.exponential(k)
}

/// Pick the pathway of a unimolecular reaction known to fire now.
pub fn which_unimolecular(rx: &Reaction, rng: &mut SimRng) -> usize {
    let p = rng.uniform() * rx.total();
    pathway_index(&rx.cum_probs, p).min(rx.pathways.len() - 1)
}

/// Test one bimolecular collision against `rx`.
///
/// `scaling` corrects for the fraction of the timestep actually traveled and
/// for local crowding; `p = u * scaling` keeps the per-collision rate
/// faithful.  When `scaling < total` the draw cannot represent the full
/// probability mass ("cannot scale enough"): the reaction then always fires,
/// and the unrepresentable excess `total/scaling - 1` accumulates in
/// `rx.n_skipped` so aggregate rates can be corrected afterwards.
///
/// Returns the firing pathway index, or `None` if no reaction occurs.
pub fn test_bimolecular(rx: &mut Reaction, scaling: f64, rng: &mut SimRng) -> Option<usize> {
    let total = rx.total();
    if total <= 0.0 {
        return None;
    }

    let u = rng.uniform();
    let p = if scaling < total {
        rx.n_skipped += total / scaling - 1.0;
        u * total
    } else {
        let p = u * scaling;
        if p > total {
            return None;
        }
        p
    };

    Some(pathway_index(&rx.cum_probs, p).min(rx.pathways.len() - 1))
}

/// Test a collision that several reactions compete for, with one shared
/// uniform draw.
///
/// Each reaction `i` contributes weight `alpha_i = total_i / scaling_i`; the
/// draw walks the alpha prefix sums, and the residual probability is rescaled
/// into the chosen reaction's own cum_probs range.  If the combined weight
/// exceeds 1 the draw is taken against the full weight instead and each
/// reaction's `n_skipped` grows by its share of the excess.
///
/// Returns `(reaction index into `rxs`, pathway index)`, or `None`.
pub fn test_many(rxs: &mut [&mut Reaction], scalings: &[f64], rng: &mut SimRng) -> Option<(usize, usize)> {
    debug_assert_eq!(rxs.len(), scalings.len());
    if rxs.len() == 1 {
        return test_bimolecular(rxs[0], scalings[0], rng).map(|pw| (0, pw));
    }

    let alphas: Vec<f64> = rxs
        .iter()
        .zip(scalings)
        .map(|(rx, &s)| rx.total() / s)
        .collect();
    let alpha_sum: f64 = alphas.iter().sum();
    if alpha_sum <= 0.0 {
        return None;
    }

    let u = rng.uniform();
    let p = if alpha_sum > 1.0 {
        // Cannot scale enough: some reaction must fire.  Charge each
        // reaction its share of the excess.
        for (rx, &a) in rxs.iter_mut().zip(&alphas) {
            rx.n_skipped += (a / alpha_sum) * (alpha_sum - 1.0);
        }
        u * alpha_sum
    } else {
        let p = u;
        if p > alpha_sum {
            return None;
        }
        p
    };

    // Walk the alpha prefix sums to find the chosen reaction.
    let mut acc = 0.0;
    for (i, &a) in alphas.iter().enumerate() {
        if p <= acc + a || i == alphas.len() - 1 {
            // Rescale the residual into this reaction's cum_probs range.
            let m = (p - acc).min(a) * scalings[i];
            let rx = &rxs[i];
            let pw = pathway_index(&rx.cum_probs, m).min(rx.pathways.len() - 1);
            return Some((i, pw));
        }
        acc += a;
    }
    unreachable!("alpha walk always terminates on the last reaction");
}
