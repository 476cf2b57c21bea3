//! Deterministic uniform random stream for the kernel.
//!
//! # Determinism strategy
//!
//! The kernel consumes exactly one uniform stream per run (spec: the random
//! stream is an external input; here it is a `SmallRng` seeded from the
//! master seed).  Components never construct their own RNGs — the driver
//! threads a `&mut SimRng` through every call, so replaying a seed replays
//! the run bit-for-bit.
//!
//! `child()` derives an independent stream deterministically; useful for
//! tests and for any future per-region split.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// The kernel's uniform random stream.
///
/// Intentionally `!Sync`: a stream must never be shared between threads.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent child stream with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Uniform draw in `(0, 1]` — safe to pass to `ln()`.
    #[inline]
    pub fn uniform_pos(&mut self) -> f64 {
        1.0 - self.0.r#gen::<f64>()
    }

    /// Exponentially distributed waiting time with rate `k` (mean `1/k`).
    #[inline]
    pub fn exponential(&mut self, k: f64) -> f64 {
        -self.uniform_pos().ln() / k
    }

    /// Uniform integer in `[0, n)`.
    #[inline]
    pub fn uniform_index(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
