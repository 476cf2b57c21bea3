//! Simulation observer trait for progress reporting and data collection.

use rd_grid::World;
use rd_walk::Counters;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at iteration
/// boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Output writing itself lives outside
/// the kernel; an observer is how an external writer sees the state.
///
/// # Example — population printer
///
/// ```rust,ignore
/// struct PopulationPrinter { every: u64 }
///
/// impl SimObserver for PopulationPrinter {
///     fn on_iteration_end(&mut self, iteration: u64, live: usize) {
///         if iteration % self.every == 0 {
///             println!("iteration {iteration}: {live} molecules");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each iteration.
    fn on_iteration_start(&mut self, _iteration: u64) {}

    /// Called at the end of each iteration with the live molecule count.
    fn on_iteration_end(&mut self, _iteration: u64, _live: usize) {}

    /// Called after every iteration with read-only access to the counters
    /// and the full world state.  Observers pick their own intervals.
    fn on_snapshot(&mut self, _iteration: u64, _counters: &Counters, _world: &World) {}

    /// Called once after the final iteration — also on the error path, so
    /// pending output can be flushed before the run stops.
    fn on_sim_end(&mut self, _final_iteration: u64) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run`
/// but don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
