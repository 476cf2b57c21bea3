//! `ScheduleQueue<T>` — cascading fixed-size circular buffers.
//!
//! # Structure
//!
//! Each level is a ring of `slots` buckets, each covering a window of width
//! `dt`.  The coarser level's bucket width is `dt * slots`, i.e. one bucket
//! up there covers one full rotation down here.  Levels are chained through
//! `outer`; the chain is extended lazily when an insert lands beyond the
//! current horizon, and eagerly at construction until `dt_max` is covered.
//!
//! # Time bookkeeping
//!
//! `now` is the lower edge of the *next* window to open; `index` is its
//! bucket.  `advance()` drains that bucket into the ready list and moves the
//! window forward.  When `index` wraps to bucket 0, the level first pulls the
//! coarser level's next bucket and redistributes its entries ("cascade") —
//! every entry in that bucket falls inside the rotation about to begin.
//!
//! The queue stores `(t, item)` entry pairs and never inspects the payload
//! beyond `t`.

use std::collections::VecDeque;

use crate::{ScheduleError, ScheduleResult};

/// Hard limit on wheel-hierarchy depth.  Exceeding it means `dt_min` is
/// misconfigured relative to the horizon; the run cannot safely continue.
pub const MAX_CASCADE_DEPTH: u32 = 20;

/// One scheduled item: a timestamp plus an opaque payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    pub t: f64,
    pub item: T,
}

/// A multi-resolution event queue over an unbounded time horizon.
pub struct ScheduleQueue<T> {
    /// Bucket width at this level.
    dt: f64,
    /// Requested horizon, kept for lazy-extension diagnostics.
    dt_max: f64,
    /// Buckets per rotation.
    slots: usize,
    /// Lower edge of the next window to open.
    now: f64,
    /// Bucket holding that window.
    index: usize,
    /// Items due in the currently open window (plus admitted past-due items).
    ready: VecDeque<Entry<T>>,
    /// The ring.  `buckets[index + k]` (mod `slots`) holds window `now + k·dt`.
    buckets: Vec<Vec<Entry<T>>>,
    /// Coarser wheel; `None` at the top of the hierarchy.
    outer: Option<Box<ScheduleQueue<T>>>,
    /// This level's depth (finest = 0), checked against `MAX_CASCADE_DEPTH`.
    depth: u32,
    /// Items stored at this level (ready + buckets), excluding `outer`.
    count: usize,
}

impl<T> ScheduleQueue<T> {
    /// Build a queue whose finest wheel has `slots` buckets of width `dt_min`,
    /// opening its first window at `start`.  Coarser wheels are added until
    /// `dt_max` fits inside the hierarchy's horizon.
    ///
    /// # Errors
    ///
    /// `ScheduleError::Config` for non-positive `dt_min` or `slots < 2`;
    /// `ScheduleError::CascadeDepth` if covering `dt_max` would take more
    /// than [`MAX_CASCADE_DEPTH`] levels.
    pub fn new(dt_min: f64, dt_max: f64, slots: usize, start: f64) -> ScheduleResult<Self> {
        if !(dt_min > 0.0) {
            return Err(ScheduleError::Config(format!(
                "dt_min must be positive, got {dt_min}"
            )));
        }
        if slots < 2 {
            return Err(ScheduleError::Config(format!(
                "slots must be >= 2, got {slots}"
            )));
        }
        Self::new_level(dt_min, dt_min, dt_max, slots, start, 0)
    }

    fn new_level(
        dt_min: f64,
        dt: f64,
        dt_max: f64,
        slots: usize,
        start: f64,
        depth: u32,
    ) -> ScheduleResult<Self> {
        if depth > MAX_CASCADE_DEPTH {
            return Err(ScheduleError::CascadeDepth { dt_min, dt_max });
        }
        let outer = if dt * (slots as f64) < dt_max {
            Some(Box::new(Self::new_level(
                dt_min,
                dt * slots as f64,
                dt_max,
                slots,
                start,
                depth + 1,
            )?))
        } else {
            None
        };
        Ok(Self {
            dt,
            dt_max,
            slots,
            now: start,
            index: 0,
            ready: VecDeque::new(),
            buckets: (0..slots).map(|_| Vec::new()).collect(),
            outer,
            depth,
            count: 0,
        })
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Schedule `item` at time `t`.
    ///
    /// In-horizon items go straight into their bucket, O(1).  Out-of-horizon
    /// items recurse into the (lazily created) coarser wheel.  Items with
    /// `t` earlier than the open window go into the next window and are
    /// delivered one `advance()` late.
    pub fn insert(&mut self, t: f64, item: T) -> ScheduleResult<()> {
        self.insert_entry(Entry { t, item }, false)
    }

    /// Like [`insert`](Self::insert), but already-due items (`t < now`) go
    /// straight onto the ready list instead of a bucket, so they are returned
    /// by `next()` without waiting for an `advance()`.
    pub fn insert_or_ready(&mut self, t: f64, item: T) -> ScheduleResult<()> {
        self.insert_entry(Entry { t, item }, true)
    }

    fn insert_entry(&mut self, e: Entry<T>, admit_past_due: bool) -> ScheduleResult<()> {
        if e.t < self.now && admit_past_due {
            self.ready.push_back(e);
            self.count += 1;
            return Ok(());
        }
        let rel = (e.t - self.now) / self.dt;
        if rel < self.slots as f64 {
            self.place(e);
            Ok(())
        } else {
            self.ensure_outer()?.insert_entry(e, false)
        }
    }

    /// Drop an entry into its bucket at this level.  Precondition: the entry
    /// falls inside this level's horizon (negative offsets clamp to the next
    /// window).
    fn place(&mut self, e: Entry<T>) {
        let rel = ((e.t - self.now) / self.dt).floor();
        let rel = (rel.max(0.0) as usize).min(self.slots - 1);
        let b = (self.index + rel) % self.slots;
        self.buckets[b].push(e);
        self.count += 1;
    }

    /// Lazily create the coarser wheel, respecting the depth guard.
    fn ensure_outer(&mut self) -> ScheduleResult<&mut ScheduleQueue<T>> {
        if self.outer.is_none() {
            if self.depth + 1 > MAX_CASCADE_DEPTH {
                return Err(ScheduleError::CascadeDepth {
                    dt_min: self.dt,
                    dt_max: self.dt_max,
                });
            }
            // The coarser wheel's next window must open where this wheel's
            // next rotation begins.
            let rotation_start =
                self.now + ((self.slots - self.index) % self.slots) as f64 * self.dt;
            self.outer = Some(Box::new(ScheduleQueue {
                dt: self.dt * self.slots as f64,
                dt_max: self.dt_max,
                slots: self.slots,
                now: rotation_start,
                index: 0,
                ready: VecDeque::new(),
                buckets: (0..self.slots).map(|_| Vec::new()).collect(),
                outer: None,
                depth: self.depth + 1,
                count: 0,
            }));
        }
        Ok(self.outer.as_mut().unwrap())
    }

    // ── Consumption ───────────────────────────────────────────────────────

    /// Pop one ready item.  Returns `None` exactly when the ready list is
    /// empty — the signal to call [`advance`](Self::advance) and retry.
    pub fn next(&mut self) -> Option<Entry<T>> {
        let e = self.ready.pop_front()?;
        self.count -= 1;
        Some(e)
    }

    /// Open the next time window: rotate to the next bucket and move its
    /// contents onto the ready list, cascading from the coarser wheel when a
    /// rotation begins.
    pub fn advance(&mut self) {
        let batch = self.rotate();
        self.count += batch.len();
        self.ready.extend(batch);
    }

    /// Rotate one window forward and return the drained bucket.  Shared by
    /// `advance()` (finest level) and the cascade (coarser levels, where the
    /// drained batch is redistributed downward instead of becoming ready).
    fn rotate(&mut self) -> Vec<Entry<T>> {
        if self.index == 0 {
            if let Some(outer) = self.outer.as_mut() {
                let batch = outer.rotate();
                for e in batch {
                    self.place(e);
                }
            }
        }
        let batch = std::mem::take(&mut self.buckets[self.index]);
        self.count -= batch.len();
        self.index = (self.index + 1) % self.slots;
        self.now += self.dt;
        batch
    }

    /// Stable sort of the ready list by `t`.  Used when strict ordering of
    /// same-window items matters; insertion order is preserved among ties.
    pub fn sort_ready(&mut self) {
        self.ready
            .make_contiguous()
            .sort_by(|a, b| a.t.partial_cmp(&b.t).expect("NaN event time"));
    }

    // ── Bookkeeping ───────────────────────────────────────────────────────

    /// Lower edge of the next window to open.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Total scheduled items across all levels, including the ready list.
    pub fn len(&self) -> usize {
        self.count + self.outer.as_ref().map_or(0, |o| o.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items currently on the ready list.
    #[inline]
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Number of wheel levels currently allocated.
    pub fn depth(&self) -> u32 {
        1 + self.outer.as_ref().map_or(0, |o| o.depth())
    }
}
