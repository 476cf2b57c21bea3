//! `rd-schedule` — hierarchical timing-wheel event scheduler.
//!
//! # Crate layout
//!
//! | Module     | Contents                                      |
//! |------------|-----------------------------------------------|
//! | [`wheel`]  | `ScheduleQueue<T>`, `Entry<T>`                |
//! | [`error`]  | `ScheduleError`, `ScheduleResult<T>`          |
//!
//! # Why this exists
//!
//! Millions of molecules each carry an independent next-event time, and those
//! times span wildly different scales (fast diffusion vs. slow unimolecular
//! decay).  A comparison-based priority queue would pay O(log N) per insert
//! on the hottest path in the kernel.  The timing wheel gets O(1) amortized
//! insert and advance over an *unbounded* horizon in bounded memory: a
//! fixed-size circular buffer of buckets at the finest resolution, cascading
//! into coarser wheels whose buckets each cover one full rotation of the
//! wheel below.
//!
//! # Driver protocol
//!
//! ```text
//! loop {
//!     while let Some(entry) = q.next() { handle(entry); }
//!     if done { break; }
//!     q.advance();            // open the next time window
//! }
//! ```
//!
//! `next()` returns `None` exactly when the ready list is empty — that is the
//! signal to `advance()` and retry, never an error.

pub mod error;
pub mod wheel;


pub use error::{ScheduleError, ScheduleResult};
pub use wheel::{Entry, ScheduleQueue};
