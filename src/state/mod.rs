// src/state/mod.rs

//! Shared mutable state guarded by the orchestrator.
//!
//! Everything in here is plain data. Synchronization lives one level up in
//! [`crate::engine::Orchestrator`], which keeps a single
//! `Mutex<SharedState>` for the counters and the last-run timestamp.

pub mod clock;
pub mod counters;

use std::time::Instant;

pub use clock::{Clock, SystemClock};
pub use counters::{ChangeCounters, CounterSnapshot};

/// State read and written by both trigger paths.
#[derive(Debug, Clone)]
pub struct SharedState {
    pub counters: ChangeCounters,
    /// `None` until the command has run once.
    pub last_run: Option<Instant>,
}

impl SharedState {
    pub fn new(now: Instant) -> Self {
        Self {
            counters: ChangeCounters::new(now),
            last_run: None,
        }
    }
}
