// src/engine/gate.rs

use std::time::{Duration, Instant};

use crate::state::ChangeCounters;

/// Decides whether an automatic (watch) trigger should run the command.
///
/// Fires only when the debounce window has passed **and** changes are
/// pending. Because a run resets the counters, repeated batches after the
/// window fire once per accumulated set of changes, not once per batch.
/// Manual triggers never consult the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceGate {
    minimum_frequency: Duration,
}

impl DebounceGate {
    pub fn new(minimum_frequency: Duration) -> Self {
        Self { minimum_frequency }
    }

    pub fn minimum_frequency(&self) -> Duration {
        self.minimum_frequency
    }

    /// Strictly more than `minimum_frequency` since `last_run`.
    /// `None` (never ran) counts as elapsed.
    pub fn window_elapsed(&self, now: Instant, last_run: Option<Instant>) -> bool {
        match last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.minimum_frequency,
        }
    }

    pub fn should_fire(
        &self,
        now: Instant,
        last_run: Option<Instant>,
        counters: &ChangeCounters,
    ) -> bool {
        self.window_elapsed(now, last_run) && counters.changed()
    }
}
