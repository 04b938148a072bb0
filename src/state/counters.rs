// src/state/counters.rs

use std::time::Instant;

/// Running tally of filesystem changes since the last reset.
///
/// Counts are `u64` and added with saturation; a single debounce interval
/// will never come close to the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCounters {
    modified: u64,
    added: u64,
    removed: u64,
    reset_at: Instant,
}

/// Point-in-time copy of the counters, taken at a trigger's decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub modified: u64,
    pub added: u64,
    pub removed: u64,
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.modified
            .saturating_add(self.added)
            .saturating_add(self.removed)
    }
}

impl ChangeCounters {
    pub fn new(now: Instant) -> Self {
        Self {
            modified: 0,
            added: 0,
            removed: 0,
            reset_at: now,
        }
    }

    pub fn increment(&mut self, modified: u64, added: u64, removed: u64) {
        self.modified = self.modified.saturating_add(modified);
        self.added = self.added.saturating_add(added);
        self.removed = self.removed.saturating_add(removed);
    }

    /// Zero all counts and stamp `reset_at` with `now`.
    pub fn reset(&mut self, now: Instant) {
        self.modified = 0;
        self.added = 0;
        self.removed = 0;
        self.reset_at = now;
    }

    pub fn changed(&self) -> bool {
        self.total() > 0
    }

    pub fn total(&self) -> u64 {
        self.snapshot().total()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            modified: self.modified,
            added: self.added,
            removed: self.removed,
        }
    }

    pub fn modified(&self) -> u64 {
        self.modified
    }

    pub fn added(&self) -> u64 {
        self.added
    }

    pub fn removed(&self) -> u64 {
        self.removed
    }

    pub fn reset_at(&self) -> Instant {
        self.reset_at
    }
}
