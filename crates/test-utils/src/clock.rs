use std::sync::Mutex;
use std::time::{Duration, Instant};

use watchrun::state::Clock;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// The instant corresponding to offset zero.
    pub fn base(&self) -> Instant {
        self.base
    }

    /// `base + offset`, for asserting against reports.
    pub fn at(&self, offset: Duration) -> Instant {
        self.base + offset
    }

    /// Current offset from `base`.
    pub fn now_offset(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    /// Jump to an absolute offset from `base`.
    pub fn set(&self, offset: Duration) {
        *self.offset.lock().unwrap() = offset;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}
