// src/state/clock.rs

use std::fmt::Debug;
use std::time::Instant;

/// Monotonic time source.
///
/// The engine never calls `Instant::now()` directly so tests can drive the
/// debounce window with a manual clock.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
