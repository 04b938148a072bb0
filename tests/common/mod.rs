#![allow(dead_code)]

use std::time::{Duration, Instant};

pub use watchrun_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Poll `cond` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
