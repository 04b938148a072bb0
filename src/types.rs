// src/types.rs

//! Small shared enums used across the engine, the keypress monitor and the
//! reporter.

use std::fmt;

/// Exit code used by the binary after a graceful shutdown.
pub const SHUTDOWN_EXIT_CODE: i32 = 11;

/// Lifecycle of the watcher process.
///
/// `Watching -> ShuttingDown -> Terminated`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunningState {
    Watching = 0,
    ShuttingDown = 1,
    Terminated = 2,
}

impl RunningState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RunningState::Watching,
            1 => RunningState::ShuttingDown,
            _ => RunningState::Terminated,
        }
    }
}

/// Why the command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Debounced filesystem batch.
    FileWatch,
    /// Space bar.
    Manual,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::FileWatch => f.write_str("file-watch"),
            TriggerReason::Manual => f.write_str("manual"),
        }
    }
}
