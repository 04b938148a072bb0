// src/exec/backend.rs

//! Pluggable command backend abstraction.

use crate::errors::Result;

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs the configured command synchronously.
///
/// Called with the orchestrator's shared-state guard held, so an
/// implementation must not call back into the orchestrator.
///
/// `Err` means the process could not be started or waited on. A process
/// that ran and exited non-zero is an `Ok` with `success == false`.
pub trait CommandBackend: Send + Sync {
    fn execute(&self, command: &str) -> Result<CommandOutput>;
}
