// src/engine/runner.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{info, warn};

use crate::exec::{CommandBackend, CommandOutput};
use crate::report::Reporter;
use crate::state::{Clock, CounterSnapshot, SharedState};
use crate::types::TriggerReason;

/// What happened to the external command during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No command configured; only the report was printed.
    Skipped,
    /// The process ran to completion, successfully or not.
    Completed(CommandOutput),
    /// The process could not be started.
    Failed(String),
}

/// Result of one invocation of the run action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub reason: TriggerReason,
    pub snapshot: CounterSnapshot,
    pub started_at: Instant,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// True when a command ran and exited zero.
    pub fn succeeded(&self) -> bool {
        matches!(&self.outcome, RunOutcome::Completed(out) if out.success)
    }
}

/// The "run" action.
///
/// Takes `&mut SharedState`, so only the holder of the orchestrator's guard
/// can call it. Steps, in order:
/// 1. snapshot the counters,
/// 2. stamp `last_run`,
/// 3. print the report (zero categories included),
/// 4. reset the counters,
/// 5. run the command and print its output; failure is reported, never fatal,
/// 6. print the idle line.
pub struct CommandRunner {
    command: String,
    interval: Duration,
    backend: Arc<dyn CommandBackend>,
    reporter: Arc<Reporter>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("command", &self.command)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl CommandRunner {
    pub fn new(
        command: impl Into<String>,
        interval: Duration,
        backend: Arc<dyn CommandBackend>,
        reporter: Arc<Reporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            command: command.into().trim().to_string(),
            interval,
            backend,
            reporter,
            clock,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn run(&self, state: &mut SharedState, reason: TriggerReason) -> RunReport {
        let snapshot = state.counters.snapshot();
        let now = self.clock.now();
        state.last_run = Some(now);

        info!(
            %reason,
            modified = snapshot.modified,
            added = snapshot.added,
            removed = snapshot.removed,
            "running"
        );
        self.reporter.run_header(reason, &snapshot, Local::now());
        state.counters.reset(now);

        let outcome = if self.command.is_empty() {
            RunOutcome::Skipped
        } else {
            self.invoke()
        };

        self.reporter.idle(self.interval);

        RunReport {
            reason,
            snapshot,
            started_at: now,
            outcome,
        }
    }

    fn invoke(&self) -> RunOutcome {
        match self.backend.execute(&self.command) {
            Ok(output) => {
                if !output.success {
                    warn!(
                        cmd = %self.command,
                        exit_code = output.exit_code.unwrap_or(-1),
                        "command failed; still watching"
                    );
                }
                self.reporter.command_output(&output);
                RunOutcome::Completed(output)
            }
            Err(err) => {
                warn!(cmd = %self.command, error = %err, "command could not be started");
                let message = err.to_string();
                self.reporter.command_error(&message);
                RunOutcome::Failed(message)
            }
        }
    }
}
