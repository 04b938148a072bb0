// src/engine/mod.rs

//! Trigger coordination for watchrun.
//!
//! Two sources can ask for a run:
//! - the watch callback, debounced through [`DebounceGate`],
//! - the space bar, which always runs.
//!
//! [`Orchestrator`] owns the one `Mutex<SharedState>` and serializes the
//! whole check → run → reset sequence under it, so at most one command runs
//! at a time and every report is built from an atomic counter snapshot.
//! [`CommandRunner`] is the run action itself.

pub mod gate;
pub mod orchestrator;
pub mod runner;

pub use gate::DebounceGate;
pub use orchestrator::Orchestrator;
pub use runner::{CommandRunner, RunOutcome, RunReport};
pub use crate::types::{RunningState, TriggerReason};
