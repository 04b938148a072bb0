// src/exec/mod.rs

//! Process execution layer.
//!
//! The run action talks to a [`CommandBackend`] instead of spawning processes
//! itself, so tests can record invocations without touching the OS.
//!
//! - [`backend`] defines the trait and the captured output type.
//! - [`shell`] is the production backend (`sh -c` / `cmd /C`).

pub mod backend;
pub mod shell;

pub use backend::{CommandBackend, CommandOutput};
pub use shell::ShellBackend;
