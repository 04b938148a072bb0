// src/watch/mod.rs

//! File watching.
//!
//! The engine depends only on the [`WatchService`] capability: subscribe a
//! callback against a directory, get a [`WatchHandle`] back, stop it later.
//! [`watcher::NotifyWatchService`] is the production implementation on top of
//! `notify`; tests use a scripted double that invokes the callback directly.
//!
//! No filtering or coalescing happens here. Whatever batch granularity the
//! backend delivers is fed to the counters as-is.

pub mod subscription;
pub mod watcher;

pub use subscription::{BatchCallback, ChangeBatch, WatchHandle, WatchService};
pub use watcher::{NotifyWatchService, classify_event};
