// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod keys;
pub mod logging;
pub mod report;
pub mod state;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{Settings, format_duration, resolve_settings};
use crate::engine::Orchestrator;
use crate::exec::ShellBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::keys::{CrosstermKeys, KeySource};
use crate::report::Reporter;
use crate::state::SystemClock;
use crate::types::SHUTDOWN_EXIT_CODE;
use crate::watch::NotifyWatchService;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - settings resolution (config file + CLI tokens)
/// - the orchestrator with the shell backend and the stdout reporter
/// - the notify watch subscription
/// - the keypress monitor (unless disabled)
/// - Ctrl-C handling
///
/// It returns once the orchestrator has terminated, i.e. after `q` or
/// Ctrl-C.
pub async fn run(args: CliArgs) -> Result<i32> {
    let fs = RealFileSystem;
    let mut settings = resolve_settings(&args, &fs).context("resolving settings")?;
    if let Ok(canonical) = fs.canonicalize(&settings.watch.directory) {
        settings.watch.directory = canonical;
    }

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(0);
    }

    let orchestrator = Orchestrator::new(
        settings.watch.clone(),
        Arc::new(ShellBackend::new()),
        Arc::new(Reporter::stdout()),
        Arc::new(SystemClock),
    );

    let key_source: Option<Box<dyn KeySource>> = if settings.keys.enabled {
        Some(Box::new(
            CrosstermKeys::open().context("acquiring terminal input")?,
        ))
    } else {
        None
    };

    orchestrator
        .start(&NotifyWatchService, key_source, settings.keys)
        .context("starting the file watcher")?;

    // Ctrl-C → graceful shutdown. If the handler cannot be installed we keep
    // running and rely on the keyboard.
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => {
                warn!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            orchestrator.shutdown();
        }
        _ = orchestrator.wait_terminated() => {}
    }
    orchestrator.wait_terminated().await;

    debug!(runs = orchestrator.run_count(), "watcher terminated");
    Ok(SHUTDOWN_EXIT_CODE)
}

/// Simple dry-run output: print the resolved settings.
fn print_dry_run(settings: &Settings) {
    println!("watchrun dry-run");
    println!("  watch.directory = {}", settings.watch.directory.display());
    if settings.watch.has_command() {
        println!("  watch.command = {}", settings.watch.command);
    } else {
        println!("  watch.command = (none; report only)");
    }
    println!(
        "  watch.interval = {}",
        format_duration(settings.watch.minimum_frequency)
    );
    println!("  keys.enabled = {}", settings.keys.enabled);
    if settings.keys.enabled {
        println!(
            "  keys.startup_grace = {}",
            format_duration(settings.keys.startup_grace)
        );
        println!(
            "  keys.settle_delay = {}",
            format_duration(settings.keys.settle_delay)
        );
    }

    debug!("dry-run complete (no watching)");
}
