// src/engine/orchestrator.rs

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, info};

use crate::config::model::{KeypressOptions, WatchConfig};
use crate::engine::gate::DebounceGate;
use crate::engine::runner::{CommandRunner, RunReport};
use crate::errors::Result;
use crate::exec::CommandBackend;
use crate::keys::{self, KeyActions, KeySource, KeypressHandle};
use crate::report::Reporter;
use crate::state::{Clock, SharedState};
use crate::types::{RunningState, TriggerReason};
use crate::watch::{BatchCallback, ChangeBatch, WatchHandle, WatchService};

/// Owns the shared state and wires every trigger source to the run action.
///
/// Locking discipline:
/// - `shared` is the only lock around counters and `last_run`. Both trigger
///   paths hold it from the first read until the run has finished, so the
///   gate decision, the snapshot and the reset belong to one critical
///   section.
/// - `shutdown` never touches `shared`; it cannot wait on an in-flight
///   command.
/// - `watch` and `keypress` are only locked briefly to install or take the
///   handles.
pub struct Orchestrator {
    config: WatchConfig,
    shared: Mutex<SharedState>,
    gate: DebounceGate,
    runner: CommandRunner,
    reporter: Arc<Reporter>,
    clock: Arc<dyn Clock>,
    state: AtomicU8,
    runs: AtomicU64,
    watch: Mutex<Option<Box<dyn WatchHandle>>>,
    keypress: Mutex<Option<KeypressHandle>>,
    terminated: Notify,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("state", &self.running_state())
            .field("runs", &self.run_count())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        config: WatchConfig,
        backend: Arc<dyn CommandBackend>,
        reporter: Arc<Reporter>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let runner = CommandRunner::new(
            config.command.clone(),
            config.minimum_frequency,
            backend,
            Arc::clone(&reporter),
            Arc::clone(&clock),
        );

        Arc::new(Self {
            gate: DebounceGate::new(config.minimum_frequency),
            shared: Mutex::new(SharedState::new(clock.now())),
            config,
            runner,
            reporter,
            clock,
            state: AtomicU8::new(RunningState::Watching as u8),
            runs: AtomicU64::new(0),
            watch: Mutex::new(None),
            keypress: Mutex::new(None),
            terminated: Notify::new(),
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn running_state(&self) -> RunningState {
        RunningState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of times the run action has executed.
    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Copy of the shared state, taken under the guard.
    pub fn shared_state(&self) -> SharedState {
        self.lock_shared().clone()
    }

    /// Print the banner, subscribe to the watch service and, when a key
    /// source is given, start the keypress monitor.
    ///
    /// Subscription failure is fatal and returned as-is. If the monitor
    /// cannot be spawned the subscription is stopped again before returning.
    pub fn start(
        self: &Arc<Self>,
        watch_service: &dyn WatchService,
        key_source: Option<Box<dyn KeySource>>,
        key_options: KeypressOptions,
    ) -> Result<()> {
        self.reporter.banner(&self.config, key_source.is_some());

        // Weak: the handle lives inside `self`, the callback must not keep
        // `self` alive.
        let weak = Arc::downgrade(self);
        let on_batch: BatchCallback = Arc::new(move |batch: ChangeBatch| {
            if let Some(this) = weak.upgrade() {
                this.on_batch(batch);
            }
        });

        let handle = watch_service.subscribe(&self.config.directory, on_batch)?;
        self.attach_watch(handle);

        if let Some(source) = key_source {
            let actions: Arc<dyn KeyActions> = Arc::clone(self) as Arc<dyn KeyActions>;
            match keys::spawn_monitor(source, actions, key_options) {
                Ok(handle) => self.attach_keypress(handle),
                Err(err) => {
                    self.stop_watch();
                    return Err(err);
                }
            }
        }

        info!(directory = ?self.config.directory, "watching");
        Ok(())
    }

    pub fn attach_watch(&self, handle: Box<dyn WatchHandle>) {
        *self.watch.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Install the monitor handle. A handle arriving after shutdown began
    /// (a quit key read before this call) is stopped instead.
    pub fn attach_keypress(&self, mut handle: KeypressHandle) {
        let mut slot = self.keypress.lock().unwrap_or_else(PoisonError::into_inner);
        if self.running_state() != RunningState::Watching {
            drop(slot);
            if let Err(err) = handle.stop() {
                debug!(error = %err, "ignoring keypress monitor cleanup error");
            }
            return;
        }
        *slot = Some(handle);
    }

    /// Watch callback: count the batch, draw progress dots, then run if the
    /// debounce gate opens. Returns the report when the command ran.
    pub fn on_batch(&self, batch: ChangeBatch) -> Option<RunReport> {
        if self.running_state() != RunningState::Watching {
            debug!("ignoring watch batch during shutdown");
            return None;
        }

        let (modified, added, removed) = batch.counts();
        let mut shared = self.lock_shared();
        // Shutdown may have completed while we waited for the guard.
        if self.running_state() != RunningState::Watching {
            debug!("ignoring watch batch after shutdown");
            return None;
        }
        shared
            .counters
            .increment(modified as u64, added as u64, removed as u64);
        self.reporter.progress(modified, added, removed);

        let now = self.clock.now();
        if !self.gate.should_fire(now, shared.last_run, &shared.counters) {
            debug!(
                pending = shared.counters.total(),
                "debounce gate closed; not running"
            );
            return None;
        }

        Some(self.run_locked(&mut shared, TriggerReason::FileWatch))
    }

    /// Manual trigger: runs unconditionally, bypassing the gate.
    pub fn trigger_now(&self) -> Option<RunReport> {
        if self.running_state() != RunningState::Watching {
            debug!("ignoring manual trigger during shutdown");
            return None;
        }

        self.reporter.manual_trigger();
        let mut shared = self.lock_shared();
        if self.running_state() != RunningState::Watching {
            debug!("ignoring manual trigger after shutdown");
            return None;
        }
        Some(self.run_locked(&mut shared, TriggerReason::Manual))
    }

    /// Graceful shutdown, safe to call from any thread any number of times.
    ///
    /// Only the first caller does the work; everyone else gets `false`
    /// straight away. Best effort, in order:
    /// 1. stop the keypress monitor (and leave raw mode),
    /// 2. stop the watch subscription,
    /// 3. print the farewell,
    /// then mark the orchestrator `Terminated` and wake [`Self::wait_terminated`].
    /// Exiting the process is left to the binary.
    pub fn shutdown(&self) -> bool {
        if self
            .state
            .compare_exchange(
                RunningState::Watching as u8,
                RunningState::ShuttingDown as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            debug!("shutdown already in progress");
            return false;
        }

        info!("graceful shutdown requested");
        self.reporter.shutdown_banner();

        self.reporter.shutdown_step("Stopping the keypress monitor...");
        let keypress = self
            .keypress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut handle) = keypress {
            if let Err(err) = handle.stop() {
                debug!(error = %err, "ignoring keypress monitor cleanup error");
            }
        }

        self.reporter.shutdown_step("Stopping the file watcher...");
        self.stop_watch();

        self.reporter.farewell();

        self.state
            .store(RunningState::Terminated as u8, Ordering::SeqCst);
        self.terminated.notify_one();
        true
    }

    /// Resolves once [`Self::shutdown`] has finished.
    pub async fn wait_terminated(&self) {
        loop {
            let notified = self.terminated.notified();
            if self.running_state() == RunningState::Terminated {
                return;
            }
            notified.await;
        }
    }

    fn stop_watch(&self) {
        let handle = self.watch.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(mut handle) = handle {
            if let Err(err) = handle.stop() {
                debug!(error = %err, "ignoring watch subscription cleanup error");
            }
        }
    }

    fn run_locked(&self, shared: &mut SharedState, reason: TriggerReason) -> RunReport {
        let report = self.runner.run(shared, reason);
        self.runs.fetch_add(1, Ordering::SeqCst);
        report
    }

    // Counters are plain integers, so a panic elsewhere cannot leave them
    // half-updated; recover the guard instead of propagating the poison.
    fn lock_shared(&self) -> MutexGuard<'_, SharedState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyActions for Orchestrator {
    fn manual_trigger(&self) {
        let _ = self.trigger_now();
    }

    fn quit(&self) {
        self.shutdown();
    }
}
