// src/keys/mod.rs

//! Interactive keyboard control.
//!
//! A dedicated thread reads single keystrokes from a [`KeySource`] and maps
//! them onto [`KeyActions`]:
//! - space → manual trigger
//! - `q` (or Ctrl-C, which raw mode turns into a plain keystroke) → shutdown
//! - anything else → ignored
//!
//! Manual triggers are handed to a second worker thread, so `q` and Ctrl-C
//! are still read while a space-started command runs.
//!
//! Cancellation is cooperative. The source is polled with a short timeout so
//! the [`CancelToken`] is seen between reads. A worker that is busy inside a
//! manual trigger when cancelled is simply abandoned at process exit.

pub mod terminal;

use std::io;
use std::sync::{Arc, mpsc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

use crate::config::model::KeypressOptions;
use crate::errors::{Result, WatchrunError};

pub use terminal::{CrosstermKeys, restore_terminal};

/// How long a single poll of the key source may block.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a keystroke asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Trigger,
    Quit,
    Ignore,
}

/// Map a key event onto an action. Only presses count.
pub fn action_for(event: &KeyEvent) -> KeyAction {
    if event.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') if !ctrl => KeyAction::Quit,
        KeyCode::Char(' ') if !ctrl => KeyAction::Trigger,
        _ => KeyAction::Ignore,
    }
}

/// Blocking source of keystrokes.
pub trait KeySource: Send {
    /// Wait up to `timeout` for the next key event.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;

    /// Hook run when the monitor is stopped from another thread, e.g. to
    /// leave raw mode. The source itself may still be parked in the thread.
    fn restorer(&self) -> Box<dyn Fn() + Send + Sync> {
        Box::new(|| {})
    }
}

/// Receiver of keyboard actions; implemented by the orchestrator.
pub trait KeyActions: Send + Sync {
    fn manual_trigger(&self);
    fn quit(&self);
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `total`, waking early once cancelled. Returns `true` if
    /// cancelled.
    /// A `total` too large to represent as an instant sleeps until
    /// cancelled.
    pub fn sleep(&self, total: Duration) -> bool {
        let deadline = Instant::now().checked_add(total);
        loop {
            if self.is_cancelled() {
                return true;
            }
            let step = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    (deadline - now).min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            thread::sleep(step);
        }
    }
}

/// Handle to the running monitor thread.
pub struct KeypressHandle {
    cancel: CancelToken,
    restore: Box<dyn Fn() + Send + Sync>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for KeypressHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypressHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("running", &self.is_running())
            .finish()
    }
}

impl KeypressHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread to stop and restore the terminal. Never joins, so
    /// it cannot hang behind a command started by a manual trigger.
    pub fn stop(&mut self) -> Result<()> {
        let thread = self
            .thread
            .take()
            .ok_or(WatchrunError::AlreadyStopped("keypress monitor"))?;
        self.cancel.cancel();
        (self.restore)();
        if thread.is_finished() {
            debug!("keypress monitor had already finished");
        } else {
            debug!("keypress monitor signalled; thread detached");
        }
        Ok(())
    }

    /// Wait for the thread to end on its own (after `q` or a source error).
    pub fn join(mut self) -> std::thread::Result<()> {
        match self.thread.take() {
            Some(t) => t.join(),
            None => Ok(()),
        }
    }
}

/// Forwards quits straight through and queues manual triggers for the
/// trigger worker, so the read loop never blocks on a running command.
struct QueuedActions {
    inner: Arc<dyn KeyActions>,
    triggers: mpsc::Sender<()>,
}

impl KeyActions for QueuedActions {
    fn manual_trigger(&self) {
        if self.triggers.send(()).is_err() {
            debug!("trigger worker gone; dropping manual trigger");
        }
    }

    fn quit(&self) {
        self.inner.quit();
    }
}

/// Spawn the monitor thread and its trigger worker.
///
/// The worker runs queued manual triggers one after another and exits once
/// the monitor thread ends and drops its sender.
pub fn spawn_monitor(
    mut source: Box<dyn KeySource>,
    actions: Arc<dyn KeyActions>,
    options: KeypressOptions,
) -> Result<KeypressHandle> {
    let cancel = CancelToken::new();
    let restore = source.restorer();
    let (triggers, queued) = mpsc::channel::<()>();

    thread::Builder::new()
        .name("watchrun-trigger".to_string())
        .spawn({
            let actions = Arc::clone(&actions);
            let cancel = cancel.clone();
            move || {
                while queued.recv().is_ok() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    actions.manual_trigger();
                }
                debug!("trigger worker finished");
            }
        })?;

    let forward = QueuedActions {
        inner: actions,
        triggers,
    };
    let thread = thread::Builder::new()
        .name("watchrun-keys".to_string())
        .spawn({
            let cancel = cancel.clone();
            move || run_monitor(source.as_mut(), &forward, &cancel, options)
        })?;

    Ok(KeypressHandle {
        cancel,
        restore,
        thread: Some(thread),
    })
}

/// Monitor loop body; runs on the caller's thread.
///
/// Returns after `q`, a source error, or cancellation.
pub fn run_monitor(
    source: &mut dyn KeySource,
    actions: &dyn KeyActions,
    cancel: &CancelToken,
    options: KeypressOptions,
) {
    if cancel.sleep(options.startup_grace) {
        return;
    }
    info!("keypress monitor started");

    while !cancel.is_cancelled() {
        let event = match source.next_key(POLL_INTERVAL) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "reading the keyboard failed; keyboard control disabled");
                return;
            }
        };

        // Swallow key-repeat noise.
        thread::sleep(options.settle_delay);
        if cancel.is_cancelled() {
            break;
        }

        match action_for(&event) {
            KeyAction::Trigger => {
                debug!("space pressed; manual trigger");
                actions.manual_trigger();
            }
            KeyAction::Quit => {
                debug!("quit key pressed");
                actions.quit();
                return;
            }
            KeyAction::Ignore => {}
        }
    }

    debug!("keypress monitor cancelled");
}
