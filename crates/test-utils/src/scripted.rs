use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use watchrun::errors::{Result, WatchrunError};
use watchrun::keys::KeySource;
use watchrun::watch::{BatchCallback, ChangeBatch, WatchHandle, WatchService};

/// Watch service double: `emit` invokes the registered callback on the
/// calling thread, like a backend delivering a batch.
#[derive(Default)]
pub struct ScriptedWatchService {
    callback: Mutex<Option<BatchCallback>>,
    directory: Mutex<Option<PathBuf>>,
    stopped: Arc<AtomicBool>,
    stop_calls: Arc<AtomicUsize>,
    fail_subscribe: bool,
}

impl ScriptedWatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service whose `subscribe` always fails.
    pub fn failing() -> Self {
        Self {
            fail_subscribe: true,
            ..Self::default()
        }
    }

    /// Deliver a batch. Returns `false` if nothing is subscribed or the
    /// subscription was stopped.
    pub fn emit(&self, batch: ChangeBatch) -> bool {
        if self.stopped.load(Ordering::SeqCst) {
            return false;
        }
        let callback = self.callback.lock().unwrap().clone();
        match callback {
            Some(cb) => {
                cb(batch);
                true
            }
            None => false,
        }
    }

    pub fn emit_counts(&self, modified: usize, added: usize, removed: usize) -> bool {
        self.emit(batch(modified, added, removed))
    }

    pub fn subscribed_directory(&self) -> Option<PathBuf> {
        self.directory.lock().unwrap().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl WatchService for ScriptedWatchService {
    fn subscribe(
        &self,
        directory: &Path,
        on_batch: BatchCallback,
    ) -> Result<Box<dyn WatchHandle>> {
        if self.fail_subscribe {
            return Err(WatchrunError::ConfigError(format!(
                "cannot watch {:?}",
                directory
            )));
        }
        *self.directory.lock().unwrap() = Some(directory.to_path_buf());
        *self.callback.lock().unwrap() = Some(on_batch);
        Ok(Box::new(ScriptedHandle {
            stopped: Arc::clone(&self.stopped),
            stop_calls: Arc::clone(&self.stop_calls),
        }))
    }
}

struct ScriptedHandle {
    stopped: Arc<AtomicBool>,
    stop_calls: Arc<AtomicUsize>,
}

impl WatchHandle for ScriptedHandle {
    fn stop(&mut self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(WatchrunError::AlreadyStopped("scripted watch"));
        }
        Ok(())
    }
}

/// Batch with `n` synthetic paths per category.
pub fn batch(modified: usize, added: usize, removed: usize) -> ChangeBatch {
    let paths = |prefix: &str, n: usize| -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{prefix}_{i}.txt"))).collect()
    };
    ChangeBatch::new(paths("mod", modified), paths("new", added), paths("gone", removed))
}

/// Key source double that replays a script, then idles.
pub struct ScriptedKeys {
    script: VecDeque<io::Result<Option<KeyEvent>>>,
    polls: Arc<AtomicUsize>,
    restores: Arc<AtomicUsize>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            script: keys.into_iter().map(|k| Ok(Some(k))).collect(),
            polls: Arc::new(AtomicUsize::new(0)),
            restores: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source that never produces a key.
    pub fn idle() -> Self {
        Self::new(Vec::<KeyEvent>::new())
    }

    /// Script that fails on the first read.
    pub fn broken() -> Self {
        let mut keys = Self::idle();
        keys.script
            .push_back(Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone")));
        keys
    }

    /// Number of `next_key` calls so far.
    pub fn poll_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }

    /// Number of times the restorer ran.
    pub fn restore_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.restores)
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(item) => item,
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn restorer(&self) -> Box<dyn Fn() + Send + Sync> {
        let restores = Arc::clone(&self.restores);
        Box::new(move || {
            restores.fetch_add(1, Ordering::SeqCst);
        })
    }
}

pub fn press(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn release(c: char) -> KeyEvent {
    KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Release)
}
