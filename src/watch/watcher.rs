// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchrunError};
use crate::watch::subscription::{BatchCallback, ChangeBatch, WatchHandle, WatchService};

/// [`WatchService`] backed by `notify`'s recommended platform watcher.
///
/// The directory is watched recursively. Each notify event becomes one
/// batch, delivered on notify's event thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatchService;

/// Handle for a notify subscription.
///
/// Keeps the underlying `RecommendedWatcher` alive. `stop` mutes the
/// callback and drops the watcher. It deliberately skips `unwatch`, which
/// round-trips through notify's event thread and would block while that
/// thread is inside our callback running a command.
pub struct NotifyHandle {
    root: PathBuf,
    active: Arc<AtomicBool>,
    inner: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for NotifyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyHandle")
            .field("root", &self.root)
            .field("active", &self.inner.is_some())
            .finish()
    }
}

impl WatchService for NotifyWatchService {
    fn subscribe(
        &self,
        directory: &Path,
        on_batch: BatchCallback,
    ) -> Result<Box<dyn WatchHandle>> {
        // Canonicalize once so event paths share a stable base.
        let root = directory
            .canonicalize()
            .unwrap_or_else(|_| directory.to_path_buf());

        let active = Arc::new(AtomicBool::new(true));
        let callback_active = Arc::clone(&active);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(_) if !callback_active.load(Ordering::SeqCst) => {}
                Ok(event) => {
                    debug!(?event, "received notify event");
                    let batch = classify_event(&event);
                    if !batch.is_empty() {
                        on_batch(batch);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "file watch error");
                }
            },
            Config::default(),
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!("file watcher started on {:?}", root);

        Ok(Box::new(NotifyHandle {
            root,
            active,
            inner: Some(watcher),
        }))
    }
}

impl WatchHandle for NotifyHandle {
    fn stop(&mut self) -> Result<()> {
        let watcher = self
            .inner
            .take()
            .ok_or(WatchrunError::AlreadyStopped("watch subscription"))?;
        self.active.store(false, Ordering::SeqCst);
        drop(watcher);
        info!("file watcher stopped on {:?}", self.root);
        Ok(())
    }
}

/// Sort the paths of one notify event into modified / added / removed.
///
/// - create → added, remove → removed
/// - rename: `From` → removed, `To` → added, `Both` → `[from, to]`
/// - rename with unknown direction → added if the path still exists, else removed
/// - any other modification (data, metadata) → modified
/// - access and `Other` events carry no change and are dropped
pub fn classify_event(event: &Event) -> ChangeBatch {
    let mut batch = ChangeBatch::default();
    let paths = event.paths.iter().cloned();

    match event.kind {
        EventKind::Create(_) => batch.added.extend(paths),
        EventKind::Remove(_) => batch.removed.extend(paths),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => batch.removed.extend(paths),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => batch.added.extend(paths),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = event.paths.iter().cloned();
            if let Some(from) = paths.next() {
                batch.removed.push(from);
            }
            batch.added.extend(paths);
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            for path in paths {
                if path.exists() {
                    batch.added.push(path);
                } else {
                    batch.removed.push(path);
                }
            }
        }
        EventKind::Modify(_) | EventKind::Any => batch.modified.extend(paths),
        EventKind::Access(_) | EventKind::Other => {}
    }

    batch
}
