// src/watch/subscription.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::Result;

/// Paths reported together by one watch callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub modified: Vec<PathBuf>,
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn new(modified: Vec<PathBuf>, added: Vec<PathBuf>, removed: Vec<PathBuf>) -> Self {
        Self {
            modified,
            added,
            removed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// `(modified, added, removed)` path counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.modified.len(), self.added.len(), self.removed.len())
    }
}

/// Invoked for every batch, possibly on a thread owned by the watch backend.
pub type BatchCallback = Arc<dyn Fn(ChangeBatch) + Send + Sync>;

/// Something that can watch a directory and report change batches.
pub trait WatchService {
    fn subscribe(
        &self,
        directory: &Path,
        on_batch: BatchCallback,
    ) -> Result<Box<dyn WatchHandle>>;
}

/// Live subscription. Dropping it also ends the subscription.
pub trait WatchHandle: Send {
    /// Stop delivering batches. A second call returns
    /// [`crate::errors::WatchrunError::AlreadyStopped`].
    fn stop(&mut self) -> Result<()>;
}
