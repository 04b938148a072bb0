#![allow(dead_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchrun::config::{KeypressOptions, RawConfigFile, WatchConfig};
use watchrun::engine::Orchestrator;
use watchrun::report::Reporter;

use crate::clock::ManualClock;
use crate::fake_backend::RecordingBackend;
use crate::scripted::ScriptedWatchService;

/// Clonable in-memory writer for capturing reporter output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a test needs to drive an orchestrator by hand.
pub struct Harness {
    pub orchestrator: Arc<Orchestrator>,
    pub backend: Arc<RecordingBackend>,
    pub clock: Arc<ManualClock>,
    pub output: SharedBuffer,
    pub watch: ScriptedWatchService,
}

impl Harness {
    /// Subscribe to the scripted watch service without a keypress monitor.
    pub fn start(&self) {
        self.orchestrator
            .start(&self.watch, None, KeypressOptions::default())
            .expect("scripted start cannot fail");
    }
}

/// Builder for [`Harness`]; defaults to `echo test`, a 10s interval and a
/// recording backend that succeeds immediately.
pub struct HarnessBuilder {
    config: WatchConfig,
    backend: Option<Arc<RecordingBackend>>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: WatchConfig::new(".", "echo test"),
            backend: None,
        }
    }

    pub fn command(mut self, command: &str) -> Self {
        self.config.command = command.to_string();
        self
    }

    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.directory = dir.into();
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.minimum_frequency = interval;
        self
    }

    pub fn backend(mut self, backend: Arc<RecordingBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Harness {
        let backend = self.backend.unwrap_or_else(RecordingBackend::new);
        let clock = Arc::new(ManualClock::new());
        let output = SharedBuffer::new();
        let reporter = Arc::new(Reporter::new(Box::new(output.clone()), false));
        let orchestrator = Orchestrator::new(
            self.config,
            backend.clone(),
            reporter,
            clock.clone(),
        );

        Harness {
            orchestrator,
            backend,
            clock,
            output,
            watch: ScriptedWatchService::new(),
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawConfigFile`.
#[derive(Default)]
pub struct RawConfigBuilder {
    config: RawConfigFile,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, dir: &str) -> Self {
        self.config.watch.directory = Some(PathBuf::from(dir));
        self
    }

    pub fn command(mut self, command: &str) -> Self {
        self.config.watch.command = Some(command.to_string());
        self
    }

    pub fn interval(mut self, interval: &str) -> Self {
        self.config.watch.interval = Some(interval.to_string());
        self
    }

    pub fn keys_enabled(mut self, enabled: bool) -> Self {
        self.config.keys.enabled = Some(enabled);
        self
    }

    pub fn settle_delay(mut self, delay: &str) -> Self {
        self.config.keys.settle_delay = Some(delay.to_string());
        self
    }

    pub fn startup_grace(mut self, grace: &str) -> Self {
        self.config.keys.startup_grace = Some(grace.to_string());
        self
    }

    pub fn build(self) -> RawConfigFile {
        self.config
    }
}
