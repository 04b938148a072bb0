use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use watchrun::errors::{Result, WatchrunError};
use watchrun::exec::{CommandBackend, CommandOutput};

/// One-shot latch: `open` once, `wait` returns from then on.
#[derive(Debug, Default)]
pub struct Latch {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Latch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock().unwrap()
    }

    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }

    /// Returns `true` if the latch opened within `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let open = self.open.lock().unwrap();
        let (open, _) = self
            .cv
            .wait_timeout_while(open, timeout, |open| !*open)
            .unwrap();
        *open
    }
}

/// What the fake command does.
#[derive(Debug, Clone)]
pub enum BackendResponse {
    Succeed(String),
    Exit(i32),
    SpawnError,
}

/// A fake backend that:
/// - records every command it was asked to run
/// - tracks how many invocations overlap
/// - optionally sleeps or blocks on a latch before answering
pub struct RecordingBackend {
    invocations: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    response: Mutex<BackendResponse>,
    delay: Duration,
    started: Arc<Latch>,
    release: Option<Arc<Latch>>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Self::build(Duration::ZERO, None)
    }

    /// Every invocation sleeps for `delay` first.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Self::build(delay, None)
    }

    /// Every invocation blocks until `release` opens.
    pub fn holding(release: Arc<Latch>) -> Arc<Self> {
        Self::build(Duration::ZERO, Some(release))
    }

    fn build(delay: Duration, release: Option<Arc<Latch>>) -> Arc<Self> {
        Arc::new(Self {
            invocations: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            response: Mutex::new(BackendResponse::Succeed(String::new())),
            delay,
            started: Latch::new(),
            release,
        })
    }

    pub fn respond_with(&self, response: BackendResponse) {
        *self.response.lock().unwrap() = response;
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Highest number of simultaneously running invocations seen.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Opens as soon as the first invocation has started.
    pub fn started(&self) -> Arc<Latch> {
        Arc::clone(&self.started)
    }
}

impl CommandBackend for RecordingBackend {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        let now_running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_running, Ordering::SeqCst);

        self.invocations.lock().unwrap().push(command.to_string());
        self.started.open();

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(ref release) = self.release {
            release.wait();
        }

        let response = self.response.lock().unwrap().clone();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            BackendResponse::Succeed(stdout) => Ok(CommandOutput::success(stdout)),
            BackendResponse::Exit(code) => Ok(CommandOutput::failure(code, "boom")),
            BackendResponse::SpawnError => Err(WatchrunError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such shell",
            ))),
        }
    }
}
