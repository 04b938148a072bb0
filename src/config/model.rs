// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Debounce interval used when nothing else is configured.
pub const DEFAULT_MINIMUM_FREQUENCY: Duration = Duration::from_secs(10);
/// Delay before the keypress monitor starts reading.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(2);
/// Pause after every raw keystroke read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// directory = "src"
/// command = "make test"
/// interval = "10s"
///
/// [keys]
/// enabled = true
/// startup_grace = "2s"
/// settle_delay = "100ms"
/// ```
///
/// Every field is optional; CLI flags are folded in before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub keys: KeysSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Directory to watch. Relative paths resolve against the working directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Shell command run on every trigger. Empty or missing means report only.
    #[serde(default)]
    pub command: Option<String>,

    /// Minimum time between automatic runs, e.g. `"10s"`.
    #[serde(default)]
    pub interval: Option<String>,
}

/// `[keys]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeysSection {
    /// Set to `false` to run without the interactive keyboard monitor.
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub startup_grace: Option<String>,

    #[serde(default)]
    pub settle_delay: Option<String>,
}

/// What to watch and what to run. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub directory: PathBuf,
    pub command: String,
    pub minimum_frequency: Duration,
}

impl WatchConfig {
    pub fn new(directory: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            command: command.into(),
            minimum_frequency: DEFAULT_MINIMUM_FREQUENCY,
        }
    }

    pub fn has_command(&self) -> bool {
        !self.command.trim().is_empty()
    }
}

/// Timing knobs for the keypress monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypressOptions {
    pub enabled: bool,
    pub startup_grace: Duration,
    pub settle_delay: Duration,
}

impl Default for KeypressOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            startup_grace: DEFAULT_STARTUP_GRACE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Fully resolved settings handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub watch: WatchConfig,
    pub keys: KeypressOptions,
}
