// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    DEFAULT_MINIMUM_FREQUENCY, DEFAULT_SETTLE_DELAY, DEFAULT_STARTUP_GRACE, KeypressOptions,
    RawConfigFile, Settings, WatchConfig,
};
use crate::errors::{Result, WatchrunError};
use crate::fs::FileSystem;

const MAX_SETTLE_DELAY: Duration = Duration::from_secs(5);
const MAX_STARTUP_GRACE: Duration = Duration::from_secs(60);

/// Turn a merged raw config into [`Settings`], applying defaults.
///
/// Checks:
/// - the watch directory exists and is a directory,
/// - every duration string parses,
/// - `startup_grace` is at most a minute,
/// - `settle_delay` stays below five seconds (it is paid on every keystroke).
pub fn validate_settings(raw: RawConfigFile, fs: &dyn FileSystem) -> Result<Settings> {
    let directory = raw
        .watch
        .directory
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    if !fs.is_dir(&directory) {
        return Err(WatchrunError::ConfigError(format!(
            "watch directory {:?} does not exist or is not a directory",
            directory
        )));
    }

    let command = raw.watch.command.unwrap_or_default().trim().to_string();
    let minimum_frequency =
        parse_field("[watch].interval", raw.watch.interval, DEFAULT_MINIMUM_FREQUENCY)?;

    let startup_grace =
        parse_field("[keys].startup_grace", raw.keys.startup_grace, DEFAULT_STARTUP_GRACE)?;
    if startup_grace > MAX_STARTUP_GRACE {
        return Err(WatchrunError::ConfigError(format!(
            "[keys].startup_grace must be at most 60s (got {}s)",
            startup_grace.as_secs()
        )));
    }
    let settle_delay =
        parse_field("[keys].settle_delay", raw.keys.settle_delay, DEFAULT_SETTLE_DELAY)?;
    if settle_delay >= MAX_SETTLE_DELAY {
        return Err(WatchrunError::ConfigError(format!(
            "[keys].settle_delay must be below 5s (got {}ms)",
            settle_delay.as_millis()
        )));
    }

    Ok(Settings {
        watch: WatchConfig {
            directory,
            command,
            minimum_frequency,
        },
        keys: KeypressOptions {
            enabled: raw.keys.enabled.unwrap_or(true),
            startup_grace,
            settle_delay,
        },
    })
}

fn parse_field(field: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(s) => parse_duration(&s)
            .map_err(|e| WatchrunError::ConfigError(format!("{field}: {e}"))),
    }
}
