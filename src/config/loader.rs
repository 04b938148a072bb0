// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{RawConfigFile, Settings};
use crate::config::validate::validate_settings;
use crate::errors::{Result, WatchrunError};
use crate::fs::FileSystem;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "Watchrun.toml";

/// Read and deserialize a config file. No semantic validation.
///
/// A relative `[watch].directory` is rebased onto the file's parent directory.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;
    let mut config: RawConfigFile = toml::from_str(&contents)?;

    if let Some(dir) = config.watch.directory.take() {
        config.watch.directory = Some(rebase(path, dir));
    }

    Ok(config)
}

fn rebase(config_path: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        return dir;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(dir),
        _ => dir,
    }
}

/// Split positional tokens into a watch directory and a command line.
///
/// Any token naming an existing directory becomes the target (last one
/// wins); the others are joined with single spaces, in order.
pub fn split_tokens(tokens: &[String], fs: &dyn FileSystem) -> (Option<PathBuf>, String) {
    let mut directory = None;
    let mut words: Vec<&str> = Vec::new();

    for token in tokens {
        let as_path = Path::new(token);
        if fs.is_dir(as_path) {
            directory = Some(as_path.to_path_buf());
        } else {
            words.push(token);
        }
    }

    (directory, words.join(" "))
}

/// Build the final [`Settings`]: config file, then CLI overrides, then validation.
///
/// - `--config PATH` must exist.
/// - Without it, [`DEFAULT_CONFIG_FILE`] is used when present.
pub fn resolve_settings(args: &CliArgs, fs: &dyn FileSystem) -> Result<Settings> {
    let mut raw = match args.config.as_deref() {
        Some(path) => {
            if !fs.exists(Path::new(path)) {
                return Err(WatchrunError::ConfigError(format!(
                    "config file {:?} not found",
                    path
                )));
            }
            load_from_path(fs, path)?
        }
        None if fs.exists(Path::new(DEFAULT_CONFIG_FILE)) => {
            debug!("using {DEFAULT_CONFIG_FILE} from the working directory");
            load_from_path(fs, DEFAULT_CONFIG_FILE)?
        }
        None => RawConfigFile::default(),
    };

    let (directory, command) = split_tokens(&args.tokens, fs);
    if let Some(dir) = directory {
        raw.watch.directory = Some(dir);
    }
    if !command.is_empty() {
        raw.watch.command = Some(command);
    }
    if let Some(ref interval) = args.interval {
        raw.watch.interval = Some(interval.clone());
    }
    if args.no_keys {
        raw.keys.enabled = Some(false);
    }

    validate_settings(raw, fs)
}
