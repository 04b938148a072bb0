// src/config/mod.rs

//! Configuration for watchrun.
//!
//! Responsibilities:
//! - Define the TOML-backed raw model and the validated settings (`model.rs`).
//! - Load an optional config file and fold CLI overrides into it (`loader.rs`).
//! - Validate the merged result against the filesystem (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::{format_duration, parse_duration};
pub use loader::{DEFAULT_CONFIG_FILE, load_from_path, resolve_settings, split_tokens};
pub use model::{
    DEFAULT_MINIMUM_FREQUENCY, DEFAULT_SETTLE_DELAY, DEFAULT_STARTUP_GRACE, KeypressOptions,
    KeysSection, RawConfigFile, Settings, WatchConfig, WatchSection,
};
pub use validate::validate_settings;
