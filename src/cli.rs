// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchrun`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "watchrun",
    version,
    about = "Watch a directory and run a command when files change.",
    long_about = "Watch a directory and run a command when files change.\n\n\
        Positional tokens that name an existing directory select the directory \
        to watch (the last one wins); every other token becomes part of the \
        command line. Press space to run now, 'q' to quit."
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Default: `Watchrun.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Minimum time between automatic runs, e.g. `10s`, `500ms`, `2m`.
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Do not read the keyboard (no raw mode; Ctrl-C still quits).
    #[arg(long)]
    pub no_keys: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the settings, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Watch directory and/or command words.
    #[arg(
        value_name = "TOKENS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tokens: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
