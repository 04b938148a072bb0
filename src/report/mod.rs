// src/report/mod.rs

//! Human-readable terminal output.
//!
//! Logs go to stderr through `tracing`; this module owns stdout. All writes
//! pass through [`CrlfWriter`] so they render correctly in raw mode, and a
//! single lock keeps lines from the watch thread and the keypress thread
//! from interleaving.

pub mod crlf;

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use crossterm::style::{Color, Stylize, style};
use tracing::debug;

pub use crlf::CrlfWriter;

use crate::config::duration::format_duration;
use crate::config::model::WatchConfig;
use crate::exec::CommandOutput;
use crate::state::CounterSnapshot;
use crate::types::TriggerReason;

const RULE: &str = "─────────────────────────────";
const QUIT_HINT: &str = " • Press 'q' to exit (or Ctrl-C if nothing else works).";

pub struct Reporter {
    out: Mutex<CrlfWriter<Box<dyn Write + Send>>>,
    color: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            out: Mutex::new(CrlfWriter::new(out)),
            color,
        }
    }

    /// Reporter on stdout; colour only when stdout is a terminal.
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), color)
    }

    pub fn banner(&self, config: &WatchConfig, keys_enabled: bool) {
        let interval = format_duration(config.minimum_frequency);
        let mut lines = vec![
            String::new(),
            self.paint(&format!("{RULE}┤ WATCH ├{RULE}"), Color::Yellow, true),
            self.paint(
                &format!("Watching {} for changes...", config.directory.display()),
                Color::Yellow,
                true,
            ),
        ];
        if !config.command.is_empty() {
            lines.push(format!(
                "{}{}",
                self.paint(" • If detected, the following command will run: ", Color::Yellow, true),
                self.paint(&config.command, Color::Cyan, true),
            ));
        }
        lines.push(self.paint(
            &format!(" • Checking at most every {interval}."),
            Color::Green,
            true,
        ));
        if keys_enabled {
            lines.push(self.paint(
                " • Press space bar to force the check for file changes now.",
                Color::Green,
                true,
            ));
        }
        lines.push(self.paint(
            " • You'll see a yellow dot for changes, green for new files, red for deletes.",
            Color::Green,
            true,
        ));
        if keys_enabled {
            lines.push(self.paint(QUIT_HINT, Color::Yellow, true));
        } else {
            lines.push(self.paint(" • Press Ctrl-C to exit.", Color::Yellow, true));
        }
        lines.push(String::new());
        self.write_lines(&lines);
    }

    /// One dot per changed path.
    pub fn progress(&self, modified: usize, added: usize, removed: usize) {
        if modified + added + removed == 0 {
            return;
        }
        let line = format!(
            "{}{}{}",
            self.dots(modified, Color::Yellow),
            self.dots(added, Color::Green),
            self.dots(removed, Color::Red),
        );
        self.write_lines(&[line]);
    }

    pub fn manual_trigger(&self) {
        self.write_lines(&[
            String::new(),
            self.paint(" • Invoking a manually-triggered refresh...", Color::Yellow, true),
        ]);
    }

    /// Timestamp plus all three categories, zeroes included.
    pub fn run_header(
        &self,
        reason: TriggerReason,
        snapshot: &CounterSnapshot,
        at: DateTime<Local>,
    ) {
        self.write_lines(&[
            format!("@ {} ({reason})", at.format("%Y-%m-%d %H:%M:%S %z")),
            self.paint(&format!("modified: {}", snapshot.modified), Color::Blue, false),
            self.paint(&format!("   added: {}", snapshot.added), Color::Green, false),
            self.paint(&format!(" removed: {}", snapshot.removed), Color::Red, false),
        ]);
    }

    pub fn command_output(&self, output: &CommandOutput) {
        let mut lines: Vec<String> = output.stdout.lines().map(str::to_string).collect();
        lines.extend(
            output
                .stderr
                .lines()
                .map(|line| self.paint(line, Color::DarkRed, false)),
        );
        if !output.success {
            let code = output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            lines.push(self.paint(
                &format!(" • Command failed (exit {code}); still watching."),
                Color::Red,
                true,
            ));
        }
        self.write_lines(&lines);
    }

    pub fn command_error(&self, message: &str) {
        self.write_lines(&[self.paint(
            &format!(" • Command could not be started: {message}; still watching."),
            Color::Red,
            true,
        )]);
    }

    pub fn idle(&self, interval: std::time::Duration) {
        self.write_lines(&[
            self.paint(
                &format!("Waiting {} for the next update.", format_duration(interval)),
                Color::Yellow,
                false,
            ),
            self.paint(QUIT_HINT, Color::Yellow, true),
        ]);
    }

    pub fn shutdown_banner(&self) {
        self.write_lines(&[
            String::new(),
            String::new(),
            self.paint(&format!("{RULE}┤ EXIT ├{RULE}"), Color::Yellow, true),
        ]);
    }

    pub fn shutdown_step(&self, step: &str) {
        self.write_lines(&[self.paint(&format!(" • {step}"), Color::Red, true)]);
    }

    pub fn farewell(&self) {
        self.write_lines(&[format!(
            "{}{}",
            self.paint(" • Exiting....", Color::Red, false),
            self.paint("Thanks for playing....", Color::Green, false),
        )]);
    }

    fn dots(&self, count: usize, color: Color) -> String {
        let dots = "•".repeat(count);
        if dots.is_empty() || !self.color {
            return dots;
        }
        style(dots).with(color).on(Color::Magenta).bold().to_string()
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = style(text).with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let res = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{line}"))
            .and_then(|_| out.flush());
        if let Err(err) = res {
            debug!(error = %err, "failed to write terminal output");
        }
    }
}
