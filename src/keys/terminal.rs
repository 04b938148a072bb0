// src/keys/terminal.rs

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use crossterm::terminal;
use tracing::debug;

use crate::errors::{Result, WatchrunError};
use crate::keys::KeySource;

/// Keystrokes from the controlling terminal via `crossterm`.
///
/// Opening puts the terminal in raw mode so single keys arrive without
/// Enter; [`restore_terminal`] undoes it.
#[derive(Debug)]
pub struct CrosstermKeys {
    _private: (),
}

impl CrosstermKeys {
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| {
            WatchrunError::TerminalError(format!("cannot put the terminal in raw mode: {e}"))
        })?;
        debug!("terminal raw mode enabled");
        Ok(Self { _private: () })
    }
}

impl KeySource for CrosstermKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    fn restorer(&self) -> Box<dyn Fn() + Send + Sync> {
        Box::new(restore_terminal)
    }
}

impl Drop for CrosstermKeys {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leave raw mode. Errors are ignored; there is nothing left to do about them.
pub fn restore_terminal() {
    if let Err(err) = terminal::disable_raw_mode() {
        debug!(error = %err, "failed to leave raw mode");
    }
}
