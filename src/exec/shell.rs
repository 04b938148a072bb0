// src/exec/shell.rs

use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::backend::{CommandBackend, CommandOutput};

/// Production backend: hands the command line to the platform shell and
/// waits for it to finish. No timeout.
#[derive(Debug, Clone, Default)]
pub struct ShellBackend;

impl ShellBackend {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        }
    }
}

impl CommandBackend for ShellBackend {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        info!(cmd = %command, "starting command process");

        let output = Self::shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("running command '{command}'"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr.lines() {
            debug!(cmd = %command, "stderr: {}", line);
        }

        let exit_code = output.status.code();
        info!(
            cmd = %command,
            exit_code = exit_code.unwrap_or(-1),
            success = output.status.success(),
            "command process exited"
        );

        Ok(CommandOutput {
            exit_code,
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}
