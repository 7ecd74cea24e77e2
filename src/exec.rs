use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub exit_code: i32,
}

/// Runs a shell command line and captures its stdout. Implementations must
/// report a non-zero exit or an expired timeout as an [`ExecError`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str, timeout: Option<Duration>) -> Result<CommandOutput, ExecError>;
}

/// Runs commands through `/bin/sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str, timeout: Option<Duration>) -> Result<CommandOutput, ExecError> {
        debug!(command = command_line, ?timeout, "running command");

        let mut command = Command::new("/bin/sh");
        command
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // a timed out command is dropped mid-flight
            .kill_on_drop(true);
        let child = command.output();

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ExecError::TimedOut {
                        command: command_line.to_string(),
                        timeout: limit,
                    })
                }
            },
            None => child.await,
        }
        .map_err(|source| ExecError::Spawn {
            command: command_line.to_string(),
            source,
        })?;

        let Some(exit_code) = output.status.code() else {
            return Err(ExecError::Killed {
                command: command_line.to_string(),
            });
        };

        if exit_code != 0 {
            return Err(ExecError::Failed {
                command: command_line.to_string(),
                code: exit_code,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            exit_code,
        })
    }
}
