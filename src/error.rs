use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single command invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    #[error("`{command}` returned {code}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` was terminated by a signal")]
    Killed { command: String },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Errors that abort a whole collection run.
#[derive(Debug, Error)]
pub enum NimError {
    #[error("unable to read NIM configuration {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unable to read settings file {}: {source}", .path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = NimError> = std::result::Result<T, E>;
