//! Command runner port.
//!
//! Command-backed capabilities never spawn processes themselves; they go
//! through a [`CommandRunner`] so tests can substitute a scripted runner
//! and never perform real I/O.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from running an external command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    /// The process could not be started.
    #[error("failed to execute command: {0}")]
    Spawn(String),

    /// Reading the process output failed.
    #[error("failed to read command output: {0}")]
    Io(String),

    /// The caller cancelled while the process was running; it was killed.
    #[error("command cancelled")]
    Cancelled,
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Whether stdout or stderr was cut at the size limit.
    pub truncated: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout and stderr combined the way a terminal would show them.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr),
        }
    }
}

/// Port for executing a shell command line.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the platform shell, killing it if `cancel` fires.
    async fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_requires_zero_exit() {
        let mut output = CommandOutput {
            exit_code: Some(0),
            ..Default::default()
        };
        assert!(output.success());
        output.exit_code = Some(2);
        assert!(!output.success());
        output.exit_code = None;
        assert!(!output.success());
    }

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            exit_code: Some(1),
            stdout: "out".into(),
            stderr: "err".into(),
            truncated: false,
        };
        assert_eq!(output.combined(), "out\n--- stderr ---\nerr");

        let stderr_only = CommandOutput {
            stderr: "err".into(),
            ..Default::default()
        };
        assert_eq!(stderr_only.combined(), "err");
    }
}
