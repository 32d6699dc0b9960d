//! Shell command runner.
//!
//! Runs a command line through the platform shell (`sh -c` on Unix,
//! `cmd /C` on Windows) with tokio, so a long-running command never blocks
//! the runtime. The child is killed when the cancellation token fires.

use async_trait::async_trait;
use capdispatch_application::{CommandOutput, CommandRunner, RunnerError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Maximum captured size per stream (1 MB)
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        }
    }
}

/// Decode at most [`MAX_OUTPUT_SIZE`] bytes; returns whether bytes were dropped.
fn decode_limited(bytes: &[u8]) -> (String, bool) {
    let truncated = bytes.len() > MAX_OUTPUT_SIZE;
    let kept = &bytes[..bytes.len().min(MAX_OUTPUT_SIZE)];
    (String::from_utf8_lossy(kept).into_owned(), truncated)
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError> {
        let mut cmd = Self::shell_command(command);

        if let Some(dir) = working_dir {
            if !dir.is_dir() {
                return Err(RunnerError::Spawn(format!(
                    "working directory does not exist: {}",
                    dir.display()
                )));
            }
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command, "spawning shell command");
        let child = cmd.spawn().map_err(|e| RunnerError::Spawn(e.to_string()))?;

        // Dropping the wait future on cancellation drops the child, which kills it.
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(command, "shell command cancelled");
                return Err(RunnerError::Cancelled);
            }
            output = child.wait_with_output() => output.map_err(|e| RunnerError::Io(e.to_string()))?,
        };

        let (stdout, stdout_truncated) = decode_limited(&output.stdout);
        let (stderr, stderr_truncated) = decode_limited(&output.stderr);

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout,
            stderr,
            truncated: stdout_truncated || stderr_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_limited_cuts_on_bytes() {
        let mut bytes = vec![b'a'; MAX_OUTPUT_SIZE - 1];
        bytes.extend_from_slice("é".as_bytes());

        let (text, truncated) = decode_limited(&bytes);
        assert!(truncated);
        // The split multi-byte char decodes to a replacement char instead of panicking.
        assert!(text.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_decode_limited_small_input() {
        assert_eq!(decode_limited(b"hello"), ("hello".to_string(), false));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_echo() {
        let runner = ShellCommandRunner::new();
        let output = runner
            .run("echo hello", None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert!(output.stderr.is_empty());
        assert!(!output.truncated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_nonzero_exit() {
        let output = ShellCommandRunner::new()
            .run("echo oops >&2; exit 3", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let output = ShellCommandRunner::new()
            .run("ls", Some(dir.path()), &CancellationToken::new())
            .await
            .unwrap();
        assert!(output.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_missing_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = ShellCommandRunner::new()
            .run("echo hi", Some(&missing), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn(msg) if msg.contains("does not exist")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_kills_command() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = ShellCommandRunner::new()
            .run("sleep 10", None, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, RunnerError::Cancelled);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
