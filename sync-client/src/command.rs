//! Running external command-line programs.
//!
//! Every invocation is bounded by a timeout and the child is killed if the
//! timeout elapses.

use crate::error::{ClientError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Captured output of a finished program.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code (-1 if killed by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Whether the program exited 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty trimmed lines of standard output.
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A program plus the timeout applied to each of its invocations.
#[derive(Debug, Clone)]
pub struct Program {
    path: PathBuf,
    timeout: Duration,
}

impl Program {
    /// Wrap a program path.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// The program path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run with arguments, returning the output regardless of exit code.
    pub async fn exec(&self, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!("exec {} {}", self.path.display(), args.join(" "));

        let child = Command::new(&self.path)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ClientError::CommandTimeout {
                program: self.path.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| ClientError::Spawn {
                program: self.path.clone(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Run with arguments, failing on non-zero exit.
    pub async fn exec_ok(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.exec(args).await?;
        if !output.success() {
            return Err(ClientError::CommandFailed {
                program: self.path.clone(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}
