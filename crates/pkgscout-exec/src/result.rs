//! Result types for command execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a command execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit status code (0 for success)
    pub status: i32,
    /// Raw stdout bytes
    pub stdout: Vec<u8>,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandOutput {
    /// Successful output carrying `stdout`
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Failed output with the given status and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stdout decoded as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}
