//! Error types for pkgscout-exec

use thiserror::Error;

/// Errors that can occur while probing the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// File or command does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// File exists but could not be read
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// Process could not be started
    #[error("failed to spawn {command}: {reason}")]
    SpawnFailed {
        /// Command line
        command: String,
        /// Underlying I/O error
        reason: String,
    },

    /// Command ran but exited with a non-zero status
    #[error("command failed: {command} exited with {status} - {stderr}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Exit status code
        status: i32,
        /// Stderr output
        stderr: String,
    },
}

impl ProbeError {
    /// Check if the source was simply absent, as opposed to present but broken
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProbeError::NotFound(_) | ProbeError::SpawnFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(ProbeError::NotFound("/etc/os-release".to_string()).is_unavailable());
        assert!(
            !ProbeError::CommandFailed {
                command: "rpm -qa".to_string(),
                status: 1,
                stderr: String::new(),
            }
            .is_unavailable()
        );
    }
}
