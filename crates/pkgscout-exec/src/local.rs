//! Local probe using `std::fs` and `std::process`

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, instrument};

use crate::error::ProbeError;
use crate::result::CommandOutput;
use crate::traits::{SystemProbe, command_line};

/// Local system probe
///
/// Reads files and runs commands on the machine the agent runs on.
#[derive(Debug, Clone)]
pub struct LocalProbe;

impl LocalProbe {
    /// Create a new local probe
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for LocalProbe {
    #[instrument(skip(self), level = "debug")]
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, ProbeError> {
        std::fs::read(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "file not readable");
            if e.kind() == ErrorKind::NotFound {
                ProbeError::NotFound(path.display().to_string())
            } else {
                ProbeError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }

    #[instrument(skip(self), level = "debug")]
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        let start = Instant::now();
        let cmd = command_line(program, args);

        debug!(command = %cmd, "executing local command");

        // No shell: arguments such as the rpm query format are passed verbatim
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ProbeError::NotFound(program.to_string())
                } else {
                    ProbeError::SpawnFailed {
                        command: cmd.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            command = %cmd,
            status = status,
            duration = ?duration,
            "command completed"
        );

        if !output.status.success() {
            debug!(
                command = %cmd,
                status = status,
                stderr = %stderr,
                "command failed"
            );
        }

        Ok(CommandOutput {
            status,
            stdout: output.stdout,
            stderr,
            duration,
        })
    }

    fn probe_type(&self) -> &'static str {
        "local"
    }
}
