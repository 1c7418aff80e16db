//! System probe trait

use std::path::Path;

use crate::error::ProbeError;
use crate::result::CommandOutput;

/// Read-only access to the host: files and command output.
///
/// Every call blocks until the file is read or the process exits. There is no
/// timeout; callers that need one bound the whole run at the process level.
pub trait SystemProbe: Send + Sync {
    /// Read a file into memory
    ///
    /// # Errors
    /// Returns `ProbeError::NotFound` if the file does not exist and
    /// `ProbeError::ReadFailed` for any other I/O failure.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, ProbeError>;

    /// Run a program with arguments and capture its output
    ///
    /// A non-zero exit status is reported through [`CommandOutput::status`].
    ///
    /// # Errors
    /// Returns `ProbeError::NotFound` or `ProbeError::SpawnFailed` if the
    /// process could not be started.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError>;

    /// Run a program and return stdout, treating a non-zero exit as failure
    ///
    /// # Errors
    /// Returns `ProbeError::CommandFailed` on a non-zero exit, or whatever
    /// [`SystemProbe::run`] returned.
    fn run_checked(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, ProbeError> {
        let output = self.run(program, args)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(ProbeError::CommandFailed {
                command: command_line(program, args),
                status: output.status,
                stderr: output.stderr,
            })
        }
    }

    /// Probe type for logging
    fn probe_type(&self) -> &'static str;
}

/// Render a program and its arguments as a single line
#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
