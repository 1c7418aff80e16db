//! In-memory probe for tests
//!
//! Files and commands are registered up front; anything not registered reports
//! `ProbeError::NotFound`. Every call is recorded so tests can assert which
//! sources were consulted and in what order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ProbeError;
use crate::result::CommandOutput;
use crate::traits::{SystemProbe, command_line};

/// Stubbed system probe
#[derive(Debug, Default)]
pub struct StubProbe {
    files: HashMap<PathBuf, Result<Vec<u8>, ProbeError>>,
    commands: HashMap<String, Result<CommandOutput, ProbeError>>,
    programs: HashMap<String, Result<CommandOutput, ProbeError>>,
    calls: Mutex<Vec<String>>,
}

impl StubProbe {
    /// Create an empty stub
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register file contents
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), Ok(content.into()));
        self
    }

    /// Register a failing file read
    #[must_use]
    pub fn file_error(mut self, path: impl Into<PathBuf>, err: ProbeError) -> Self {
        self.files.insert(path.into(), Err(err));
        self
    }

    /// Register the output of an exact command line
    #[must_use]
    pub fn command(mut self, program: &str, args: &[&str], output: CommandOutput) -> Self {
        self.commands.insert(command_line(program, args), Ok(output));
        self
    }

    /// Register a command that cannot be run
    #[must_use]
    pub fn command_error(mut self, program: &str, args: &[&str], err: ProbeError) -> Self {
        self.commands.insert(command_line(program, args), Err(err));
        self
    }

    /// Register output for a program regardless of its arguments
    #[must_use]
    pub fn program(mut self, program: &str, output: CommandOutput) -> Self {
        self.programs.insert(program.to_string(), Ok(output));
        self
    }

    /// Calls made so far, as `read <path>` or `run <command line>`
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl SystemProbe for StubProbe {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, ProbeError> {
        self.record(format!("read {}", path.display()));
        self.files
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::NotFound(path.display().to_string())))
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        let cmd = command_line(program, args);
        self.record(format!("run {cmd}"));
        self.commands
            .get(&cmd)
            .or_else(|| self.programs.get(program))
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::NotFound(program.to_string())))
    }

    fn probe_type(&self) -> &'static str {
        "stub"
    }
}
