//! Basic host facts: architecture, kernel and fully qualified name

use std::path::Path;
use std::sync::Arc;

use pkgscout_exec::SystemProbe;
use tracing::{debug, instrument};

use crate::error::InventoryError;

/// Fallback source for the host name
pub const HOSTNAME_PATH: &str = "/etc/hostname";

/// Probes host facts other than the distribution
pub struct HostProbe {
    probe: Arc<dyn SystemProbe>,
}

impl HostProbe {
    /// Create a new host probe
    pub fn new(probe: Arc<dyn SystemProbe>) -> Self {
        Self { probe }
    }

    /// Machine hardware name from `uname -m`
    ///
    /// # Errors
    /// Returns `InventoryError::UnknownArchitecture` if `uname` fails.
    #[instrument(skip(self))]
    pub fn architecture(&self) -> Result<String, InventoryError> {
        self.command_value("uname", &["-m"])
            .ok_or(InventoryError::UnknownArchitecture)
    }

    /// Kernel release from `uname -r`
    ///
    /// # Errors
    /// Returns `InventoryError::UnknownKernel` if `uname` fails.
    #[instrument(skip(self))]
    pub fn kernel(&self) -> Result<String, InventoryError> {
        self.command_value("uname", &["-r"])
            .ok_or(InventoryError::UnknownKernel)
    }

    /// Fully qualified domain name from `hostname -f`, else `/etc/hostname`
    ///
    /// # Errors
    /// Returns `InventoryError::UnknownFqdn` if both sources fail.
    #[instrument(skip(self))]
    pub fn fqdn(&self) -> Result<String, InventoryError> {
        if let Some(fqdn) = self.command_value("hostname", &["-f"]) {
            return Ok(fqdn);
        }

        match self.probe.read_file(Path::new(HOSTNAME_PATH)) {
            Ok(bytes) => first_line(&bytes).ok_or(InventoryError::UnknownFqdn),
            Err(e) => {
                debug!(error = %e, "hostname file unavailable");
                Err(InventoryError::UnknownFqdn)
            }
        }
    }

    fn command_value(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.probe.run_checked(program, args) {
            Ok(stdout) => first_line(&stdout),
            Err(e) => {
                debug!(program, error = %e, "host fact unavailable");
                None
            }
        }
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.lines().next().unwrap_or_default().trim();
    (!line.is_empty()).then(|| line.to_string())
}
