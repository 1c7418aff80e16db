//! pkgscout-pkg: Installed package lookup and provenance
//!
//! Enumerates installed packages through the distribution's package manager
//! (dpkg/APT or RPM) and classifies each as official or third-party.

use std::sync::Arc;

use pkgscout_exec::SystemProbe;
use tracing::debug;

pub mod apt;
pub mod classify;
pub mod error;
pub mod policy;
pub mod rpm;
pub mod traits;
pub mod types;

pub use apt::AptManager;
pub use classify::{AptRules, Evidence};
pub use error::PackageError;
pub use rpm::RpmManager;
pub use traits::PackageManager;
pub use types::{Distribution, DpkgEntry, Package, PackageFamily};

/// Package manager for a distribution
///
/// # Errors
/// Returns `PackageError::DistributionNotSupported` for `Distribution::Unknown`.
pub fn manager_for(
    distribution: Distribution,
    probe: Arc<dyn SystemProbe>,
) -> Result<Box<dyn PackageManager>, PackageError> {
    debug!(%distribution, probe = probe.probe_type(), "selecting package manager");

    match distribution.family() {
        Some(PackageFamily::Apt) => Ok(Box::new(AptManager::new(
            probe,
            AptRules::for_distribution(distribution)?,
        ))),
        Some(PackageFamily::Rpm) => {
            let vendor = distribution
                .rpm_vendor()
                .ok_or_else(|| PackageError::DistributionNotSupported(distribution.to_string()))?;
            Ok(Box::new(RpmManager::new(probe, vendor)))
        }
        None => Err(PackageError::DistributionNotSupported(distribution.to_string())),
    }
}

/// Installed packages of the running distribution, fully classified
///
/// # Errors
/// Returns `PackageError` if the distribution is unsupported or any lookup stage fails.
pub fn installed_packages(
    distribution: Distribution,
    probe: Arc<dyn SystemProbe>,
) -> Result<Vec<Package>, PackageError> {
    manager_for(distribution, probe)?.list_installed()
}
