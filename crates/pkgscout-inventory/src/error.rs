//! Error types for pkgscout-inventory

use pkgscout_pkg::PackageError;
use thiserror::Error;

/// Errors that can occur during inventory collection
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// No source identified the distribution
    #[error("unknown distribution")]
    UnknownDistribution,

    /// A distribution was identified but no source gave its release
    #[error("unknown release")]
    UnknownRelease,

    /// `uname -m` failed
    #[error("unknown architecture")]
    UnknownArchitecture,

    /// `uname -r` failed
    #[error("unknown kernel")]
    UnknownKernel,

    /// Neither `hostname -f` nor `/etc/hostname` gave a name
    #[error("unknown fqdn")]
    UnknownFqdn,

    /// Package lookup failed
    #[error(transparent)]
    Package(#[from] PackageError),
}

impl InventoryError {
    /// Check if distribution resolution failed
    #[must_use]
    pub fn is_unknown_distribution(&self) -> bool {
        matches!(
            self,
            InventoryError::UnknownDistribution | InventoryError::UnknownRelease
        )
    }
}
