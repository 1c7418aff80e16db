//! Error types for pkgscout-pkg

use pkgscout_exec::ProbeError;
use thiserror::Error;

/// Errors that can occur during package lookup
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// No package manager pipeline for this distribution, named as reported
    #[error("distribution is not supported: {0}")]
    DistributionNotSupported(String),

    /// dpkg status database could not be read
    #[error("package status database unavailable: {0}")]
    StatusUnavailable(ProbeError),

    /// rpm query could not be executed or exited non-zero
    #[error("package query failed: {0}")]
    QueryFailed(ProbeError),

    /// APT source list could not be read
    #[error("repository list unavailable: {0}")]
    RepositoriesUnavailable(ProbeError),

    /// `apt-cache policy` could not be executed or exited non-zero
    #[error("package policy unavailable: {0}")]
    PolicyUnavailable(ProbeError),

    /// A classification pattern did not compile
    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

impl PackageError {
    /// Check if the package manager's primary data source failed
    #[must_use]
    pub fn is_enumeration_failure(&self) -> bool {
        matches!(
            self,
            PackageError::StatusUnavailable(_) | PackageError::QueryFailed(_)
        )
    }

    /// Check if classification inputs (sources or policy) failed
    #[must_use]
    pub fn is_classification_failure(&self) -> bool {
        matches!(
            self,
            PackageError::RepositoriesUnavailable(_) | PackageError::PolicyUnavailable(_)
        )
    }
}
