//! Package manager traits

use crate::error::PackageError;
use crate::types::{Package, PackageFamily};

/// Enumerates installed packages and their provenance
pub trait PackageManager: Send + Sync {
    /// List every installed package, fully classified
    ///
    /// # Errors
    /// Returns `PackageError` if the package database or any classification
    /// input cannot be read. No partial list is returned.
    fn list_installed(&self) -> Result<Vec<Package>, PackageError>;

    /// Package manager family
    fn family(&self) -> PackageFamily;
}
