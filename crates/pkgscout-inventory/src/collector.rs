//! High-level inventory collection API

use std::sync::Arc;

use chrono::Utc;
use pkgscout_exec::SystemProbe;
use pkgscout_pkg::{PackageError, installed_packages};
use tracing::{info, instrument};

use crate::error::InventoryError;
use crate::host::HostProbe;
use crate::release::DistributionResolver;
use crate::types::{DistributionIdentity, HostInfo, HostInventory};

/// Inventory collector
///
/// Resolves the distribution, probes host facts and lists installed packages.
/// Nothing is cached: every call re-reads the live system.
pub struct InventoryCollector {
    probe: Arc<dyn SystemProbe>,
    labels: Vec<String>,
}

impl InventoryCollector {
    /// Create a new inventory collector
    pub fn new(probe: Arc<dyn SystemProbe>) -> Self {
        Self {
            probe,
            labels: Vec::new(),
        }
    }

    /// Attach operator labels to the host record
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Resolve distribution and release
    ///
    /// # Errors
    /// Returns `UnknownDistribution` or `UnknownRelease` if every source is exhausted.
    pub fn distribution(&self) -> Result<DistributionIdentity, InventoryError> {
        DistributionResolver::new(self.probe.clone()).resolve()
    }

    /// Collect host identification
    ///
    /// # Errors
    /// Returns an error if the distribution or any host fact cannot be determined.
    #[instrument(skip(self))]
    pub fn host_info(&self) -> Result<HostInfo, InventoryError> {
        self.describe(self.distribution()?)
    }

    fn describe(&self, identity: DistributionIdentity) -> Result<HostInfo, InventoryError> {
        let host = HostProbe::new(self.probe.clone());

        Ok(HostInfo {
            fqdn: host.fqdn()?,
            distribution: identity.id,
            release: identity.release,
            architecture: host.architecture()?,
            kernel: host.kernel()?,
            labels: self.labels.clone(),
        })
    }

    /// Collect full inventory
    ///
    /// # Errors
    /// Returns an error if host identification or package lookup fails. No
    /// partial inventory is returned.
    #[instrument(skip(self))]
    pub fn collect(&self) -> Result<HostInventory, InventoryError> {
        info!("collecting inventory");

        let identity = self.distribution()?;
        let unrecognised = identity.unrecognised.clone();
        let host = self.describe(identity)?;

        if let Some(name) = unrecognised {
            return Err(PackageError::DistributionNotSupported(name).into());
        }
        let packages = installed_packages(host.distribution, self.probe.clone())?;

        let inventory = HostInventory {
            host,
            packages,
            collected_at: Utc::now(),
        };

        info!(
            packages = inventory.packages.len(),
            official = inventory.official_count(),
            third_party = inventory.third_party_count(),
            "inventory collection completed"
        );

        Ok(inventory)
    }
}
