//! Inventory type definitions

use chrono::{DateTime, Utc};
use pkgscout_pkg::{Distribution, Package};
use serde::{Deserialize, Serialize};

/// Distribution and release, always resolved together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionIdentity {
    /// Distribution id
    pub id: Distribution,
    /// Release version, e.g. `14.04`, `7` or `12.2`
    pub release: String,
    /// Name the source reported when it maps to no supported distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrecognised: Option<String>,
}

impl DistributionIdentity {
    /// Create a new identity
    pub fn new(id: Distribution, release: impl Into<String>) -> Self {
        Self {
            id,
            release: release.into(),
            unrecognised: None,
        }
    }

    /// Identity for a distribution name that maps to no supported id
    pub fn unrecognised(name: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            id: Distribution::Unknown,
            release: release.into(),
            unrecognised: Some(name.into()),
        }
    }
}

/// Host identification handed to the submission side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Fully qualified domain name
    pub fqdn: String,
    /// Distribution id
    pub distribution: Distribution,
    /// Release version
    pub release: String,
    /// Machine hardware name (`x86_64`, `aarch64`, ...)
    pub architecture: String,
    /// Kernel release
    pub kernel: String,
    /// Operator-assigned labels
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Complete host inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInventory {
    /// Host identification
    pub host: HostInfo,
    /// Installed packages
    pub packages: Vec<Package>,
    /// When inventory was collected
    pub collected_at: DateTime<Utc>,
}

impl HostInventory {
    /// Number of packages shipped by the distribution vendor
    #[must_use]
    pub fn official_count(&self) -> usize {
        self.packages.iter().filter(|p| p.official).count()
    }

    /// Number of third-party packages
    #[must_use]
    pub fn third_party_count(&self) -> usize {
        self.packages.len() - self.official_count()
    }
}
