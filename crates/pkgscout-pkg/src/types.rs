//! Type definitions for package lookup

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported Linux distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Ubuntu
    Ubuntu,
    /// Debian
    Debian,
    /// Red Hat Enterprise Linux
    Rhel,
    /// CentOS
    Centos,
    /// Amazon Linux AMI
    Amzn,
    /// openSUSE
    Opensuse,
    /// SUSE Linux Enterprise Server
    Sles,
    /// Identified, but not one of the supported distributions
    Unknown,
}

impl Distribution {
    /// Every supported distribution
    pub const SUPPORTED: [Distribution; 7] = [
        Distribution::Ubuntu,
        Distribution::Debian,
        Distribution::Rhel,
        Distribution::Centos,
        Distribution::Amzn,
        Distribution::Opensuse,
        Distribution::Sles,
    ];

    /// Map an os-release `ID` value to a distribution
    #[must_use]
    pub fn from_os_release_id(id: &str) -> Self {
        match id {
            "opensuse-leap" | "opensuse-tumbleweed" => Distribution::Opensuse,
            other => other.parse().unwrap_or(Distribution::Unknown),
        }
    }

    /// Canonical id as used in os-release
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Distribution::Ubuntu => "ubuntu",
            Distribution::Debian => "debian",
            Distribution::Rhel => "rhel",
            Distribution::Centos => "centos",
            Distribution::Amzn => "amzn",
            Distribution::Opensuse => "opensuse",
            Distribution::Sles => "sles",
            Distribution::Unknown => "unknown",
        }
    }

    /// Package manager family, if the distribution is supported
    #[must_use]
    pub fn family(&self) -> Option<PackageFamily> {
        match self {
            Distribution::Ubuntu | Distribution::Debian => Some(PackageFamily::Apt),
            Distribution::Rhel
            | Distribution::Centos
            | Distribution::Amzn
            | Distribution::Opensuse
            | Distribution::Sles => Some(PackageFamily::Rpm),
            Distribution::Unknown => None,
        }
    }

    /// RPM `%{VENDOR}` string the distribution signs its own packages with
    #[must_use]
    pub fn rpm_vendor(&self) -> Option<&'static str> {
        match self {
            Distribution::Rhel => Some("Red Hat, Inc."),
            Distribution::Centos => Some("CentOS"),
            Distribution::Amzn => Some("Amazon.com"),
            Distribution::Opensuse => Some("openSUSE"),
            Distribution::Sles => Some("SUSE LLC <https://www.suse.com/>"),
            _ => None,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distribution::SUPPORTED
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unsupported distribution: {s}"))
    }
}

/// Package manager family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageFamily {
    /// dpkg/APT (Debian/Ubuntu)
    Apt,
    /// RPM (RHEL/CentOS/Amazon/SUSE)
    Rpm,
}

impl fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFamily::Apt => write!(f, "apt"),
            PackageFamily::Rpm => write!(f, "rpm"),
        }
    }
}

/// An installed package with its provenance
///
/// Only produced once classification is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Full version string
    pub version: String,
    /// Name of the source package, or `unknown`
    pub source: String,
    /// Package architecture
    pub architecture: String,
    /// Shipped by the distribution vendor rather than a third party
    pub official: bool,
}

/// A package read from the dpkg status database, not yet classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpkgEntry {
    /// Package name
    pub name: String,
    /// Full version string
    pub version: String,
    /// Package architecture
    pub architecture: String,
    /// Name of the source package
    pub source: String,
    /// Maintainer field, used only for classification
    pub maintainer: String,
}

impl DpkgEntry {
    /// Finalize the entry with its provenance
    #[must_use]
    pub fn into_package(self, official: bool) -> Package {
        Package {
            name: self.name,
            version: self.version,
            source: self.source,
            architecture: self.architecture,
            official,
        }
    }
}
