//! RPM package lookup (RHEL/CentOS/Amazon Linux/openSUSE/SLES)

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use pkgscout_exec::{FieldExtractor, SystemProbe};
use tracing::{info, instrument};

use crate::error::PackageError;
use crate::traits::PackageManager;
use crate::types::{Package, PackageFamily};

/// `rpm --queryformat` template; rpm expands the `\n` escapes itself
pub const QUERY_FORMAT: &str = r"Name: %{NAME}\nArchitecture: %{ARCH}\nVersion: %{VERSION}\nRelease: %{RELEASE}\nVendor: %{VENDOR}\nSource: %{SOURCERPM}\nEpoch: %{EPOCH}\n\n";

const NO_EPOCH: &str = "(none)";
const UNKNOWN_SOURCE: &str = "unknown";

static QUERY_FIELDS: LazyLock<FieldExtractor> = LazyLock::new(|| {
    FieldExtractor::new(&[
        "Name:",
        "Architecture:",
        "Version:",
        "Release:",
        "Vendor:",
        "Source:",
        "Epoch:",
    ])
    .expect("valid rpm query fields")
});

/// RPM package lookup
///
/// A package is official when its vendor equals the distribution's vendor.
pub struct RpmManager {
    probe: Arc<dyn SystemProbe>,
    /// Vendor string of the distribution
    vendor: String,
}

impl RpmManager {
    /// Create a new RPM lookup
    pub fn new(probe: Arc<dyn SystemProbe>, vendor: impl Into<String>) -> Self {
        Self {
            probe,
            vendor: vendor.into(),
        }
    }

    /// Parse output of `rpm -qa --queryformat QUERY_FORMAT`
    pub fn parse_query_output(output: &str, vendor: &str) -> Vec<Package> {
        let mut packages = Vec::new();

        for block in output.split("\n\n") {
            let mut fields = QUERY_FIELDS.extract(block);

            let name = fields.remove("Name:").unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            packages.push(Package {
                version: build_version(&fields),
                source: source_name(fields.get("Source:").map_or("", String::as_str)),
                architecture: fields.remove("Architecture:").unwrap_or_default(),
                official: fields.get("Vendor:").is_some_and(|v| v == vendor),
                name,
            });
        }

        packages
    }
}

impl PackageManager for RpmManager {
    #[instrument(skip(self), fields(vendor = %self.vendor))]
    fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        let output = self
            .probe
            .run_checked("rpm", &["-qa", "--queryformat", QUERY_FORMAT])
            .map_err(PackageError::QueryFailed)?;

        let packages = Self::parse_query_output(&String::from_utf8_lossy(&output), &self.vendor);

        info!(
            count = packages.len(),
            official = packages.iter().filter(|p| p.official).count(),
            "listed installed rpm packages"
        );

        Ok(packages)
    }

    fn family(&self) -> PackageFamily {
        PackageFamily::Rpm
    }
}

/// `[epoch:]version-release`, omitting an epoch of `(none)`
fn build_version(fields: &HashMap<String, String>) -> String {
    let version = fields.get("Version:").map_or("", String::as_str);
    let release = fields.get("Release:").map_or("", String::as_str);

    match fields.get("Epoch:").map(String::as_str) {
        Some(epoch) if !epoch.is_empty() && epoch != NO_EPOCH => {
            format!("{epoch}:{version}-{release}")
        }
        _ => format!("{version}-{release}"),
    }
}

/// Source package name from a source RPM file name, dropping the trailing
/// version and release components
pub fn source_name(source_rpm: &str) -> String {
    let parts: Vec<&str> = source_rpm.split('-').collect();
    if parts.len() < 3 {
        return UNKNOWN_SOURCE.to_string();
    }

    parts[..parts.len() - 2].join("-")
}
