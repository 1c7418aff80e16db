//! Distribution and release resolution
//!
//! Sources are tried in a fixed order and the first that yields both an id
//! and a release wins:
//!
//! 1. `/etc/os-release`
//! 2. `lsb_release -ir`
//! 3. distribution-specific marker files such as `/etc/redhat-release`

use std::path::Path;
use std::sync::{Arc, LazyLock};

use pkgscout_exec::{FieldExtractor, SystemProbe};
use pkgscout_pkg::Distribution;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::error::InventoryError;
use crate::types::DistributionIdentity;

/// Structured os-identification file
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Marker files, in the order they are consulted
pub const MARKER_FILES: [&str; 6] = [
    "/etc/issue",
    "/etc/centos-release",
    "/etc/redhat-release",
    "/etc/SuSE-release",
    "/etc/system-release",
    "/etc/system-release-cpe",
];

/// `lsb_release` distributor names that differ from the canonical id
const LSB_DISTRIBUTORS: &[(&str, Distribution)] = &[
    ("Debian", Distribution::Debian),
    ("Ubuntu", Distribution::Ubuntu),
    ("RedHatEnterpriseServer", Distribution::Rhel),
    ("CentOS", Distribution::Centos),
    ("openSUSE project", Distribution::Opensuse),
    ("SUSE", Distribution::Sles),
    ("AmazonAMI", Distribution::Amzn),
];

// Order matters: the first prefix whose release extraction succeeds wins
const BRAND_PREFIXES: &[(&str, Distribution)] = &[
    ("Debian", Distribution::Debian),
    ("Ubuntu", Distribution::Ubuntu),
    ("CentOS", Distribution::Centos),
    ("cpe:/o:centos", Distribution::Centos),
    ("Red Hat", Distribution::Rhel),
    ("cpe:/o:redhat", Distribution::Rhel),
    ("Amazon", Distribution::Amzn),
    ("cpe:/o:amazon", Distribution::Amzn),
    ("openSUSE", Distribution::Opensuse),
    ("SUSE", Distribution::Sles),
];

static OS_RELEASE_FIELDS: LazyLock<FieldExtractor> = LazyLock::new(|| {
    FieldExtractor::lenient(&["ID=", "VERSION_ID="]).expect("valid os-release fields")
});

static LSB_FIELDS: LazyLock<FieldExtractor> = LazyLock::new(|| {
    FieldExtractor::lenient(&["Distributor ID:", "Release:"]).expect("valid lsb_release fields")
});

static SUSE_FIELDS: LazyLock<FieldExtractor> = LazyLock::new(|| {
    FieldExtractor::lenient(&["VERSION =", "PATCHLEVEL ="]).expect("valid SuSE-release fields")
});

static MAJOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid major regex"));

static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+").expect("valid major.minor regex"));

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("valid numeric token regex"));

/// Resolves the distribution identity of a host
pub struct DistributionResolver {
    probe: Arc<dyn SystemProbe>,
}

impl DistributionResolver {
    /// Create a new resolver
    pub fn new(probe: Arc<dyn SystemProbe>) -> Self {
        Self { probe }
    }

    /// Resolve distribution id and release
    ///
    /// # Errors
    /// Returns `InventoryError::UnknownRelease` if some source named the
    /// distribution but none gave a release, otherwise
    /// `InventoryError::UnknownDistribution` when every source is exhausted.
    #[instrument(skip(self), fields(probe = self.probe.probe_type()))]
    pub fn resolve(&self) -> Result<DistributionIdentity, InventoryError> {
        let mut failure = InventoryError::UnknownDistribution;

        if let Some(content) = self.read(OS_RELEASE_PATH) {
            match parse_os_release(&content) {
                Ok(identity) => return Ok(found("os-release", identity)),
                Err(e) => {
                    warn!(error = %e, "os-release incomplete, falling back");
                    failure = keep_most_specific(failure, e);
                }
            }
        }

        match self.probe.run_checked("lsb_release", &["-ir"]) {
            Ok(output) => match parse_lsb_release(&String::from_utf8_lossy(&output)) {
                Ok(identity) => return Ok(found("lsb_release", identity)),
                Err(e) => {
                    warn!(error = %e, "lsb_release incomplete, falling back");
                    failure = keep_most_specific(failure, e);
                }
            },
            Err(e) => debug!(error = %e, "lsb_release unavailable"),
        }

        for path in MARKER_FILES {
            let Some(content) = self.read(path) else {
                continue;
            };
            match parse_marker_file(&content) {
                Ok(identity) => return Ok(found(path, identity)),
                Err(e) => failure = keep_most_specific(failure, e),
            }
        }

        warn!(error = %failure, "distribution could not be resolved");
        Err(failure)
    }

    fn read(&self, path: &str) -> Option<String> {
        match self.probe.read_file(Path::new(path)) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!(path, error = %e, "source unavailable");
                None
            }
        }
    }
}

fn found(source: &str, identity: DistributionIdentity) -> DistributionIdentity {
    info!(
        source,
        distribution = %identity.id,
        release = %identity.release,
        "resolved distribution"
    );
    identity
}

fn keep_most_specific(current: InventoryError, next: InventoryError) -> InventoryError {
    match current {
        InventoryError::UnknownRelease => current,
        _ => next,
    }
}

fn complete(
    reported: Option<(Distribution, &str)>,
    release: &str,
) -> Result<DistributionIdentity, InventoryError> {
    let (id, name) = reported.ok_or(InventoryError::UnknownDistribution)?;
    if release.is_empty() {
        return Err(InventoryError::UnknownRelease);
    }
    match id {
        Distribution::Unknown => Ok(DistributionIdentity::unrecognised(name, release)),
        id => Ok(DistributionIdentity::new(id, release)),
    }
}

/// Parse `/etc/os-release`
///
/// An unrecognised but present `ID` resolves to `Distribution::Unknown` and
/// keeps the reported name.
///
/// # Errors
/// Returns `UnknownDistribution` without an `ID`, `UnknownRelease` without a `VERSION_ID`.
pub fn parse_os_release(content: &str) -> Result<DistributionIdentity, InventoryError> {
    let fields = OS_RELEASE_FIELDS.extract(content);
    let id = fields
        .get("ID=")
        .filter(|id| !id.is_empty())
        .map(|id| (Distribution::from_os_release_id(id), id.as_str()));
    let release = fields.get("VERSION_ID=").map_or("", String::as_str);

    complete(id, release)
}

/// Parse `lsb_release -ir` output
///
/// Debian and CentOS releases are reduced to their major version.
///
/// # Errors
/// Returns `UnknownDistribution` without a distributor, `UnknownRelease` without a release.
pub fn parse_lsb_release(content: &str) -> Result<DistributionIdentity, InventoryError> {
    let fields = LSB_FIELDS.extract(content);
    let id = fields
        .get("Distributor ID:")
        .filter(|name| !name.is_empty())
        .map(|name| (lsb_distribution(name), name.as_str()));
    let mut release = fields.get("Release:").map_or("", String::as_str);

    if matches!(id, Some((Distribution::Debian | Distribution::Centos, _))) {
        release = release.split('.').next().unwrap_or_default();
    }

    complete(id, release)
}

fn lsb_distribution(name: &str) -> Distribution {
    LSB_DISTRIBUTORS
        .iter()
        .find(|(distributor, _)| *distributor == name)
        .map_or_else(
            || Distribution::from_os_release_id(&name.to_ascii_lowercase()),
            |(_, distribution)| *distribution,
        )
}

/// Parse the content of a distribution-specific marker file
///
/// # Errors
/// Returns `UnknownRelease` if a brand prefix matched but no release was
/// found, `UnknownDistribution` if no prefix matched.
pub fn parse_marker_file(content: &str) -> Result<DistributionIdentity, InventoryError> {
    let mut failure = InventoryError::UnknownDistribution;

    for (prefix, distribution) in BRAND_PREFIXES {
        if !content.starts_with(prefix) {
            continue;
        }
        match marker_release(*distribution, content) {
            Some(release) => return Ok(DistributionIdentity::new(*distribution, release)),
            None => failure = InventoryError::UnknownRelease,
        }
    }

    Err(failure)
}

fn marker_release(distribution: Distribution, content: &str) -> Option<String> {
    let pattern = match distribution {
        Distribution::Sles => return sles_release(content),
        Distribution::Debian | Distribution::Centos => &MAJOR,
        _ => &MAJOR_MINOR,
    };
    pattern.find(content).map(|m| m.as_str().to_string())
}

/// Release from `/etc/SuSE-release`: `VERSION.PATCHLEVEL`, or just `VERSION`
/// when the patch level is `0` or absent. Without a `VERSION` line the first
/// numeric token is used.
#[must_use]
pub fn sles_release(content: &str) -> Option<String> {
    let fields = SUSE_FIELDS.extract(content);
    let version = fields.get("VERSION =").filter(|v| !v.is_empty());
    let patch = fields.get("PATCHLEVEL =").filter(|p| !p.is_empty());

    match (version, patch) {
        (Some(version), Some(patch)) if patch != "0" => Some(format!("{version}.{patch}")),
        (Some(version), _) => Some(version.clone()),
        (None, _) => NUMERIC_TOKEN.find(content).map(|m| m.as_str().to_string()),
    }
}
