//! Provenance classification for APT packages

use regex::Regex;
use tracing::trace;

use crate::error::PackageError;
use crate::policy::{OfficialRepositories, RepositoryPolicy};
use crate::types::{Distribution, DpkgEntry, Package};

const UBUNTU_MAINTAINER: &str = r"(ubuntu.com|canonical.com|debian.org)";
const UBUNTU_PATCH_SUFFIX: &str = r"-[\d\.]+ubuntu[\d\.~]+$";
const DEBIAN_MAINTAINER: &str = r"debian.org";
const DEBIAN_PATCH_SUFFIX: &str = r"\+deb\d+u\d+$";

/// Why a package was classified as official
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// Installed version is available from a declared repository
    Origin,
    /// Maintainer belongs to the distribution
    Maintainer,
    /// Version carries the distribution's patch suffix
    PatchSuffix,
}

/// Distribution-specific textual conventions for official packages
#[derive(Debug, Clone)]
pub struct AptRules {
    maintainer: Regex,
    patch_suffix: Regex,
}

impl AptRules {
    /// Compile rules from a maintainer pattern and a version patch-suffix pattern
    ///
    /// # Errors
    /// Returns `PackageError::InvalidPattern` if either pattern does not compile.
    pub fn new(maintainer: &str, patch_suffix: &str) -> Result<Self, PackageError> {
        Ok(Self {
            maintainer: compile(maintainer)?,
            patch_suffix: compile(patch_suffix)?,
        })
    }

    /// Rules for an APT-based distribution
    ///
    /// # Errors
    /// Returns `PackageError::DistributionNotSupported` for non-APT distributions.
    pub fn for_distribution(distribution: Distribution) -> Result<Self, PackageError> {
        match distribution {
            Distribution::Ubuntu => Self::new(UBUNTU_MAINTAINER, UBUNTU_PATCH_SUFFIX),
            Distribution::Debian => Self::new(DEBIAN_MAINTAINER, DEBIAN_PATCH_SUFFIX),
            other => Err(PackageError::DistributionNotSupported(other.to_string())),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, PackageError> {
    Regex::new(pattern).map_err(|e| PackageError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// First piece of evidence that `entry` is official, checked in priority order:
/// origin, then maintainer, then patch suffix
#[must_use]
pub fn evidence(
    entry: &DpkgEntry,
    official: &OfficialRepositories,
    policy: &RepositoryPolicy,
    rules: &AptRules,
) -> Option<Evidence> {
    let from_official_origin = policy
        .origins_for(&entry.name, &entry.architecture)
        .is_some_and(|origins| origins.iter().any(|origin| official.contains(origin)));

    if from_official_origin {
        Some(Evidence::Origin)
    } else if rules.maintainer.is_match(&entry.maintainer) {
        Some(Evidence::Maintainer)
    } else if rules.patch_suffix.is_match(&entry.version) {
        Some(Evidence::PatchSuffix)
    } else {
        None
    }
}

/// Finalize dpkg entries into packages with their provenance
#[must_use]
pub fn classify(
    entries: Vec<DpkgEntry>,
    official: &OfficialRepositories,
    policy: &RepositoryPolicy,
    rules: &AptRules,
) -> Vec<Package> {
    entries
        .into_iter()
        .map(|entry| {
            let evidence = evidence(&entry, official, policy, rules);
            trace!(package = %entry.name, evidence = ?evidence, "classified");
            entry.into_package(evidence.is_some())
        })
        .collect()
}
