//! APT package lookup (Debian/Ubuntu)

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use pkgscout_exec::{FieldExtractor, SystemProbe};
use tracing::{debug, info, instrument};

use crate::classify::{AptRules, classify};
use crate::error::PackageError;
use crate::policy::{OfficialRepositories, RepositoryPolicy, parse_policy, parse_sources_list};
use crate::traits::PackageManager;
use crate::types::{DpkgEntry, Package, PackageFamily};

/// dpkg status database
pub const DPKG_STATUS_PATH: &str = "/var/lib/dpkg/status";
/// APT source list whose repositories count as official
pub const SOURCES_LIST_PATH: &str = "/etc/apt/sources.list";

const INSTALLED_STATUS: &str = "install ok installed";

static STATUS_FIELDS: LazyLock<FieldExtractor> = LazyLock::new(|| {
    FieldExtractor::new(&[
        "Status:",
        "Package:",
        "Version:",
        "Architecture:",
        "Source:",
        "Maintainer:",
    ])
    .expect("valid dpkg status fields")
});

/// APT package lookup
pub struct AptManager {
    /// System probe for files and commands
    probe: Arc<dyn SystemProbe>,
    /// Official-package conventions for the distribution
    rules: AptRules,
    status_path: PathBuf,
    sources_path: PathBuf,
}

impl AptManager {
    /// Create a new APT lookup
    ///
    /// # Arguments
    /// * `probe` - System probe for reading dpkg state and running `apt-cache`
    /// * `rules` - Maintainer and patch-suffix conventions of the distribution
    pub fn new(probe: Arc<dyn SystemProbe>, rules: AptRules) -> Self {
        Self {
            probe,
            rules,
            status_path: PathBuf::from(DPKG_STATUS_PATH),
            sources_path: PathBuf::from(SOURCES_LIST_PATH),
        }
    }

    /// Read the dpkg status database from another path
    #[must_use]
    pub fn with_status_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.status_path = path.into();
        self
    }

    /// Read the source list from another path
    #[must_use]
    pub fn with_sources_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources_path = path.into();
        self
    }

    /// Parse dpkg status text into entries for installed packages
    ///
    /// Blocks whose status is anything but `install ok installed` are dropped.
    pub fn parse_status(content: &str) -> Vec<DpkgEntry> {
        let mut entries = Vec::new();

        for block in content.split("\n\n") {
            let mut fields = STATUS_FIELDS.extract(block);

            let name = fields.remove("Package:").unwrap_or_default();
            let installed = fields.get("Status:").map(String::as_str) == Some(INSTALLED_STATUS);
            if name.is_empty() || !installed {
                continue;
            }

            let source = fields
                .get("Source:")
                .and_then(|s| source_package_name(s))
                .unwrap_or(name.as_str())
                .to_string();

            entries.push(DpkgEntry {
                version: fields.remove("Version:").unwrap_or_default(),
                architecture: fields.remove("Architecture:").unwrap_or_default(),
                maintainer: fields.remove("Maintainer:").unwrap_or_default(),
                source,
                name,
            });
        }

        entries
    }

    /// Read and parse the dpkg status database
    ///
    /// # Errors
    /// Returns `PackageError::StatusUnavailable` if the database cannot be read.
    #[instrument(skip(self), fields(path = %self.status_path.display()))]
    pub fn read_status(&self) -> Result<Vec<DpkgEntry>, PackageError> {
        let content = read_text(self.probe.as_ref(), &self.status_path)
            .map_err(PackageError::StatusUnavailable)?;

        let entries = Self::parse_status(&content);
        debug!(count = entries.len(), "read dpkg status");

        Ok(entries)
    }

    /// Repositories declared in the source list
    ///
    /// # Errors
    /// Returns `PackageError::RepositoriesUnavailable` if the list cannot be read.
    #[instrument(skip(self), fields(path = %self.sources_path.display()))]
    pub fn collect_official_repositories(&self) -> Result<OfficialRepositories, PackageError> {
        let content = read_text(self.probe.as_ref(), &self.sources_path)
            .map_err(PackageError::RepositoriesUnavailable)?;

        let repos = parse_sources_list(&content);
        debug!(count = repos.len(), "collected official repositories");

        Ok(repos)
    }

    /// Origins of the installed versions of `names`, in one `apt-cache policy` call
    ///
    /// # Errors
    /// Returns `PackageError::PolicyUnavailable` if `apt-cache` cannot be run or fails.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub fn collect_package_policy(&self, names: &[&str]) -> Result<RepositoryPolicy, PackageError> {
        if names.is_empty() {
            return Ok(RepositoryPolicy::default());
        }

        let mut args = Vec::with_capacity(names.len() + 1);
        args.push("policy");
        args.extend_from_slice(names);

        let output = self
            .probe
            .run_checked("apt-cache", &args)
            .map_err(PackageError::PolicyUnavailable)?;

        let policy = parse_policy(&String::from_utf8_lossy(&output));
        debug!(count = policy.len(), "collected package policy");

        Ok(policy)
    }
}

impl PackageManager for AptManager {
    #[instrument(skip(self))]
    fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        let entries = self.read_status()?;

        let official = self.collect_official_repositories()?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let policy = self.collect_package_policy(&names)?;

        let packages = classify(entries, &official, &policy, &self.rules);

        info!(
            count = packages.len(),
            official = packages.iter().filter(|p| p.official).count(),
            "listed installed apt packages"
        );

        Ok(packages)
    }

    fn family(&self) -> PackageFamily {
        PackageFamily::Apt
    }
}

/// Leading package-name token of a `Source:` field, e.g. `lvm2` from
/// `lvm2 (2.02.66-4ubuntu7.4)`
fn source_package_name(source: &str) -> Option<&str> {
    source.split_whitespace().next()
}

fn read_text(probe: &dyn SystemProbe, path: &Path) -> Result<String, pkgscout_exec::ProbeError> {
    probe
        .read_file(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use pkgscout_exec::{CommandOutput, ProbeError, StubProbe};

    use super::*;
    use crate::types::Distribution;

    const STATUS: &str = "\
Package: apt
Status: install ok installed
Priority: important
Section: admin
Maintainer: Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>
Architecture: amd64
Version: 1.0.1ubuntu2
Description: commandline package manager
 This package provides commandline tools for searching and
 managing as well as querying information about packages.

Package: skype
Status: install ok installed
Maintainer: Skype Technologies <info@skype.net>
Architecture: i386
Version: 4.2.0.11-1

Package: lvm2
Status: install ok installed
Maintainer: Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>
Architecture: amd64
Source: lvm2 (2.02.98-6ubuntu2)
Version: 2.02.98-6ubuntu2

Package: oldlib
Status: deinstall ok config-files
Maintainer: Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>
Architecture: amd64
Version: 0.1-1

Package: halfway
Status: install ok half-configured
Architecture: amd64
Version: 0.2-1
";

    const SOURCES: &str = "deb http://archive.ubuntu.com/ubuntu/ trusty main restricted\n";

    #[test]
    fn test_parse_status() {
        let entries = AptManager::parse_status(STATUS);

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            DpkgEntry {
                name: "apt".to_string(),
                version: "1.0.1ubuntu2".to_string(),
                architecture: "amd64".to_string(),
                source: "apt".to_string(),
                maintainer: "Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>"
                    .to_string(),
            }
        );
        assert_eq!(entries[2].name, "lvm2");
        assert_eq!(entries[2].source, "lvm2");
    }

    #[test]
    fn test_only_fully_installed_packages() {
        for status in [
            "deinstall ok config-files",
            "install ok unpacked",
            "install ok half-configured",
            "hold ok installed",
            "purge ok not-installed",
        ] {
            let block = format!("Package: apt\nStatus: {status}\nVersion: 1.0\n");
            assert!(AptManager::parse_status(&block).is_empty(), "{status}");
        }

        let block = "Package: apt\nStatus: install ok installed\nVersion: 1.0\n";
        assert_eq!(AptManager::parse_status(block).len(), 1);
    }

    #[test]
    fn test_description_continuation_lines() {
        let block = "Package: tool
Status: install ok installed
Version: 1.0-1
Architecture: amd64
Description: a tool
 Version: 2 of the protocol is supported
 Status: experimental
 Maintainer: nobody
";

        let entries = AptManager::parse_status(block);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "tool");
        assert_eq!(entries[0].version, "1.0-1");
        assert_eq!(entries[0].maintainer, "");
    }

    #[test]
    fn test_source_package_name() {
        assert_eq!(source_package_name("gtk+3.0"), Some("gtk+3.0"));
        assert_eq!(source_package_name("libsoup2.4"), Some("libsoup2.4"));
        assert_eq!(source_package_name("lvm2 (2.02.66-4ubuntu7.4)"), Some("lvm2"));
        assert_eq!(source_package_name(""), None);
    }

    #[test]
    fn test_list_installed() {
        let names = ["apt", "skype", "lvm2"];
        let policy = "\
apt:
 *** 1.0.1ubuntu2 0
        500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
        100 /var/lib/dpkg/status
skype:i386:
 *** 4.2.0.11-1 0
        100 /var/lib/dpkg/status
lvm2:
 *** 2.02.98-6ubuntu2 0
        100 /var/lib/dpkg/status
";
        let mut args = vec!["policy"];
        args.extend(names);
        let probe = StubProbe::new()
            .file(DPKG_STATUS_PATH, STATUS)
            .file(SOURCES_LIST_PATH, SOURCES)
            .command("apt-cache", &args, CommandOutput::ok(policy));

        let manager = AptManager::new(
            Arc::new(probe),
            AptRules::for_distribution(Distribution::Ubuntu).unwrap(),
        );
        let packages = manager.list_installed().unwrap();

        let official: Vec<(&str, bool)> = packages
            .iter()
            .map(|p| (p.name.as_str(), p.official))
            .collect();
        assert_eq!(official, vec![("apt", true), ("skype", false), ("lvm2", true)]);
    }

    #[test]
    fn test_status_unavailable() {
        let manager = AptManager::new(
            Arc::new(StubProbe::new()),
            AptRules::for_distribution(Distribution::Debian).unwrap(),
        );

        let err = manager.list_installed().unwrap_err();

        assert!(err.is_enumeration_failure());
    }

    #[test]
    fn test_policy_failure_aborts_classification() {
        let probe = StubProbe::new()
            .file(DPKG_STATUS_PATH, STATUS)
            .file(SOURCES_LIST_PATH, SOURCES)
            .program("apt-cache", CommandOutput::failed(100, "E: broken cache"));
        let manager = AptManager::new(
            Arc::new(probe),
            AptRules::for_distribution(Distribution::Ubuntu).unwrap(),
        );

        let err = manager.list_installed().unwrap_err();

        assert!(matches!(
            err,
            PackageError::PolicyUnavailable(ProbeError::CommandFailed { status: 100, .. })
        ));
    }

    #[test]
    fn test_sources_failure_aborts_classification() {
        let probe = StubProbe::new().file(DPKG_STATUS_PATH, STATUS);
        let manager = AptManager::new(
            Arc::new(probe),
            AptRules::for_distribution(Distribution::Ubuntu).unwrap(),
        );

        let err = manager.list_installed().unwrap_err();

        assert!(err.is_classification_failure());
    }

    #[test]
    fn test_custom_paths() {
        let probe = Arc::new(
            StubProbe::new()
                .file("/srv/chroot/status", "Package: zsh\nStatus: install ok installed\n")
                .file("/srv/chroot/sources.list", SOURCES),
        );
        let manager = AptManager::new(
            probe.clone(),
            AptRules::for_distribution(Distribution::Debian).unwrap(),
        )
        .with_status_path("/srv/chroot/status")
        .with_sources_path("/srv/chroot/sources.list");

        let repos = manager.collect_official_repositories().unwrap();
        let entries = manager.read_status().unwrap();

        assert!(repos.contains("http://archive.ubuntu.com/ubuntu"));
        assert_eq!(entries[0].name, "zsh");
        assert!(probe.was_called("read /srv/chroot/status"));
    }

    #[test]
    fn test_empty_policy_skips_command() {
        let probe = Arc::new(StubProbe::new());
        let manager = AptManager::new(
            probe.clone(),
            AptRules::for_distribution(Distribution::Debian).unwrap(),
        );

        let policy = manager.collect_package_policy(&[]).unwrap();

        assert!(policy.is_empty());
        assert!(probe.calls().is_empty());
    }
}
