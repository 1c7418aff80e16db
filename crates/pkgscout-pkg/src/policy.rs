//! APT repository and `apt-cache policy` parsing
//!
//! Both results are built fresh for every lookup and discarded once the
//! packages are classified.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

/// Origin reported by `apt-cache policy` for the locally installed copy
pub const LOCAL_STATUS_ORIGIN: &str = "/var/lib/dpkg/status";

static SOURCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:deb|deb-src)\s+(?:\[[^\]]*\]\s+)?(\S+)\s").expect("valid source line regex")
});

static PACKAGE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^ ]+):$").expect("valid package header regex"));

// Column positions are the only thing separating these from other blocks
static VERSION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {5}\S").expect("valid version header regex"));

static ORIGIN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {8}\d{3}").expect("valid origin line regex"));

const INSTALLED_MARKER: &str = " ***";

/// Repository URLs declared in the APT source list, trailing `/` stripped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficialRepositories(BTreeSet<String>);

impl OfficialRepositories {
    /// Whether `url` is one of the declared repositories
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    /// Number of distinct repositories
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no repository was declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate repositories in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for OfficialRepositories {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Parse `deb` and `deb-src` lines of a `sources.list`
#[must_use]
pub fn parse_sources_list(content: &str) -> OfficialRepositories {
    content
        .lines()
        .filter_map(|line| SOURCE_LINE.captures(line))
        .map(|caps| caps[1].trim_end_matches('/').to_string())
        .collect()
}

/// Origins of the installed version of each package, as reported by
/// `apt-cache policy`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryPolicy(HashMap<String, Vec<String>>);

impl RepositoryPolicy {
    /// Origins recorded for `name`, in output order
    #[must_use]
    pub fn origins(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Origins for a package, falling back to the `name:arch` key that
    /// `apt-cache` prints for foreign-architecture packages
    #[must_use]
    pub fn origins_for(&self, name: &str, architecture: &str) -> Option<&[String]> {
        self.origins(name)
            .or_else(|| self.origins(&format!("{name}:{architecture}")))
    }

    /// Number of packages with a policy block
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no policy block was seen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    AwaitingBlock,
    InsideInstalledVersion,
}

/// Parse `apt-cache policy <names...>` output
///
/// ```text
/// apt:
///   Installed: 1.0.1ubuntu2
///   Candidate: 1.0.1ubuntu2
///   Version table:
///  *** 1.0.1ubuntu2 0
///         500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
///         100 /var/lib/dpkg/status
///      1.0.1ubuntu1 0
///         500 http://mirror.example.com/ubuntu/ trusty/main amd64 Packages
/// ```
#[must_use]
pub fn parse_policy(output: &str) -> RepositoryPolicy {
    let mut policy: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;
    let mut state = ScanState::AwaitingBlock;

    for line in output.lines() {
        if let Some(caps) = PACKAGE_HEADER.captures(line) {
            let name = caps[1].to_string();
            policy.insert(name.clone(), Vec::new());
            current = Some(name);
            state = ScanState::AwaitingBlock;
            continue;
        }

        match state {
            ScanState::InsideInstalledVersion => {
                if VERSION_HEADER.is_match(line) {
                    state = ScanState::AwaitingBlock;
                    continue;
                }

                if !ORIGIN_LINE.is_match(line) {
                    continue;
                }

                let Some(origin) = line.split_whitespace().nth(1) else {
                    continue;
                };
                if origin == LOCAL_STATUS_ORIGIN {
                    continue;
                }

                if let Some(origins) = current.as_ref().and_then(|name| policy.get_mut(name)) {
                    origins.push(origin.trim_end_matches('/').to_string());
                }
            }
            ScanState::AwaitingBlock => {
                if line.starts_with(INSTALLED_MARKER) {
                    state = ScanState::InsideInstalledVersion;
                }
            }
        }
    }

    RepositoryPolicy(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES_LIST: &str = "\
# deb cdrom:[Ubuntu 14.04 LTS _Trusty Tahr_ - Release amd64 (20140417)]/ trusty main restricted
deb http://archive.ubuntu.com/ubuntu/ trusty main restricted
deb-src http://archive.ubuntu.com/ubuntu/ trusty main restricted

## Major bug fix updates produced after the final release of the
deb http://archive.ubuntu.com/ubuntu/ trusty-updates main restricted
  deb [arch=amd64] http://security.ubuntu.com/ubuntu trusty-security main
debian http://example.com/ trusty main
";

    const POLICY: &str = "\
gtk2-engines-murrine:
  Installed: 0.98.2-0ubuntu1
  Candidate: 0.98.2-0ubuntu1
  Version table:
 *** 0.98.2-0ubuntu1 0
        100 /var/lib/dpkg/status
skype:i386:
  Installed: 4.2.0.11-1
  Candidate: 4.2.0.11-1
  Version table:
 *** 4.2.0.11-1 0
        100 /var/lib/dpkg/status
apt:
  Installed: 1.0.1ubuntu2
  Candidate: 1.0.1ubuntu2.17
  Version table:
     1.0.1ubuntu2.17 0
        500 http://ppa.launchpad.net/example/ppa/ubuntu/ trusty/main amd64 Packages
 *** 1.0.1ubuntu2 0
        500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
        100 /var/lib/dpkg/status
oracle-java8-installer:
  Installed: 8u111+8u111arm-1~webupd8~0
  Candidate: 8u111+8u111arm-1~webupd8~0
  Version table:
 *** 8u111+8u111arm-1~webupd8~0 0
        500 http://ppa.launchpad.net/webupd8team/java/ubuntu/ trusty/main amd64 Packages
        100 /var/lib/dpkg/status
apt-xapian-index:
  Installed: 0.45ubuntu4
  Candidate: 0.45ubuntu4
  Version table:
 *** 0.45ubuntu4 0
        500 http://archive.ubuntu.com/ubuntu/ trusty-updates/main amd64 Packages
        500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
        100 /var/lib/dpkg/status
     0.44ubuntu5 0
        500 http://mirror.example.com/ubuntu/ trusty/main amd64 Packages
";

    #[test]
    fn test_parse_sources_list() {
        let repos = parse_sources_list(SOURCES_LIST);

        assert_eq!(
            repos.iter().collect::<Vec<_>>(),
            vec![
                "http://archive.ubuntu.com/ubuntu",
                "http://security.ubuntu.com/ubuntu"
            ]
        );
    }

    #[test]
    fn test_parse_policy() {
        let policy = parse_policy(POLICY);

        assert_eq!(policy.len(), 5);
        assert_eq!(policy.origins("gtk2-engines-murrine"), Some(&[][..]));
        assert_eq!(policy.origins("skype:i386"), Some(&[][..]));
        assert_eq!(
            policy.origins("apt").unwrap(),
            ["http://archive.ubuntu.com/ubuntu"]
        );
        assert_eq!(
            policy.origins("oracle-java8-installer").unwrap(),
            ["http://ppa.launchpad.net/webupd8team/java/ubuntu"]
        );
        assert_eq!(
            policy.origins("apt-xapian-index").unwrap(),
            [
                "http://archive.ubuntu.com/ubuntu",
                "http://archive.ubuntu.com/ubuntu"
            ]
        );
    }

    #[test]
    fn test_origins_for_foreign_architecture() {
        let policy = parse_policy(POLICY);

        assert!(policy.origins("skype").is_none());
        assert_eq!(policy.origins_for("skype", "i386"), Some(&[][..]));
        assert!(policy.origins_for("skype", "amd64").is_none());
    }

    #[test]
    fn test_indentation_is_significant() {
        // Origin lines at the wrong column and tab-indented version headers are ignored
        let output = "\
foo:
 *** 1.0 0
       500 http://wrong.example.com/ trusty/main amd64 Packages
        500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
\t2.0 0
        500 http://still-installed.example.com/ trusty/main amd64 Packages
    3.0 0
        500 http://also-installed.example.com/ trusty/main amd64 Packages
     4.0 0
        500 http://other-version.example.com/ trusty/main amd64 Packages
";

        let policy = parse_policy(output);

        assert_eq!(
            policy.origins("foo").unwrap(),
            [
                "http://archive.ubuntu.com/ubuntu",
                "http://still-installed.example.com",
                "http://also-installed.example.com"
            ]
        );
    }

    #[test]
    fn test_new_package_resets_state() {
        let output = "\
foo:
 *** 1.0 0
bar:
        500 http://archive.ubuntu.com/ubuntu/ trusty/main amd64 Packages
";

        let policy = parse_policy(output);

        assert_eq!(policy.origins("foo"), Some(&[][..]));
        assert_eq!(policy.origins("bar"), Some(&[][..]));
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_policy("").is_empty());
        assert!(parse_sources_list("").is_empty());
    }
}
