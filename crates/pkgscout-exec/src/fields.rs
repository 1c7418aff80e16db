//! Key-value extraction from loosely formatted text
//!
//! os-release, `lsb_release` output, SuSE-release, dpkg status blocks and the
//! rpm query template all reduce to "a label followed by a value on one line".

use std::collections::HashMap;

use regex::Regex;

/// Characters stripped from both ends of an extracted value
const TRIM_CHARS: &[char] = &[' ', '\t', '\r', '"', '\''];

/// Extracts label → value pairs from text
///
/// Labels are literal strings compiled into one alternation anchored at the
/// start of the line, so `ID=` never captures a `VERSION_ID=` or
/// `PLATFORM_ID=` line. Indented lines are skipped unless the extractor is
/// built with [`FieldExtractor::lenient`]; in dpkg status blocks they are
/// continuations of multi-line fields. When a label occurs on several lines
/// the last one wins.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    pattern: Regex,
}

impl FieldExtractor {
    /// Build an extractor for labels that start in the first column
    ///
    /// # Errors
    /// Returns a `regex::Error` if the combined pattern exceeds the regex size limit.
    pub fn new(labels: &[&str]) -> Result<Self, regex::Error> {
        Self::build(labels, "")
    }

    /// Build an extractor that also accepts labels preceded by whitespace
    ///
    /// # Errors
    /// Returns a `regex::Error` if the combined pattern exceeds the regex size limit.
    pub fn lenient(labels: &[&str]) -> Result<Self, regex::Error> {
        Self::build(labels, r"\s*")
    }

    fn build(labels: &[&str], indent: &str) -> Result<Self, regex::Error> {
        let alternation = labels
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"^{indent}({alternation})(.*)"))?;
        Ok(Self { pattern })
    }

    /// Extract values keyed by label
    ///
    /// Labels that never occur are absent from the map.
    #[must_use]
    pub fn extract(&self, text: &str) -> HashMap<String, String> {
        let mut values = HashMap::new();

        for line in text.lines() {
            if let Some(caps) = self.pattern.captures(line) {
                let value = caps[2].trim_matches(TRIM_CHARS).to_string();
                values.insert(caps[1].to_string(), value);
            }
        }

        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_release() {
        let extractor = FieldExtractor::new(&["ID=", "VERSION_ID="]).unwrap();
        let text = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"14.04\"\nHOME_URL=\"http://www.ubuntu.com/\"";

        let values = extractor.extract(text);

        assert_eq!(values.get("ID=").map(String::as_str), Some("ubuntu"));
        assert_eq!(values.get("VERSION_ID=").map(String::as_str), Some("14.04"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let extractor = FieldExtractor::new(&["Release:"]).unwrap();
        let text = "Release: 7.2\nRelease: 7.3";

        let values = extractor.extract(text);

        assert_eq!(values["Release:"], "7.3");
    }

    #[test]
    fn test_label_must_start_line() {
        let extractor = FieldExtractor::new(&["ID=", "Maintainer: "]).unwrap();
        let text = "ID=\"rhel\"\nPLATFORM_ID=\"platform:el8\"\nMaintainer: Ubuntu Developers <ubuntu-devel@lists.ubuntu.com>\nOriginal-Maintainer: Debian QA <qa@debian.org>";

        let values = extractor.extract(text);

        assert_eq!(values["ID="], "rhel");
        assert_eq!(
            values["Maintainer: "],
            "Ubuntu Developers <ubuntu-devel@lists.ubuntu.com>"
        );
    }

    #[test]
    fn test_leading_whitespace_and_quotes() {
        let extractor =
            FieldExtractor::lenient(&["Distributor ID:", "Release:"]).unwrap();
        let text = "Description:    Red Hat \n Distributor ID:\tRedHatEnterpriseServer\nRelease:    '7.3'  ";

        let values = extractor.extract(text);

        assert_eq!(values["Distributor ID:"], "RedHatEnterpriseServer");
        assert_eq!(values["Release:"], "7.3");
    }

    #[test]
    fn test_indented_lines_skipped() {
        let extractor = FieldExtractor::new(&["Version: "]).unwrap();
        let text = "Version: 1.0-1\nDescription: a tool\n Version: 2 of the protocol";

        let values = extractor.extract(text);

        assert_eq!(values["Version: "], "1.0-1");
    }

    #[test]
    fn test_missing_label() {
        let extractor = FieldExtractor::new(&["VERSION =", "PATCHLEVEL ="]).unwrap();

        let values = extractor.extract("SUSE Linux Enterprise Server 12\nVERSION = 12\n");

        assert_eq!(values["VERSION ="], "12");
        assert!(!values.contains_key("PATCHLEVEL ="));
    }

    #[test]
    fn test_labels_are_literal() {
        let extractor = FieldExtractor::new(&["A.B:"]).unwrap();

        let values = extractor.extract("AxB: no\nA.B: yes");

        assert_eq!(values.len(), 1);
        assert_eq!(values["A.B:"], "yes");
    }
}
