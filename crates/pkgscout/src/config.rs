//! Configuration loading and types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PKGSCOUT_CONFIG";

/// Top-level agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Labels attached to the host record
    #[serde(default)]
    pub labels: Vec<String>,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Locate the configuration file: `$PKGSCOUT_CONFIG`, then the standard paths
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let mut paths = vec![
            PathBuf::from("pkgscout.toml"),
            PathBuf::from("/etc/pkgscout/agent.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pkgscout/agent.toml"));
        }

        paths.into_iter().find(|p| p.exists())
    }

    /// Labels with surrounding whitespace removed and empty entries dropped
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}
