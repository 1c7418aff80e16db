//! Tracing subscriber setup
//!
//! Logs go to stderr; stdout carries only the JSON inventory.

use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber
///
/// `--debug` forces the `debug` level; otherwise `RUST_LOG` wins over the
/// configured level.
///
/// # Errors
/// Returns error if the level is not a valid filter or a subscriber is already set
pub fn init(log: &LogConfig, debug: bool) -> eyre::Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&log.level)?,
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| eyre::eyre!(e))
}
