//! pkgscout agent
//!
//! Identifies the host's distribution, lists installed packages with their
//! provenance and prints the inventory as JSON.

use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use eyre::WrapErr;
use pkgscout_exec::LocalProbe;
use pkgscout_inventory::InventoryCollector;
use tracing::{debug, info, warn};

mod cli;
mod config;
mod logging;

use cli::Cli;
use config::Config;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("failed to read configuration {}", path.display()))?,
        None => Config::default(),
    };

    logging::init(&config.log, cli.debug)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting pkgscout");
    match &config_path {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }

    let inventory = InventoryCollector::new(Arc::new(LocalProbe::new()))
        .with_labels(config.labels())
        .collect()
        .wrap_err("failed to collect inventory")?;

    let json = match (cli.packages_only, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&inventory.packages)?,
        (true, false) => serde_json::to_string(&inventory.packages)?,
        (false, true) => serde_json::to_string_pretty(&inventory)?,
        (false, false) => serde_json::to_string(&inventory)?,
    };
    println!("{json}");

    Ok(())
}
