//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "pkgscout", version)]
#[command(about = "Report the distribution and installed packages of this host", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $PKGSCOUT_CONFIG or the standard locations)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug messages
    #[arg(short, long)]
    pub debug: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print only the package list
    #[arg(long)]
    pub packages_only: bool,
}
