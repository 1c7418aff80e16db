//! pkgscout-inventory: Host identification and inventory collection
//!
//! Resolves which distribution and release a host runs, probes basic host
//! facts and assembles them with the installed package list.

pub mod collector;
pub mod error;
pub mod host;
pub mod release;
pub mod types;

pub use collector::InventoryCollector;
pub use error::InventoryError;
pub use host::HostProbe;
pub use release::DistributionResolver;
pub use types::{DistributionIdentity, HostInfo, HostInventory};
