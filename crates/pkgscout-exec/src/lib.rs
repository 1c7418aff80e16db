//! pkgscout-exec: System probe abstraction
//!
//! Provides the trait used to read files and run commands on the host, a local
//! implementation, an in-memory stub for tests and the key-value text extractor
//! shared by every distribution and package parser.

pub mod error;
pub mod fields;
pub mod local;
pub mod result;
pub mod stub;
pub mod traits;

pub use error::ProbeError;
pub use fields::FieldExtractor;
pub use local::LocalProbe;
pub use result::CommandOutput;
pub use stub::StubProbe;
pub use traits::SystemProbe;
