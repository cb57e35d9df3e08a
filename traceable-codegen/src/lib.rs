//! Go source generation for traced interface wrappers
//!
//! Takes interfaces resolved by `traceable-resolver` and renders a Go file
//! with one `Traced<Name>` wrapper per interface.

pub mod backend;
pub mod error;
pub mod generator;
pub mod names;

pub use backend::{SpanParent, TracerBackend};
pub use error::{GenerateError, GenerateResult};
pub use generator::{Generator, OutputPackage, HEADER};
pub use names::{parameter_names, FileImports, WrapperFields};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
