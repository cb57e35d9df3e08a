//! Interface resolution for traceable
//!
//! Loads Go packages through a [`PackageLoader`], resolves interface
//! declarations (including embedded interfaces from other packages) and
//! describes every method signature with the [`TypeDescriptor`] model.

pub mod error;
pub mod go_env;
pub mod imports;
pub mod interface;
pub mod loader;
pub mod resolver;
pub mod signature;
pub mod types;

pub use error::{ResolveError, ResolveResult};
pub use go_env::{escape_module_path, GoEnv, GoLoader, GoModule};
pub use imports::{fallback_name, resolve_import_names, ImportTable, ImportedPackage};
pub use interface::{Interface, Method, MethodSet, Package};
pub use loader::{LoadedPackage, MemoryLoader, PackageInfo, PackageLoader, SourceUnit};
pub use resolver::{Namespace, Resolver, Scope};
pub use types::{
    render_results, ChanDir, DeclaredAliases, LocalTo, PackageRef, Parameter, Qualifier,
    TypeDescriptor,
};

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
