//! Package loading boundary
//!
//! The resolver only ever asks two questions of the outside world: "does this
//! import path exist, and what is its package called?" and "give me the source
//! files of this package". [`PackageLoader`] answers them.

use crate::error::ResolveResult;
use std::collections::BTreeMap;
use traceable_parser::parse_package_name;

/// One Go source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub file_name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }
}

/// Result of locating an import path.
///
/// `name` is `None` when the package exists but its name could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub path: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPackage {
    pub import_path: String,
    pub name: String,
    pub units: Vec<SourceUnit>,
}

pub trait PackageLoader {
    /// Find a package without reading all of it
    fn locate(&self, path: &str) -> Option<PackageInfo>;

    /// Read every source file of a package, `Ok(None)` when it does not exist
    fn load(&self, path: &str) -> ResolveResult<Option<LoadedPackage>>;
}

/// Package name from the first unit that has a readable package clause
pub fn package_name_of(units: &[SourceUnit]) -> Option<String> {
    units
        .iter()
        .find_map(|unit| parse_package_name(&unit.source).ok())
}

/// Loader over in-memory sources, keyed by import path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    packages: BTreeMap<String, Vec<SourceUnit>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(
        &mut self,
        import_path: impl Into<String>,
        file_name: impl Into<String>,
        source: impl Into<String>,
    ) -> &mut Self {
        self.packages
            .entry(import_path.into())
            .or_default()
            .push(SourceUnit::new(file_name, source));
        self
    }

    pub fn with_file(
        mut self,
        import_path: impl Into<String>,
        file_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.add_file(import_path, file_name, source);
        self
    }

    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

impl PackageLoader for MemoryLoader {
    fn locate(&self, path: &str) -> Option<PackageInfo> {
        let units = self.packages.get(path)?;
        Some(PackageInfo {
            path: path.to_string(),
            name: package_name_of(units),
        })
    }

    fn load(&self, path: &str) -> ResolveResult<Option<LoadedPackage>> {
        let Some(units) = self.packages.get(path) else {
            return Ok(None);
        };
        let name = package_name_of(units).unwrap_or_else(|| crate::imports::fallback_name(path));
        Ok(Some(LoadedPackage {
            import_path: path.to_string(),
            name,
            units: units.clone(),
        }))
    }
}
