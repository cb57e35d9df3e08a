//! Per-file import tables
//!
//! Maps the aliases a file can use in qualified identifiers back to import
//! paths, folding statements that end up with the same alias.

use crate::error::{ResolveError, ResolveResult};
use crate::loader::PackageLoader;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::warn;
use traceable_parser::{ImportName, ImportSpec};

/// An alias as seen by one file.
///
/// `duplicates` holds further paths imported under the same alias; they are
/// kept for reporting but never referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPackage {
    pub alias: String,
    pub path: String,
    pub duplicates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    entries: IndexMap<String, ImportedPackage>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for `specs`, asking `loader` for the names of packages
    /// imported without an alias.
    pub fn resolve(loader: &dyn PackageLoader, specs: &[ImportSpec]) -> ResolveResult<Self> {
        let unnamed = specs
            .iter()
            .filter(|spec| needs_name_lookup(spec))
            .map(|spec| spec.path.clone());
        let names = resolve_import_names(loader, unnamed)?;
        Ok(Self::from_specs(specs, |path| names.get(path).cloned()))
    }

    /// Build the table with package names supplied by `name_of`
    pub fn from_specs(specs: &[ImportSpec], name_of: impl Fn(&str) -> Option<String>) -> Self {
        let mut table = Self::new();
        for spec in specs {
            if spec.path == "C" {
                continue;
            }
            let alias = match &spec.name {
                Some(ImportName::Blank) | Some(ImportName::Dot) => continue,
                Some(ImportName::Alias(alias)) => alias.clone(),
                None => name_of(&spec.path).unwrap_or_else(|| fallback_name(&spec.path)),
            };
            table.insert(alias, spec.path.clone());
        }
        table
    }

    /// Record `path` under `alias`. A second path for a taken alias is folded
    /// into the existing entry. Returns whether a new alias was created.
    pub fn insert(&mut self, alias: impl Into<String>, path: impl Into<String>) -> bool {
        let alias = alias.into();
        let path = path.into();

        if let Some(existing) = self.entries.get_mut(&alias) {
            if existing.path != path && !existing.duplicates.contains(&path) {
                existing.duplicates.push(path);
            }
            return false;
        }

        self.entries.insert(
            alias.clone(),
            ImportedPackage {
                alias,
                path,
                duplicates: Vec::new(),
            },
        );
        true
    }

    pub fn get(&self, alias: &str) -> Option<&ImportedPackage> {
        self.entries.get(alias)
    }

    /// Import path behind `alias`
    pub fn path_of(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(|entry| entry.path.as_str())
    }

    /// The first alias under which `path` was imported
    pub fn alias_of(&self, path: &str) -> Option<&str> {
        self.entries
            .values()
            .find(|entry| entry.path == path)
            .map(|entry| entry.alias.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportedPackage> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True when the import alias has to come from the package itself
pub fn needs_name_lookup(spec: &ImportSpec) -> bool {
    spec.name.is_none() && spec.path != "C"
}

/// Look up the package name of each path.
///
/// Packages that exist but whose name cannot be read fall back to the last
/// path segment. Paths that cannot be located at all fail together in one
/// [`ResolveError::Load`].
pub fn resolve_import_names(
    loader: &dyn PackageLoader,
    paths: impl IntoIterator<Item = String>,
) -> ResolveResult<BTreeMap<String, String>> {
    let mut names = BTreeMap::new();
    let mut missing = Vec::new();

    for path in paths {
        if names.contains_key(&path) || missing.contains(&path) {
            continue;
        }
        match loader.locate(&path) {
            Some(info) => {
                let name = info.name.unwrap_or_else(|| {
                    let fallback = fallback_name(&path);
                    warn!(path = %path, name = %fallback, "package name unavailable, using path");
                    fallback
                });
                names.insert(path, name);
            }
            None => missing.push(path),
        }
    }

    if missing.is_empty() {
        Ok(names)
    } else {
        Err(ResolveError::Load { paths: missing })
    }
}

/// Best-effort package name: the last path segment, cut at the first `.`
pub fn fallback_name(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.split('.').next().unwrap_or(segment).to_string()
}
