//! Names used inside one generated file
//!
//! Package aliases are chosen once per file so that every reference to a
//! package prints the same qualifier, and parameter names are picked so that
//! nothing the generated body refers to gets shadowed.

use std::collections::{BTreeMap, HashSet};
use traceable_resolver::{fallback_name, Interface, Method, PackageRef, Qualifier};

/// Identifiers the generated code declares or refers to unqualified
const RESERVED: [&str; 4] = ["t", "span", "next", "tracer"];

/// The import set of a generated file, keyed by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImports {
    local_path: String,
    aliases: BTreeMap<String, String>,
}

impl FileImports {
    /// Assign aliases to `packages` (path -> preferred alias) in path order.
    ///
    /// A preferred alias already taken by an earlier path, or clashing with a
    /// reserved identifier, gets the first free numeric suffix. `local_path`
    /// is the package being generated into and is never imported.
    pub fn new(local_path: impl Into<String>, packages: &BTreeMap<String, String>) -> Self {
        let local_path = local_path.into();
        let mut aliases = BTreeMap::new();
        let mut taken: HashSet<String> = RESERVED.iter().map(|name| name.to_string()).collect();

        for (path, preferred) in packages {
            if *path == local_path || path.is_empty() {
                continue;
            }
            let base = if preferred.is_empty() {
                fallback_name(path)
            } else {
                preferred.clone()
            };

            let mut alias = base.clone();
            let mut suffix = 1;
            while taken.contains(&alias) {
                alias = format!("{base}{suffix}");
                suffix += 1;
            }

            taken.insert(alias.clone());
            aliases.insert(path.clone(), alias);
        }

        Self {
            local_path,
            aliases,
        }
    }

    /// Alias the file uses for `path`
    pub fn alias(&self, path: &str) -> Option<&str> {
        self.aliases.get(path).map(String::as_str)
    }

    pub fn contains_alias(&self, name: &str) -> bool {
        self.aliases.values().any(|alias| alias == name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// The import declaration, or an empty string when nothing is imported
    pub fn render_block(&self) -> String {
        if self.aliases.is_empty() {
            return String::new();
        }

        let mut out = String::from("import (\n");
        for (path, alias) in &self.aliases {
            if last_segment(path) == alias {
                out.push_str(&format!("\t{path:?}\n"));
            } else {
                out.push_str(&format!("\t{alias} {path:?}\n"));
            }
        }
        out.push_str(")\n");
        out
    }
}

impl Qualifier for FileImports {
    fn qualify(&self, package: &PackageRef) -> Option<String> {
        if package.path == self.local_path {
            return None;
        }
        Some(
            self.alias(&package.path)
                .map(str::to_string)
                .unwrap_or_else(|| package.alias.clone()),
        )
    }
}

/// Field names of one wrapper struct.
///
/// Go rejects a field and a method of the same name on one type, so a field
/// gets `_` appended while the interface has a method called like it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperFields {
    pub next: String,
    pub tracer: String,
}

impl WrapperFields {
    pub fn for_interface(interface: &Interface) -> Self {
        let free = |base: &str| {
            let mut name = base.to_string();
            while interface.methods.contains(&name) {
                name.push('_');
            }
            name
        };
        Self {
            next: free("next"),
            tracer: free("tracer"),
        }
    }

    /// Column width that aligns the field types
    pub fn width(&self) -> usize {
        self.next.len().max(self.tracer.len())
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Display names for the parameters of a generated method.
///
/// Declared names are kept unless they are blank or would shadow something
/// the method body refers to; everything else becomes `a<index>`.
pub fn parameter_names(method: &Method, imports: &FileImports) -> Vec<String> {
    let usable = |name: &str| {
        name != "_" && !RESERVED.contains(&name) && !imports.contains_alias(name)
    };

    let declared: Vec<Option<&str>> = method
        .params
        .iter()
        .map(|param| param.name.as_deref().filter(|name| usable(name)))
        .collect();
    let mut used: HashSet<String> = declared.iter().flatten().map(|name| name.to_string()).collect();

    declared
        .iter()
        .enumerate()
        .map(|(index, name)| match name {
            Some(name) => name.to_string(),
            None => {
                let mut candidate = format!("a{index}");
                while used.contains(&candidate) {
                    candidate.push('_');
                }
                used.insert(candidate.clone());
                candidate
            }
        })
        .collect()
}
