//! Go toolchain package layout
//!
//! Maps import paths to directories the way the `go` command does: the main
//! module, its vendor directory, `replace` directives, the module cache for
//! `require`d modules, then GOROOT and GOPATH.

use crate::error::{ResolveError, ResolveResult};
use crate::imports::fallback_name;
use crate::loader::{package_name_of, LoadedPackage, PackageInfo, PackageLoader, SourceUnit};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace, warn};
use traceable_parser::parse_package_name;

/// Where a `replace` directive points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// `=> ../local/dir`
    Dir(PathBuf),
    /// `=> example.com/fork v1.2.3`
    Module { path: String, version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub path: String,
    pub target: ReplaceTarget,
}

/// The parts of a `go.mod` file that affect package lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    pub path: String,
    pub root: PathBuf,
    pub requires: Vec<(String, String)>,
    pub replaces: Vec<Replace>,
}

impl GoModule {
    /// Parse `go.mod` text; `None` when there is no `module` directive
    pub fn parse(root: impl Into<PathBuf>, text: &str) -> Option<Self> {
        let mut module_path = None;
        let mut requires = Vec::new();
        let mut replaces = Vec::new();
        let mut block: Option<String> = None;

        for raw in text.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(verb) = block.clone() {
                if line == ")" {
                    block = None;
                } else {
                    apply_directive(&verb, line, &mut requires, &mut replaces);
                }
                continue;
            }

            let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match verb {
                "module" => module_path = Some(unquote_token(rest)),
                _ if rest == "(" => block = Some(verb.to_string()),
                _ => apply_directive(verb, rest, &mut requires, &mut replaces),
            }
        }

        Some(Self {
            path: module_path?,
            root: root.into(),
            requires,
            replaces,
        })
    }

    /// Read `<dir>/go.mod`
    pub fn read(dir: &Path) -> ResolveResult<Option<Self>> {
        let go_mod = dir.join("go.mod");
        let text = fs::read_to_string(&go_mod).map_err(|e| ResolveError::io(&go_mod, e))?;
        Ok(Self::parse(dir, &text))
    }

    /// Search `start` and its ancestors for the enclosing module
    pub fn discover(start: &Path) -> ResolveResult<Option<Self>> {
        for dir in start.ancestors() {
            if dir.join("go.mod").is_file() {
                debug!(dir = %dir.display(), "found go.mod");
                return Self::read(dir);
            }
        }
        Ok(None)
    }

    /// Path of `import_path` relative to the module root, if it belongs here
    fn relative(&self, import_path: &str) -> Option<String> {
        strip_module_prefix(import_path, &self.path)
    }
}

fn apply_directive(
    verb: &str,
    args: &str,
    requires: &mut Vec<(String, String)>,
    replaces: &mut Vec<Replace>,
) {
    match verb {
        "require" => {
            let mut parts = args.split_whitespace().map(unquote_token);
            if let (Some(path), Some(version)) = (parts.next(), parts.next()) {
                requires.push((path, version));
            }
        }
        "replace" => {
            let Some((from, to)) = args.split_once("=>") else {
                return;
            };
            let Some(path) = from.split_whitespace().next().map(unquote_token) else {
                return;
            };
            let to: Vec<String> = to.split_whitespace().map(unquote_token).collect();
            let target = match to.as_slice() {
                [dir] => ReplaceTarget::Dir(PathBuf::from(dir)),
                [module, version] => ReplaceTarget::Module {
                    path: module.clone(),
                    version: version.clone(),
                },
                _ => return,
            };
            replaces.push(Replace { path, target });
        }
        _ => {}
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => &line[..index],
        None => line,
    }
}

fn unquote_token(token: &str) -> String {
    traceable_parser::unquote(token).unwrap_or_else(|| token.to_string())
}

/// `rest` when `import_path` is `prefix` or lies under `prefix/`
fn strip_module_prefix(import_path: &str, prefix: &str) -> Option<String> {
    if import_path == prefix {
        return Some(String::new());
    }
    import_path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}

/// Escape a module path or version for the module cache: every upper case
/// letter becomes `!` followed by its lower case form.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// GOROOT, GOPATH and GOMODCACHE
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoEnv {
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub modcache: Option<PathBuf>,
}

impl GoEnv {
    /// Read the environment the same way the `go` command defaults it
    pub fn from_environment() -> Self {
        let goroot = std::env::var_os("GOROOT")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(goroot_from_toolchain);

        let gopath: Vec<PathBuf> = match std::env::var_os("GOPATH").filter(|v| !v.is_empty()) {
            Some(value) => std::env::split_paths(&value).collect(),
            None => dirs::home_dir()
                .map(|home| vec![home.join("go")])
                .unwrap_or_default(),
        };

        let modcache = std::env::var_os("GOMODCACHE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| gopath.first().map(|first| first.join("pkg").join("mod")));

        Self {
            goroot,
            gopath,
            modcache,
        }
    }
}

fn goroot_from_toolchain() -> Option<PathBuf> {
    let output = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8(output.stdout).ok()?;
    let root = root.trim();
    (!root.is_empty()).then(|| PathBuf::from(root))
}

/// Filesystem loader following the Go toolchain layout
#[derive(Debug, Clone)]
pub struct GoLoader {
    module: Option<GoModule>,
    env: GoEnv,
}

impl GoLoader {
    pub fn new(module: Option<GoModule>, env: GoEnv) -> Self {
        Self { module, env }
    }

    /// Loader for the module enclosing `dir`, configured from the environment
    pub fn discover(dir: &Path) -> ResolveResult<Self> {
        let dir = absolute(dir)?;
        let module = GoModule::discover(&dir)?;
        if module.is_none() {
            debug!(dir = %dir.display(), "no enclosing go.mod, using GOROOT and GOPATH only");
        }
        Ok(Self::new(module, GoEnv::from_environment()))
    }

    pub fn module(&self) -> Option<&GoModule> {
        self.module.as_ref()
    }

    /// Directory holding the package `import_path`
    pub fn dir_for(&self, import_path: &str) -> Option<PathBuf> {
        self.candidates(import_path)
            .into_iter()
            .find(|dir| dir.is_dir())
    }

    fn candidates(&self, import_path: &str) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(module) = &self.module {
            if let Some(rest) = module.relative(import_path) {
                candidates.push(join_import_path(&module.root, &rest));
            }

            candidates.push(join_import_path(&module.root.join("vendor"), import_path));

            if let Some((replace, rest)) = longest_match(&module.replaces, import_path, |r| &r.path)
            {
                match &replace.target {
                    ReplaceTarget::Dir(dir) => {
                        candidates.push(join_import_path(&module.root.join(dir), &rest));
                    }
                    ReplaceTarget::Module { path, version } => {
                        if let Some(dir) = self.module_cache_dir(path, version) {
                            candidates.push(join_import_path(&dir, &rest));
                        }
                    }
                }
            }

            if let Some(((path, version), rest)) =
                longest_match(&module.requires, import_path, |(path, _)| path)
            {
                if let Some(dir) = self.module_cache_dir(path, version) {
                    candidates.push(join_import_path(&dir, &rest));
                }
            }
        }

        if let Some(goroot) = &self.env.goroot {
            candidates.push(join_import_path(&goroot.join("src"), import_path));
        }
        for gopath in &self.env.gopath {
            candidates.push(join_import_path(&gopath.join("src"), import_path));
        }

        candidates
    }

    fn module_cache_dir(&self, module_path: &str, version: &str) -> Option<PathBuf> {
        let cache = self.env.modcache.as_ref()?;
        Some(cache.join(format!(
            "{}@{}",
            escape_module_path(module_path),
            escape_module_path(version)
        )))
    }

    /// Load the package in `dir`, deriving its import path from the enclosing
    /// module or GOPATH.
    pub fn load_dir(&self, dir: &Path) -> ResolveResult<LoadedPackage> {
        let dir = absolute(dir)?;
        let import_path = self
            .import_path_for_dir(&dir)
            .ok_or_else(|| ResolveError::Load {
                paths: vec![dir.display().to_string()],
            })?;
        let units = read_go_files(&dir)?;
        if units.is_empty() {
            return Err(ResolveError::Load {
                paths: vec![import_path],
            });
        }
        let name = package_name_of(&units).unwrap_or_else(|| fallback_name(&import_path));
        Ok(LoadedPackage {
            import_path,
            name,
            units,
        })
    }

    /// Import path a package in `dir` would have. The directory does not
    /// need to exist.
    pub fn import_path_for_dir(&self, dir: &Path) -> Option<String> {
        let dir = absolute(dir).ok()?;

        if let Some(module) = &self.module {
            if let Ok(rest) = dir.strip_prefix(&module.root) {
                let rest = slash_path(rest);
                return Some(if rest.is_empty() {
                    module.path.clone()
                } else {
                    format!("{}/{}", module.path, rest)
                });
            }
        }

        self.env.gopath.iter().find_map(|gopath| {
            let rest = dir.strip_prefix(gopath.join("src")).ok()?;
            let rest = slash_path(rest);
            (!rest.is_empty()).then_some(rest)
        })
    }

    /// Package name declared by the Go files already in `dir`
    pub fn package_name_in_dir(&self, dir: &Path) -> Option<String> {
        let units = read_go_files(dir).ok()?;
        package_name_of(&units)
    }
}

impl PackageLoader for GoLoader {
    fn locate(&self, path: &str) -> Option<PackageInfo> {
        let dir = self.dir_for(path)?;
        let files = go_files(&dir).ok()?;
        if files.is_empty() {
            return None;
        }
        let name = files.iter().find_map(|file| {
            let source = fs::read_to_string(file).ok()?;
            if is_ignored(&source) {
                return None;
            }
            parse_package_name(&source).ok()
        });
        Some(PackageInfo {
            path: path.to_string(),
            name,
        })
    }

    fn load(&self, path: &str) -> ResolveResult<Option<LoadedPackage>> {
        let Some(dir) = self.dir_for(path) else {
            return Ok(None);
        };
        debug!(path, dir = %dir.display(), "loading package");

        let units = read_go_files(&dir)?;
        if units.is_empty() {
            return Ok(None);
        }
        let name = package_name_of(&units).unwrap_or_else(|| {
            let fallback = fallback_name(path);
            warn!(path, name = %fallback, "package name unavailable, using path");
            fallback
        });
        Ok(Some(LoadedPackage {
            import_path: path.to_string(),
            name,
            units,
        }))
    }
}

/// Non-test `.go` files directly in `dir`, sorted by name
fn go_files(dir: &Path) -> ResolveResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ResolveError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ResolveError::io(dir, e))?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".go") || !path.is_file() {
            continue;
        }
        if name.ends_with("_test.go") {
            trace!(file = name, "skipping test file");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Read the package sources in `dir`, dropping ignored files and files that
/// belong to a different package than the first one.
fn read_go_files(dir: &Path) -> ResolveResult<Vec<SourceUnit>> {
    let mut units = Vec::new();
    let mut package: Option<String> = None;

    for file in go_files(dir)? {
        let source = fs::read_to_string(&file).map_err(|e| ResolveError::io(&file, e))?;
        let file_name = file.display().to_string();

        if is_ignored(&source) {
            trace!(file = %file_name, "skipping file excluded by build constraint");
            continue;
        }

        if let Ok(name) = parse_package_name(&source) {
            match &package {
                Some(first) if *first != name => {
                    trace!(file = %file_name, package = %name, "skipping file from another package");
                    continue;
                }
                Some(_) => {}
                None => package = Some(name),
            }
        }

        units.push(SourceUnit::new(file_name, source));
    }

    Ok(units)
}

/// True for files guarded by `//go:build ignore`
fn is_ignored(source: &str) -> bool {
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("/*") || line.starts_with('*') {
            continue;
        }
        let Some(comment) = line.strip_prefix("//") else {
            // constraints must come before the package clause
            return false;
        };
        if let Some(expr) = comment.strip_prefix("go:build") {
            return expr.trim() == "ignore";
        }
    }
    false
}

/// Longest entry whose path is `import_path` or a parent of it
fn longest_match<'a, T>(
    entries: &'a [T],
    import_path: &str,
    path_of: impl Fn(&'a T) -> &'a String,
) -> Option<(&'a T, String)> {
    entries
        .iter()
        .filter_map(|entry| {
            let prefix = path_of(entry);
            strip_module_prefix(import_path, prefix).map(|rest| (entry, prefix.len(), rest))
        })
        .max_by_key(|(_, len, _)| *len)
        .map(|(entry, _, rest)| (entry, rest))
}

fn join_import_path(base: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |dir, segment| dir.join(segment))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute, normalised form of `path` without requiring it to exist
fn absolute(path: &Path) -> ResolveResult<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().map_err(|e| ResolveError::io(path, e))?
    };

    // Canonicalise the deepest existing ancestor so symlinked roots compare
    // equal, then append the rest lexically.
    let joined = base.join(path);
    let mut existing = joined.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut normalised = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for name in missing.into_iter().rev() {
        normalised.push(name);
    }

    let mut out = PathBuf::new();
    for component in normalised.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}
