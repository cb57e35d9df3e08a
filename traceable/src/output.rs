// Where the generated file goes and which package it belongs to

use crate::error::{CliError, CliResult};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use traceable_codegen::OutputPackage;
use traceable_resolver::{GoLoader, PackageRef};

/// Package of the generated file.
///
/// With an output file the package is the one living in the file's
/// directory: its import path comes from the enclosing module and its name
/// from the Go files already there, or the directory name. Without one the
/// file joins `first_target`. `name_override` replaces the name either way.
pub fn output_package(
    loader: &GoLoader,
    output: Option<&Path>,
    name_override: Option<&str>,
    first_target: &PackageRef,
) -> OutputPackage {
    let mut package = match output {
        Some(file) => {
            let dir = match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let dir_name = dir_name(dir);
            let path = loader
                .import_path_for_dir(dir)
                .unwrap_or_else(|| dir_name.clone());
            let name = loader
                .package_name_in_dir(dir)
                .unwrap_or_else(|| package_name_from(&dir_name));
            OutputPackage::new(name, path)
        }
        None => OutputPackage::new(first_target.alias.clone(), first_target.path.clone()),
    };

    if let Some(name) = name_override {
        package.name = name.to_string();
    }
    debug!(name = %package.name, path = %package.path, "output package");
    package
}

fn dir_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(dir)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string())
}

/// A valid Go package name derived from a directory name
fn package_name_from(dir_name: &str) -> String {
    let mut name: String = dir_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Write the generated bytes to `output`, creating parent directories, or to
/// stdout.
pub fn write_output(output: Option<&Path>, bytes: &[u8]) -> CliResult<()> {
    match output {
        Some(file) => {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| CliError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(file, bytes).map_err(|source| CliError::Write {
                path: file.to_path_buf(),
                source,
            })?;
            debug!(file = %file.display(), bytes = bytes.len(), "wrote output");
            Ok(())
        }
        None => std::io::stdout()
            .lock()
            .write_all(bytes)
            .map_err(|source| CliError::Write {
                path: "<stdout>".into(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_package_names_from_directories() {
        assert_eq!(package_name_from("traced"), "traced");
        assert_eq!(package_name_from("my-service.v2"), "my_service_v2");
        assert_eq!(package_name_from("2fa"), "_2fa");
    }
}
