use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;
use traceable_codegen::GenerateError;
use traceable_resolver::ResolveError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Generate(#[from] GenerateError),

    #[error("invalid type {token:?}")]
    #[diagnostic(
        code(traceable::cli::invalid_type),
        help("Types are given as Name or import/path.Name")
    )]
    InvalidType { token: String },

    #[error("no types to generate")]
    #[diagnostic(
        code(traceable::cli::no_types),
        help("Pass --types or set TRACEABLE_TYPES")
    )]
    NoTypes,

    #[error("failed to write {}: {source}", .path.display())]
    #[diagnostic(code(traceable::cli::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CliResult<T> = Result<T, CliError>;
