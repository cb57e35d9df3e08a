//! Error types for interface resolution
//!
//! Every failure is a configuration or input problem, so there is no retry
//! path: errors propagate straight up to the caller.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;
use traceable_parser::ParseError;

#[derive(Error, Diagnostic, Debug)]
pub enum ResolveError {
    #[error("failed to load packages: {}", .paths.join(", "))]
    #[diagnostic(
        code(traceable::resolve::load),
        help("Check that the import paths exist in the module, its dependencies, GOROOT or GOPATH")
    )]
    Load { paths: Vec<String> },

    #[error("unknown package {alias} referenced in {file}")]
    #[diagnostic(
        code(traceable::resolve::unknown_package),
        help("Every qualified type must use a package imported by the same file")
    )]
    UnknownPackage { alias: String, file: String },

    #[error("unknown embedded interface {name} in {interface}")]
    #[diagnostic(code(traceable::resolve::unknown_embed))]
    UnknownEmbed { name: String, interface: String },

    #[error("interface {name} not found in package {package}")]
    #[diagnostic(
        code(traceable::resolve::unknown_interface),
        help("Type names are case sensitive and must be declared at package level")
    )]
    UnknownInterface { name: String, package: String },

    #[error("{name} is a {kind}, not an interface")]
    #[diagnostic(code(traceable::resolve::not_an_interface))]
    NotAnInterface { name: String, kind: String },

    #[error("unsupported member {member} in interface {interface}")]
    #[diagnostic(
        code(traceable::resolve::unsupported_member),
        help("Only methods and embedded interfaces can be traced; type sets cannot")
    )]
    UnsupportedMember { member: String, interface: String },

    #[error("unsupported type {ty}: {reason}")]
    #[diagnostic(code(traceable::resolve::unsupported_type))]
    UnsupportedType { ty: String, reason: String },

    #[error("bad array length {expr}: {reason}")]
    #[diagnostic(
        code(traceable::resolve::bad_array_length),
        help("Array lengths must be integer literals or constants initialised with one")
    )]
    BadArrayLength { expr: String, reason: String },

    #[error("cyclic embedding: {}", .chain.join(" -> "))]
    #[diagnostic(code(traceable::resolve::cyclic_embed))]
    CyclicEmbed { chain: Vec<String> },

    #[error("failed to parse {file}")]
    #[diagnostic(code(traceable::resolve::parse))]
    Parse {
        file: String,
        #[source]
        #[diagnostic_source]
        error: ParseError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    #[diagnostic(code(traceable::resolve::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResolveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn bad_array_length(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::BadArrayLength {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_type(ty: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::UnsupportedType {
            ty: ty.into(),
            reason: reason.into(),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
