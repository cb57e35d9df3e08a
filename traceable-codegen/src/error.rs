// traceable Code Generation Errors

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum GenerateError {
    #[error("interface {name} was not added to the generator")]
    #[diagnostic(
        code(traceable::generate::unknown_interface),
        help("Resolve the interface and pass it to Generator::add_interface first")
    )]
    UnknownInterface { name: String },

    #[error("interfaces {first} and {second} would both generate Traced{name}")]
    #[diagnostic(
        code(traceable::generate::duplicate_interface),
        help("Generate interfaces that share a name into separate files")
    )]
    DuplicateInterface {
        name: String,
        first: String,
        second: String,
    },
}

pub type GenerateResult<T> = Result<T, GenerateError>;
