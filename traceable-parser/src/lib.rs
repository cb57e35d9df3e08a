// traceable Parser Library
// Pest-based parser for the declaration level of Go source files

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use parser::*;

// Re-export parser rule for manual testing
pub use parser::Rule;

pub fn parse_source_file(input: &str) -> Result<SourceFile, ParseError> {
    parser::GoParser::parse_source_file(input)
}

pub fn parse_source_file_with_name(
    input: &str,
    source_name: Option<String>,
) -> Result<SourceFile, ParseError> {
    parser::GoParser::parse_source_file_with_name(input, source_name)
}

/// Read just the `package` clause, without parsing the rest of the file
pub fn parse_package_name(input: &str) -> Result<String, ParseError> {
    parser::GoParser::parse_package_name(input)
}

pub fn parse_type_expr(input: &str) -> Result<TypeExpr, ParseError> {
    parser::GoParser::parse_type(input)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
