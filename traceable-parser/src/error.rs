// traceable Parser Error Handling
// Error reporting with miette integration

use crate::ast::Span;
use crate::parser::Rule;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Syntax error in {name}: {message}")]
    #[diagnostic(
        code(traceable::parse::syntax),
        help("traceable only understands syntactically valid Go source")
    )]
    PestError {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unexpected grammar rule {found:?}")]
    #[diagnostic(
        code(traceable::parse::unexpected_rule),
        help("Expected rule: {expected}")
    )]
    UnexpectedRule {
        expected: String,
        found: Rule,
        span: Span,
    },

    #[error("Invalid string literal {literal}")]
    #[diagnostic(
        code(traceable::parse::invalid_string),
        help("Import paths must be valid Go string literals")
    )]
    InvalidStringLiteral { literal: String, span: Span },

    #[error("Missing {expected} in {rule:?}")]
    #[diagnostic(code(traceable::parse::missing_node))]
    MissingNode { expected: String, rule: Rule },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(
        error: pest::error::Error<Rule>,
        src: &str,
        source_name: Option<&str>,
    ) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let expected: Vec<String> = positives.iter().map(describe_rule).collect();
                let (line, col) = match error.line_col {
                    pest::error::LineColLocation::Pos(pos) => pos,
                    pest::error::LineColLocation::Span(start, _) => start,
                };
                format!("expected {} at {line}:{col}", expected.join(" or "))
            }
            other => other.message().into_owned(),
        };

        let name = source_name.unwrap_or("<input>").to_string();
        ParseError::PestError {
            src: NamedSource::new(name.clone(), src.to_string()),
            name,
            span,
            message,
        }
    }

    pub fn unexpected_rule(expected: impl Into<String>, found: Rule, span: Span) -> Self {
        ParseError::UnexpectedRule {
            expected: expected.into(),
            found,
            span,
        }
    }

    pub fn missing(expected: impl Into<String>, rule: Rule) -> Self {
        ParseError::MissingNode {
            expected: expected.into(),
            rule,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a parser rule to a user-facing description
fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::identifier => "an identifier".to_string(),
        Rule::qualified_ident => "a type name".to_string(),
        Rule::type_expr => "a type".to_string(),
        Rule::string_lit => "a string literal".to_string(),
        Rule::package_clause | Rule::kw_package => "a package clause".to_string(),
        Rule::import_decl | Rule::kw_import => "an import declaration".to_string(),
        Rule::type_decl | Rule::kw_type => "a type declaration".to_string(),
        Rule::const_decl | Rule::kw_const => "a const declaration".to_string(),
        Rule::var_decl | Rule::kw_var => "a var declaration".to_string(),
        Rule::func_decl | Rule::kw_func => "a func declaration".to_string(),
        Rule::parameters => "a parameter list".to_string(),
        Rule::signature => "a signature".to_string(),
        Rule::interface_elem | Rule::method_spec => "an interface element".to_string(),
        Rule::field_decl => "a struct field".to_string(),
        Rule::EOI => "end of input".to_string(),
        _ => format!("{rule:?}").replace('_', " "),
    }
}
