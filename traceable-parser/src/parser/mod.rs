// traceable Go parser
// Pest-driven parsing of Go source into the declaration-level AST

use crate::ast::*;
use crate::error::*;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

mod declarations;
mod literals;
mod types;

pub use literals::{parse_int_literal, unquote};

#[derive(Parser)]
#[grammar = "go.pest"]
pub struct GoParser;

impl GoParser {
    /// Parse a complete Go compilation unit
    pub fn parse_source_file(input: &str) -> ParseResult<SourceFile> {
        Self::parse_source_file_with_name(input, None)
    }

    /// Parse a complete Go compilation unit, recording where it came from
    pub fn parse_source_file_with_name(
        input: &str,
        source_name: Option<String>,
    ) -> ParseResult<SourceFile> {
        let mut pairs = Self::parse(Rule::source_file, input).map_err(|e| {
            ParseError::from_pest_error(e, input, source_name.as_deref())
        })?;
        let file_pair = pairs
            .next()
            .ok_or_else(|| ParseError::missing("source file", Rule::source_file))?;
        let span = Self::span_from_pair(&file_pair);

        let mut package = None;
        let mut imports = Vec::new();
        let mut declarations = Vec::new();

        for pair in file_pair.into_inner() {
            match pair.as_rule() {
                Rule::package_clause => package = Some(Self::parse_package_clause(pair)?),
                Rule::import_decl => imports.extend(Self::parse_import_decl(pair)?),
                Rule::type_decl => {
                    for spec in Self::parse_type_decl(pair)? {
                        declarations.push(Declaration::Type(spec));
                    }
                }
                Rule::const_decl => {
                    for spec in Self::parse_const_decl(pair)? {
                        declarations.push(Declaration::Const(spec));
                    }
                }
                Rule::var_decl => {
                    for spec in Self::parse_var_decl(pair) {
                        declarations.push(Declaration::Var(spec));
                    }
                }
                Rule::func_decl => declarations.push(Declaration::Func(Self::parse_func_decl(pair)?)),
                Rule::EOI => {}
                other => {
                    return Err(ParseError::unexpected_rule(
                        "top level declaration",
                        other,
                        Self::span_from_pair(&pair),
                    ))
                }
            }
        }

        let package =
            package.ok_or_else(|| ParseError::missing("package clause", Rule::source_file))?;

        Ok(SourceFile {
            package,
            imports,
            declarations,
            source_name,
            span,
        })
    }

    /// Parse only the package clause at the top of a file
    pub fn parse_package_name(input: &str) -> ParseResult<String> {
        let mut pairs = Self::parse(Rule::package_header, input)
            .map_err(|e| ParseError::from_pest_error(e, input, None))?;
        let header = pairs
            .next()
            .ok_or_else(|| ParseError::missing("package clause", Rule::package_header))?;
        let clause = Self::first_inner_of(header, Rule::package_clause)?;
        Ok(Self::parse_package_clause(clause)?.name)
    }

    /// Parse a standalone type expression such as `map[string][]int`
    pub fn parse_type(input: &str) -> ParseResult<TypeExpr> {
        let mut pairs = Self::parse(Rule::type_expr_only, input)
            .map_err(|e| ParseError::from_pest_error(e, input, None))?;
        let root = pairs
            .next()
            .ok_or_else(|| ParseError::missing("type", Rule::type_expr_only))?;
        let ty = Self::first_inner_of(root, Rule::type_expr)?;
        Self::parse_type_expr(ty)
    }

    /// Build a span (with line/column) from a pest pair
    pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
        let span = pair.as_span();
        Span::with_line_col(
            span.start(),
            span.end(),
            span.start_pos().line_col(),
            span.end_pos().line_col(),
        )
    }

    /// Next pair of an inner iterator, or an error naming what was expected
    pub(crate) fn expect_next<'i>(
        pairs: &mut Pairs<'i, Rule>,
        expected: &str,
        parent: Rule,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs
            .next()
            .ok_or_else(|| ParseError::missing(expected, parent))
    }

    /// First inner pair matching `rule`
    pub(crate) fn first_inner_of(pair: Pair<'_, Rule>, rule: Rule) -> ParseResult<Pair<'_, Rule>> {
        let parent = pair.as_rule();
        pair.into_inner()
            .find(|inner| inner.as_rule() == rule)
            .ok_or_else(|| ParseError::missing(format!("{rule:?}"), parent))
    }

    pub(crate) fn identifier_from_pair(pair: &Pair<Rule>) -> Identifier {
        Identifier {
            name: pair.as_str().to_string(),
            span: Self::span_from_pair(pair),
        }
    }

    pub(crate) fn parse_identifier_list(pair: Pair<Rule>) -> Vec<Identifier> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::identifier)
            .map(|inner| Self::identifier_from_pair(&inner))
            .collect()
    }
}
