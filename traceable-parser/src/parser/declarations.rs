// Declaration parsing module
// Handles the package clause, imports, and type/const/var/func declarations

use super::{GoParser, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl GoParser {
    pub(crate) fn parse_package_clause(pair: Pair<Rule>) -> ParseResult<Identifier> {
        let ident = Self::first_inner_of(pair, Rule::identifier)?;
        Ok(Self::identifier_from_pair(&ident))
    }

    /// Parse an import declaration, single or grouped
    pub(crate) fn parse_import_decl(pair: Pair<Rule>) -> ParseResult<Vec<ImportSpec>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::import_spec)
            .map(Self::parse_import_spec)
            .collect()
    }

    fn parse_import_spec(pair: Pair<Rule>) -> ParseResult<ImportSpec> {
        let span = Self::span_from_pair(&pair);
        let mut name = None;
        let mut path = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::import_name => {
                    let text = inner.as_str();
                    name = Some(match text {
                        "." => ImportName::Dot,
                        "_" => ImportName::Blank,
                        alias => ImportName::Alias(alias.to_string()),
                    });
                }
                Rule::string_lit => path = Some(Self::parse_string_lit(inner)?),
                other => {
                    return Err(ParseError::unexpected_rule(
                        "import name or path",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        let path = path.ok_or_else(|| ParseError::missing("import path", Rule::import_spec))?;
        Ok(ImportSpec { name, path, span })
    }

    /// Parse a type declaration, single or grouped
    pub(crate) fn parse_type_decl(pair: Pair<Rule>) -> ParseResult<Vec<TypeSpec>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::type_spec)
            .map(Self::parse_type_spec)
            .collect()
    }

    fn parse_type_spec(pair: Pair<Rule>) -> ParseResult<TypeSpec> {
        let span = Self::span_from_pair(&pair);
        let mut name = None;
        let mut type_params = Vec::new();
        let mut is_alias = false;
        let mut ty = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier => name = Some(Self::identifier_from_pair(&inner)),
                Rule::type_params => type_params = Self::parse_type_params(inner)?,
                Rule::alias_marker => is_alias = true,
                Rule::type_expr => ty = Some(Self::parse_type_expr(inner)?),
                other => {
                    return Err(ParseError::unexpected_rule(
                        "type spec",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(TypeSpec {
            name: name.ok_or_else(|| ParseError::missing("type name", Rule::type_spec))?,
            type_params,
            is_alias,
            ty: ty.ok_or_else(|| ParseError::missing("type", Rule::type_spec))?,
            span,
        })
    }

    pub(crate) fn parse_type_params(pair: Pair<Rule>) -> ParseResult<Vec<TypeParam>> {
        let mut params = Vec::new();
        for decl in pair.into_inner() {
            if decl.as_rule() != Rule::type_param_decl {
                continue;
            }
            let mut inner = decl.into_inner();
            let names = Self::expect_next(&mut inner, "type parameter names", Rule::type_param_decl)?;
            let constraint = Self::expect_next(&mut inner, "constraint", Rule::type_param_decl)?;
            params.push(TypeParam {
                names: Self::parse_identifier_list(names),
                constraint: Self::parse_type_union(constraint)?,
            });
        }
        Ok(params)
    }

    /// Parse a const declaration, single or grouped
    pub(crate) fn parse_const_decl(pair: Pair<Rule>) -> ParseResult<Vec<ConstSpec>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::const_spec)
            .map(Self::parse_const_spec)
            .collect()
    }

    fn parse_const_spec(pair: Pair<Rule>) -> ParseResult<ConstSpec> {
        let span = Self::span_from_pair(&pair);
        let mut names = Vec::new();
        let mut ty = None;
        let mut values = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier_list => names = Self::parse_identifier_list(inner),
                Rule::type_expr => ty = Some(Self::parse_type_expr(inner)?),
                Rule::const_value => values.push(inner.as_str().trim().to_string()),
                other => {
                    return Err(ParseError::unexpected_rule(
                        "const spec",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(ConstSpec {
            names,
            ty,
            values,
            span,
        })
    }

    pub(crate) fn parse_var_decl(pair: Pair<Rule>) -> Vec<VarSpec> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::var_spec)
            .map(|inner| VarSpec {
                text: inner.as_str().trim().to_string(),
                span: Self::span_from_pair(&inner),
            })
            .collect()
    }

    pub(crate) fn parse_func_decl(pair: Pair<Rule>) -> ParseResult<FuncDecl> {
        let span = Self::span_from_pair(&pair);
        let mut receiver = None;
        let mut name = None;
        let mut type_params = Vec::new();
        let mut signature = None;
        let mut has_body = false;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::kw_func => {}
                Rule::receiver => {
                    let params = Self::first_inner_of(inner, Rule::parameters)?;
                    receiver = Some(Self::parse_parameters(params)?);
                }
                Rule::identifier => name = Some(Self::identifier_from_pair(&inner)),
                Rule::type_params => type_params = Self::parse_type_params(inner)?,
                Rule::signature => signature = Some(Self::parse_signature(inner)?),
                Rule::func_body => has_body = true,
                other => {
                    return Err(ParseError::unexpected_rule(
                        "function declaration",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(FuncDecl {
            receiver,
            name: name.ok_or_else(|| ParseError::missing("function name", Rule::func_decl))?,
            type_params,
            signature: signature
                .ok_or_else(|| ParseError::missing("signature", Rule::func_decl))?,
            has_body,
            span,
        })
    }
}
