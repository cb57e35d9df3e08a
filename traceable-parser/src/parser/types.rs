// Type expression parsing module
// Handles named, composite, function, interface and struct types

use super::{GoParser, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl GoParser {
    /// Parse a `type_expr` pair
    pub(crate) fn parse_type_expr(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let inner = Self::expect_next(&mut pair.into_inner(), "type", Rule::type_expr)?;

        match inner.as_rule() {
            Rule::pointer_type => {
                let target = Self::first_inner_of(inner, Rule::type_expr)?;
                Ok(TypeExpr::Pointer(Box::new(Self::parse_type_expr(target)?)))
            }
            Rule::slice_type => {
                let element = Self::first_inner_of(inner, Rule::type_expr)?;
                Ok(TypeExpr::Slice(Box::new(Self::parse_type_expr(element)?)))
            }
            Rule::array_type => Self::parse_array_type(inner),
            Rule::map_type => Self::parse_map_type(inner),
            Rule::chan_type => Self::parse_chan_type(inner),
            Rule::func_type => {
                let signature = Self::first_inner_of(inner, Rule::signature)?;
                Ok(TypeExpr::Func(Self::parse_signature(signature)?))
            }
            Rule::interface_type => Ok(TypeExpr::Interface(Self::parse_interface_type(inner)?)),
            Rule::struct_type => Ok(TypeExpr::Struct(Self::parse_struct_type(inner)?)),
            Rule::paren_type => {
                let ty = Self::first_inner_of(inner, Rule::type_expr)?;
                Ok(TypeExpr::Paren(Box::new(Self::parse_type_expr(ty)?)))
            }
            Rule::type_name => Self::parse_type_name(inner),
            other => Err(ParseError::unexpected_rule(
                "type expression",
                other,
                Self::span_from_pair(&inner),
            )),
        }
    }

    fn parse_array_type(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let mut inner = pair.into_inner();
        let length_pair = Self::expect_next(&mut inner, "array length", Rule::array_type)?;
        let element_pair = Self::expect_next(&mut inner, "element type", Rule::array_type)?;

        let length = Self::parse_array_length(length_pair)?;
        let element = Self::parse_type_expr(element_pair)?;

        Ok(TypeExpr::Array {
            length,
            element: Box::new(element),
        })
    }

    fn parse_array_length(pair: Pair<Rule>) -> ParseResult<ArrayLength> {
        let inner = Self::expect_next(&mut pair.into_inner(), "array length", Rule::array_length)?;

        match inner.as_rule() {
            Rule::array_ellipsis => Ok(ArrayLength::Ellipsis),
            Rule::qualified_ident => {
                let (package, name) = Self::parse_qualified_ident(inner)?;
                Ok(ArrayLength::Constant { package, name })
            }
            Rule::length_expr => {
                let text = inner.as_str().trim();
                Ok(match super::parse_int_literal(text) {
                    Some(value) => ArrayLength::Literal(value),
                    None => ArrayLength::Expr(text.to_string()),
                })
            }
            other => Err(ParseError::unexpected_rule(
                "array length",
                other,
                Self::span_from_pair(&inner),
            )),
        }
    }

    fn parse_map_type(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let mut types = pair
            .into_inner()
            .filter(|inner| inner.as_rule() == Rule::type_expr);
        let key = types
            .next()
            .ok_or_else(|| ParseError::missing("map key type", Rule::map_type))?;
        let value = types
            .next()
            .ok_or_else(|| ParseError::missing("map value type", Rule::map_type))?;

        Ok(TypeExpr::Map {
            key: Box::new(Self::parse_type_expr(key)?),
            value: Box::new(Self::parse_type_expr(value)?),
        })
    }

    fn parse_chan_type(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let inner = Self::expect_next(&mut pair.into_inner(), "channel", Rule::chan_type)?;
        let direction = match inner.as_rule() {
            Rule::recv_chan => ChanDir::Recv,
            Rule::send_chan => ChanDir::Send,
            Rule::bidi_chan => ChanDir::Both,
            other => {
                return Err(ParseError::unexpected_rule(
                    "channel type",
                    other,
                    Self::span_from_pair(&inner),
                ))
            }
        };
        let element = Self::first_inner_of(inner, Rule::type_expr)?;

        Ok(TypeExpr::Chan {
            direction,
            element: Box::new(Self::parse_type_expr(element)?),
        })
    }

    /// Parse a `type_name` pair: `Name`, `pkg.Name`, `Name[Args]`
    pub(crate) fn parse_type_name(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let mut package = None;
        let mut name = None;
        let mut type_args = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::qualified_ident => {
                    let (pkg, ident) = Self::parse_qualified_ident(inner)?;
                    package = pkg;
                    name = Some(ident);
                }
                Rule::type_args => {
                    for arg in inner.into_inner() {
                        type_args.push(Self::parse_type_expr(arg)?);
                    }
                }
                other => {
                    return Err(ParseError::unexpected_rule(
                        "type name",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(TypeExpr::Name {
            package,
            name: name.ok_or_else(|| ParseError::missing("type name", Rule::type_name))?,
            type_args,
        })
    }

    /// Split `pkg.Name` into its qualifier and name
    fn parse_qualified_ident(pair: Pair<Rule>) -> ParseResult<(Option<String>, String)> {
        let mut idents: Vec<String> = pair
            .into_inner()
            .map(|inner| inner.as_str().to_string())
            .collect();

        match idents.len() {
            1 => Ok((None, idents.remove(0))),
            2 => {
                let name = idents.remove(1);
                Ok((Some(idents.remove(0)), name))
            }
            _ => Err(ParseError::missing("identifier", Rule::qualified_ident)),
        }
    }

    /// Parse a function signature: parameters plus optional results
    pub(crate) fn parse_signature(pair: Pair<Rule>) -> ParseResult<Signature> {
        let mut signature = Signature::default();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::parameters => signature.params = Self::parse_parameters(inner)?,
                Rule::result => signature.results = Self::parse_result(inner)?,
                other => {
                    return Err(ParseError::unexpected_rule(
                        "signature",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(signature)
    }

    fn parse_result(pair: Pair<Rule>) -> ParseResult<Vec<Field>> {
        let inner = Self::expect_next(&mut pair.into_inner(), "result", Rule::result)?;

        match inner.as_rule() {
            Rule::parameters => Self::parse_parameters(inner),
            Rule::type_expr => {
                let span = Self::span_from_pair(&inner);
                Ok(vec![Field {
                    names: Vec::new(),
                    ty: Self::parse_type_expr(inner)?,
                    tag: None,
                    span,
                }])
            }
            other => Err(ParseError::unexpected_rule(
                "result",
                other,
                Self::span_from_pair(&inner),
            )),
        }
    }

    /// Parse a parenthesized parameter list; each declaration becomes one field
    pub(crate) fn parse_parameters(pair: Pair<Rule>) -> ParseResult<Vec<Field>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::parameter_decl)
            .map(Self::parse_parameter_decl)
            .collect()
    }

    fn parse_parameter_decl(pair: Pair<Rule>) -> ParseResult<Field> {
        let span = Self::span_from_pair(&pair);
        let mut names = Vec::new();
        let mut variadic = false;
        let mut ty = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier_list => names = Self::parse_identifier_list(inner),
                Rule::variadic => variadic = true,
                Rule::type_expr => ty = Some(Self::parse_type_expr(inner)?),
                other => {
                    return Err(ParseError::unexpected_rule(
                        "parameter",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        let ty = ty.ok_or_else(|| ParseError::missing("parameter type", Rule::parameter_decl))?;
        let ty = if variadic {
            TypeExpr::Ellipsis(Box::new(ty))
        } else {
            ty
        };

        Ok(Field {
            names,
            ty,
            tag: None,
            span,
        })
    }

    fn parse_interface_type(pair: Pair<Rule>) -> ParseResult<Vec<InterfaceElem>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::interface_elem)
            .map(Self::parse_interface_elem)
            .collect()
    }

    fn parse_interface_elem(pair: Pair<Rule>) -> ParseResult<InterfaceElem> {
        let span = Self::span_from_pair(&pair);
        let inner = Self::expect_next(&mut pair.into_inner(), "interface element", Rule::interface_elem)?;

        match inner.as_rule() {
            Rule::method_spec => {
                let mut parts = inner.into_inner();
                let name = Self::expect_next(&mut parts, "method name", Rule::method_spec)?;
                let signature = Self::expect_next(&mut parts, "method signature", Rule::method_spec)?;
                Ok(InterfaceElem::Method {
                    name: Self::identifier_from_pair(&name),
                    signature: Self::parse_signature(signature)?,
                    span,
                })
            }
            Rule::type_union => Ok(InterfaceElem::Embed {
                terms: Self::parse_type_union(inner)?,
                span,
            }),
            other => Err(ParseError::unexpected_rule(
                "method or embedded type",
                other,
                Self::span_from_pair(&inner),
            )),
        }
    }

    /// Parse `A | ~B | C` into its terms
    pub(crate) fn parse_type_union(pair: Pair<Rule>) -> ParseResult<Vec<TypeTerm>> {
        let mut terms = Vec::new();
        for term in pair.into_inner() {
            let mut tilde = false;
            let mut ty = None;
            for inner in term.into_inner() {
                match inner.as_rule() {
                    Rule::tilde => tilde = true,
                    Rule::type_expr => ty = Some(Self::parse_type_expr(inner)?),
                    other => {
                        return Err(ParseError::unexpected_rule(
                            "type term",
                            other,
                            Self::span_from_pair(&inner),
                        ))
                    }
                }
            }
            let ty = ty.ok_or_else(|| ParseError::missing("type", Rule::type_term))?;
            terms.push(TypeTerm { tilde, ty });
        }
        Ok(terms)
    }

    fn parse_struct_type(pair: Pair<Rule>) -> ParseResult<Vec<Field>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::field_decl)
            .map(Self::parse_field_decl)
            .collect()
    }

    fn parse_field_decl(pair: Pair<Rule>) -> ParseResult<Field> {
        let span = Self::span_from_pair(&pair);
        let mut names = Vec::new();
        let mut ty = None;
        let mut tag = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::named_field => {
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::identifier_list => names = Self::parse_identifier_list(part),
                            Rule::type_expr => ty = Some(Self::parse_type_expr(part)?),
                            _ => {}
                        }
                    }
                }
                Rule::embedded_field => {
                    let mut pointer = false;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::embedded_pointer => pointer = true,
                            Rule::type_name => ty = Some(Self::parse_type_name(part)?),
                            _ => {}
                        }
                    }
                    if pointer {
                        ty = ty.map(|t| TypeExpr::Pointer(Box::new(t)));
                    }
                }
                Rule::string_lit => tag = Some(Self::parse_string_lit(inner)?),
                other => {
                    return Err(ParseError::unexpected_rule(
                        "struct field",
                        other,
                        Self::span_from_pair(&inner),
                    ))
                }
            }
        }

        Ok(Field {
            names,
            ty: ty.ok_or_else(|| ParseError::missing("field type", Rule::field_decl))?,
            tag,
            span,
        })
    }
}
