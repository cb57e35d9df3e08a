//! Method and signature extraction
//!
//! Converts parsed parameter lists and type expressions into the
//! [`TypeDescriptor`] model, following array length constants across files
//! and packages where needed.

use crate::error::{ResolveError, ResolveResult};
use crate::interface::Method;
use crate::resolver::{Namespace, Resolver, Scope};
use crate::types::{PackageRef, Parameter, TypeDescriptor};
use std::rc::Rc;
use traceable_parser::{is_exported, parse_int_literal, ArrayLength, Field, Signature, TypeExpr};

/// Constants may refer to other constants; give up after this many hops
const MAX_CONST_DEPTH: usize = 32;

impl Resolver<'_> {
    pub(crate) fn parse_method(
        &mut self,
        scope: &Scope,
        name: &str,
        signature: &Signature,
    ) -> ResolveResult<Method> {
        let params = self.parse_field_list(scope, &signature.params)?;
        let results = self.parse_field_list(scope, &signature.results)?;
        Ok(Method::new(name, params, results))
    }

    /// One parameter per declared name, or a single anonymous parameter for
    /// a field without names.
    pub fn parse_field_list(
        &mut self,
        scope: &Scope,
        fields: &[Field],
    ) -> ResolveResult<Vec<Parameter>> {
        let mut params = Vec::new();
        for field in fields {
            let ty = self.parse_type(scope, &field.ty)?;
            if field.names.is_empty() {
                params.push(Parameter::anonymous(ty));
            } else {
                for ident in &field.names {
                    params.push(Parameter::named(ident.name.clone(), ty.clone()));
                }
            }
        }
        Ok(params)
    }

    pub fn parse_type(&mut self, scope: &Scope, expr: &TypeExpr) -> ResolveResult<TypeDescriptor> {
        match expr {
            TypeExpr::Name {
                package,
                name,
                type_args,
            } => {
                if !type_args.is_empty() {
                    return Err(ResolveError::unsupported_type(
                        name.clone(),
                        "generic type instantiations are not supported",
                    ));
                }
                match package {
                    Some(alias) => {
                        let imported = scope.imports.get(alias).ok_or_else(|| {
                            ResolveError::UnknownPackage {
                                alias: alias.clone(),
                                file: scope.file_name(),
                            }
                        })?;
                        let package = PackageRef::new(imported.path.clone(), alias);
                        Ok(TypeDescriptor::qualified(package, name.clone()))
                    }
                    None if is_exported(name) => Ok(TypeDescriptor::qualified(
                        scope.namespace.package_ref(),
                        name.clone(),
                    )),
                    None => Ok(TypeDescriptor::named(name.clone())),
                }
            }
            TypeExpr::Pointer(inner) => Ok(TypeDescriptor::pointer(self.parse_type(scope, inner)?)),
            TypeExpr::Slice(element) => Ok(TypeDescriptor::slice(self.parse_type(scope, element)?)),
            TypeExpr::Array { length, element } => {
                let length = self.array_length(scope, length)?;
                Ok(TypeDescriptor::array(self.parse_type(scope, element)?, length))
            }
            TypeExpr::Map { key, value } => Ok(TypeDescriptor::map(
                self.parse_type(scope, key)?,
                self.parse_type(scope, value)?,
            )),
            TypeExpr::Chan { direction, element } => Ok(TypeDescriptor::channel(
                self.parse_type(scope, element)?,
                *direction,
            )),
            TypeExpr::Func(signature) => Ok(TypeDescriptor::Function {
                params: self.parse_field_list(scope, &signature.params)?,
                results: self.parse_field_list(scope, &signature.results)?,
            }),
            TypeExpr::Interface(elems) if elems.is_empty() => Ok(TypeDescriptor::EmptyInterface),
            TypeExpr::Interface(_) => Err(ResolveError::unsupported_type(
                "interface{...}",
                "anonymous interfaces with methods are not supported",
            )),
            TypeExpr::Struct(fields) if fields.is_empty() => Ok(TypeDescriptor::EmptyStruct),
            TypeExpr::Struct(_) => Err(ResolveError::unsupported_type(
                "struct{...}",
                "anonymous structs with fields are not supported",
            )),
            TypeExpr::Paren(inner) => self.parse_type(scope, inner),
            TypeExpr::Ellipsis(element) => {
                Ok(TypeDescriptor::variadic(self.parse_type(scope, element)?))
            }
        }
    }

    fn array_length(&mut self, scope: &Scope, length: &ArrayLength) -> ResolveResult<u64> {
        match length {
            ArrayLength::Literal(value) => Ok(*value),
            ArrayLength::Ellipsis => Err(ResolveError::bad_array_length(
                "...",
                "only allowed in composite literals",
            )),
            ArrayLength::Expr(text) => Err(ResolveError::bad_array_length(
                text.clone(),
                "constant expressions are not evaluated",
            )),
            ArrayLength::Constant {
                package: None,
                name,
            } => self.eval_const(scope.namespace.clone(), name, 0),
            ArrayLength::Constant {
                package: Some(alias),
                name,
            } => {
                let path = self.package_path(scope, alias)?;
                let namespace = self.namespace(&path)?;
                self.eval_const(namespace, name, 0)
            }
        }
    }

    /// Value of the integer constant `name` in `namespace`
    fn eval_const(&mut self, namespace: Rc<Namespace>, name: &str, depth: usize) -> ResolveResult<u64> {
        if depth > MAX_CONST_DEPTH {
            return Err(ResolveError::bad_array_length(
                name,
                "constant refers to itself",
            ));
        }

        let Some((unit, spec)) = namespace.find_const(name) else {
            return Err(ResolveError::bad_array_length(
                name,
                format!("no constant {name} in package {}", namespace.path),
            ));
        };
        let Some(value) = spec.value_of(name) else {
            return Err(ResolveError::bad_array_length(
                name,
                "constant has no explicit value",
            ));
        };
        let value = strip_parens(value);

        if let Some(literal) = parse_int_literal(value) {
            return Ok(literal);
        }

        match value.split_once('.') {
            None if is_identifier(value) => self.eval_const(namespace.clone(), value, depth + 1),
            Some((alias, target)) if is_identifier(alias) && is_identifier(target) => {
                let imports = self.import_table(&namespace, unit)?;
                let scope = Scope {
                    namespace: namespace.clone(),
                    unit,
                    imports,
                };
                let path = self.package_path(&scope, alias)?;
                let foreign = self.namespace(&path)?;
                self.eval_const(foreign, target, depth + 1)
            }
            _ => Err(ResolveError::bad_array_length(
                name,
                format!("{value} is not an integer literal"),
            )),
        }
    }
}

fn strip_parens(mut text: &str) -> &str {
    loop {
        text = text.trim();
        match text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            Some(inner) => text = inner,
            None => return text,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}
