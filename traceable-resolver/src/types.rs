//! Type descriptor model
//!
//! A closed description of every type shape a method parameter or result can
//! take. Descriptors are plain values: rendering is a pure function of the tree
//! and the [`Qualifier`] used to print package names.

use std::collections::BTreeMap;
use std::fmt;

pub use traceable_parser::ChanDir;

/// A package as referenced from a type: its import path plus the alias the
/// declaring file used for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageRef {
    pub path: String,
    pub alias: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: alias.into(),
        }
    }
}

/// Decides how a package qualifier is printed.
///
/// `None` drops the qualifier, which is what rendering inside the package
/// itself needs.
pub trait Qualifier {
    fn qualify(&self, package: &PackageRef) -> Option<String>;
}

/// Prints every package under the alias its declaring file used
pub struct DeclaredAliases;

impl Qualifier for DeclaredAliases {
    fn qualify(&self, package: &PackageRef) -> Option<String> {
        Some(package.alias.clone())
    }
}

/// Like [`DeclaredAliases`], but leaves names from one package unqualified
pub struct LocalTo<'a>(pub &'a str);

impl Qualifier for LocalTo<'_> {
    fn qualify(&self, package: &PackageRef) -> Option<String> {
        (package.path != self.0).then(|| package.alias.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Named {
        package: Option<PackageRef>,
        name: String,
    },
    Pointer(Box<TypeDescriptor>),
    /// Slice when `length` is `None`, array otherwise
    Sequence {
        element: Box<TypeDescriptor>,
        length: Option<u64>,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Channel {
        element: Box<TypeDescriptor>,
        direction: ChanDir,
    },
    Function {
        params: Vec<Parameter>,
        results: Vec<Parameter>,
    },
    Variadic(Box<TypeDescriptor>),
    EmptyInterface,
    EmptyStruct,
}

/// A parameter or result; `name` is `None` for anonymous ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: TypeDescriptor,
}

impl Parameter {
    pub fn named(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn anonymous(ty: TypeDescriptor) -> Self {
        Self { name: None, ty }
    }
}

impl TypeDescriptor {
    /// An unqualified name: a builtin or a type in the rendering package
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
        }
    }

    pub fn qualified(package: PackageRef, name: impl Into<String>) -> Self {
        Self::Named {
            package: Some(package),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeDescriptor) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn slice(element: TypeDescriptor) -> Self {
        Self::Sequence {
            element: Box::new(element),
            length: None,
        }
    }

    pub fn array(element: TypeDescriptor, length: u64) -> Self {
        Self::Sequence {
            element: Box::new(element),
            length: Some(length),
        }
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn channel(element: TypeDescriptor, direction: ChanDir) -> Self {
        Self::Channel {
            element: Box::new(element),
            direction,
        }
    }

    pub fn variadic(element: TypeDescriptor) -> Self {
        Self::Variadic(Box::new(element))
    }

    /// True for `<path>.<name>`, whatever alias the package was imported under
    pub fn is_named(&self, path: &str, name: &str) -> bool {
        matches!(
            self,
            Self::Named { package: Some(package), name: n } if package.path == path && n == name
        )
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::Variadic(_))
    }

    /// Render as Go source using `qualifier` for package names
    pub fn render(&self, qualifier: &dyn Qualifier) -> String {
        let mut out = String::new();
        self.write_to(&mut out, qualifier);
        out
    }

    fn write_to(&self, out: &mut String, qualifier: &dyn Qualifier) {
        match self {
            Self::Named { package, name } => {
                if let Some(alias) = package.as_ref().and_then(|p| qualifier.qualify(p)) {
                    out.push_str(&alias);
                    out.push('.');
                }
                out.push_str(name);
            }
            Self::Pointer(inner) => {
                out.push('*');
                inner.write_to(out, qualifier);
            }
            Self::Sequence { element, length } => {
                out.push('[');
                if let Some(length) = length {
                    out.push_str(&length.to_string());
                }
                out.push(']');
                element.write_to(out, qualifier);
            }
            Self::Map { key, value } => {
                out.push_str("map[");
                key.write_to(out, qualifier);
                out.push(']');
                value.write_to(out, qualifier);
            }
            Self::Channel { element, direction } => match direction {
                ChanDir::Send => {
                    out.push_str("chan<- ");
                    element.write_to(out, qualifier);
                }
                ChanDir::Recv => {
                    out.push_str("<-chan ");
                    element.write_to(out, qualifier);
                }
                ChanDir::Both => {
                    out.push_str("chan ");
                    // `chan <-chan T` would parse as `chan<- (chan T)`
                    let needs_parens = matches!(
                        element.as_ref(),
                        Self::Channel {
                            direction: ChanDir::Recv,
                            ..
                        }
                    );
                    if needs_parens {
                        out.push('(');
                    }
                    element.write_to(out, qualifier);
                    if needs_parens {
                        out.push(')');
                    }
                }
            },
            Self::Function { params, results } => {
                out.push_str("func(");
                write_list(out, params, qualifier);
                out.push(')');
                out.push_str(&render_results(results, qualifier));
            }
            Self::Variadic(inner) => {
                out.push_str("...");
                inner.write_to(out, qualifier);
            }
            Self::EmptyInterface => out.push_str("interface{}"),
            Self::EmptyStruct => out.push_str("struct{}"),
        }
    }

    /// Record every package this type refers to as `path -> alias`.
    ///
    /// The first alias seen for a path is kept.
    pub fn collect_packages(&self, out: &mut BTreeMap<String, String>) {
        match self {
            Self::Named {
                package: Some(package),
                ..
            } => {
                out.entry(package.path.clone())
                    .or_insert_with(|| package.alias.clone());
            }
            Self::Named { package: None, .. } | Self::EmptyInterface | Self::EmptyStruct => {}
            Self::Pointer(inner) | Self::Variadic(inner) => inner.collect_packages(out),
            Self::Sequence { element, .. } | Self::Channel { element, .. } => {
                element.collect_packages(out)
            }
            Self::Map { key, value } => {
                key.collect_packages(out);
                value.collect_packages(out);
            }
            Self::Function { params, results } => {
                for param in params.iter().chain(results) {
                    param.ty.collect_packages(out);
                }
            }
        }
    }
}

fn write_list(out: &mut String, params: &[Parameter], qualifier: &dyn Qualifier) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        param.ty.write_to(out, qualifier);
    }
}

/// Result list as it follows a parameter list: empty, ` T` or ` (T1, T2)`
pub fn render_results(results: &[Parameter], qualifier: &dyn Qualifier) -> String {
    let mut out = String::new();
    match results.len() {
        0 => {}
        1 => {
            out.push(' ');
            results[0].ty.write_to(&mut out, qualifier);
        }
        _ => {
            out.push_str(" (");
            write_list(&mut out, results, qualifier);
            out.push(')');
        }
    }
    out
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&DeclaredAliases))
    }
}
