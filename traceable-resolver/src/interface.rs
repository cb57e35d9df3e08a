//! Resolved methods, interfaces and packages

use crate::types::{PackageRef, Parameter, TypeDescriptor};
use indexmap::IndexMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Parameter>,
    pub results: Vec<Parameter>,
}

impl Method {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, results: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            params,
            results,
        }
    }

    /// Index of the first `context.Context` parameter
    pub fn context_param(&self) -> Option<usize> {
        self.params
            .iter()
            .position(|param| param.ty.is_named("context", "Context"))
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|param| param.ty.is_variadic())
    }

    pub fn collect_packages(&self, out: &mut BTreeMap<String, String>) {
        for param in self.params.iter().chain(&self.results) {
            param.ty.collect_packages(out);
        }
    }
}

/// Ordered method set keyed by method name.
///
/// Directly declared methods go through [`MethodSet::insert_or_replace`] and
/// methods merged from embedded interfaces through
/// [`MethodSet::insert_if_absent`]; mixing the two up reverses precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSet {
    methods: IndexMap<String, Method>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directly declared method, evicting any earlier one of that name.
    /// The method moves to the end of the set.
    pub fn insert_or_replace(&mut self, method: Method) -> Option<Method> {
        let previous = self.methods.shift_remove(&method.name);
        self.methods.insert(method.name.clone(), method);
        previous
    }

    /// Add an embedded method unless the name is already present.
    /// Returns whether it was added.
    pub fn insert_if_absent(&mut self, method: Method) -> bool {
        if self.methods.contains_key(&method.name) {
            return false;
        }
        self.methods.insert(method.name.clone(), method);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a MethodSet {
    type Item = &'a Method;
    type IntoIter = indexmap::map::Values<'a, String, Method>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.values()
    }
}

/// A fully resolved interface: embedded interfaces are flattened into
/// `methods` and `imports` covers every package the methods refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub package: PackageRef,
    pub methods: MethodSet,
    /// Import path -> preferred alias
    pub imports: BTreeMap<String, String>,
}

impl Interface {
    pub fn new(name: impl Into<String>, package: PackageRef, methods: MethodSet) -> Self {
        let mut imports = BTreeMap::new();
        for method in methods.iter() {
            method.collect_packages(&mut imports);
        }
        Self {
            name: name.into(),
            package,
            methods,
            imports,
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Type descriptor naming this interface from another package
    pub fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::qualified(self.package.clone(), self.name.clone())
    }

    /// The predeclared `error` interface
    pub fn builtin_error() -> Self {
        let mut methods = MethodSet::new();
        methods.insert_or_replace(Method::new(
            "Error",
            Vec::new(),
            vec![Parameter::anonymous(TypeDescriptor::named("string"))],
        ));
        Self::new("error", PackageRef::new("", ""), methods)
    }
}

/// Every interface declared in one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub import_path: String,
    pub interfaces: Vec<Interface>,
}

impl Package {
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }
}
