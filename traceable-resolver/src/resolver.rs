//! Interface resolution
//!
//! Walks parsed packages, finds interface declarations and flattens embedded
//! interfaces into a single method set. Everything that is expensive to build
//! (parsed packages, import tables, package names, resolved interfaces) lives
//! in a cache owned by the [`Resolver`], so each package is loaded once per run.

use crate::error::{ResolveError, ResolveResult};
use crate::imports::{needs_name_lookup, resolve_import_names, ImportTable};
use crate::interface::{Interface, MethodSet, Package};
use crate::loader::{LoadedPackage, PackageLoader};
use crate::types::PackageRef;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use traceable_parser::{
    parse_source_file_with_name, ConstSpec, InterfaceElem, SourceFile, TypeExpr, TypeSpec,
};

/// A parsed package
#[derive(Debug)]
pub struct Namespace {
    pub path: String,
    pub name: String,
    pub units: Vec<SourceFile>,
}

impl Namespace {
    /// Parse every unit of a loaded package
    pub fn parse(package: LoadedPackage) -> ResolveResult<Self> {
        let mut units = Vec::with_capacity(package.units.len());
        for unit in package.units {
            let file = parse_source_file_with_name(&unit.source, Some(unit.file_name.clone()))
                .map_err(|error| ResolveError::Parse {
                    file: unit.file_name.clone(),
                    error,
                })?;
            units.push(file);
        }
        Ok(Self {
            path: package.import_path,
            name: package.name,
            units,
        })
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(self.path.clone(), self.name.clone())
    }

    /// Type declaration `name` and the index of its unit
    pub fn find_type(&self, name: &str) -> Option<(usize, &TypeSpec)> {
        self.units.iter().enumerate().find_map(|(index, unit)| {
            unit.type_specs()
                .find(|spec| spec.name.name == name)
                .map(|spec| (index, spec))
        })
    }

    /// Constant declaration containing `name` and the index of its unit
    pub fn find_const(&self, name: &str) -> Option<(usize, &ConstSpec)> {
        self.units.iter().enumerate().find_map(|(index, unit)| {
            unit.const_specs()
                .find(|spec| spec.names.iter().any(|ident| ident.name == name))
                .map(|spec| (index, spec))
        })
    }

    /// Names of non-generic interface declarations, in declaration order
    pub fn interface_names(&self) -> Vec<String> {
        self.units
            .iter()
            .flat_map(|unit| unit.type_specs())
            .filter(|spec| spec.type_params.is_empty() && matches!(spec.ty, TypeExpr::Interface(_)))
            .map(|spec| spec.name.name.clone())
            .collect()
    }

    fn file_name(&self, unit: usize) -> String {
        self.units
            .get(unit)
            .and_then(|file| file.source_name.clone())
            .unwrap_or_else(|| self.path.clone())
    }
}

/// Everything a signature needs to resolve its names
#[derive(Debug, Clone)]
pub struct Scope {
    pub namespace: Rc<Namespace>,
    pub unit: usize,
    pub imports: Rc<ImportTable>,
}

impl Scope {
    pub fn file_name(&self) -> String {
        self.namespace.file_name(self.unit)
    }
}

#[derive(Debug, Default)]
struct ResolverCache {
    namespaces: HashMap<String, Rc<Namespace>>,
    import_tables: HashMap<(String, usize), Rc<ImportTable>>,
    package_names: HashMap<String, String>,
    interfaces: HashMap<(String, String), Interface>,
    resolving: IndexSet<(String, String)>,
}

pub struct Resolver<'l> {
    loader: &'l dyn PackageLoader,
    cache: ResolverCache,
}

impl<'l> Resolver<'l> {
    pub fn new(loader: &'l dyn PackageLoader) -> Self {
        Self {
            loader,
            cache: ResolverCache::default(),
        }
    }

    /// Seed the cache with an already loaded package, such as one read from a
    /// directory rather than found by import path.
    pub fn add_package(&mut self, package: LoadedPackage) -> ResolveResult<Rc<Namespace>> {
        if let Some(existing) = self.cache.namespaces.get(&package.import_path) {
            return Ok(existing.clone());
        }
        let namespace = Rc::new(Namespace::parse(package)?);
        self.cache
            .package_names
            .insert(namespace.path.clone(), namespace.name.clone());
        self.cache
            .namespaces
            .insert(namespace.path.clone(), namespace.clone());
        Ok(namespace)
    }

    /// The parsed package at `path`, loading it on first use
    pub fn namespace(&mut self, path: &str) -> ResolveResult<Rc<Namespace>> {
        if let Some(namespace) = self.cache.namespaces.get(path) {
            debug!(path, "package cache hit");
            return Ok(namespace.clone());
        }

        let package = self.loader.load(path)?.ok_or_else(|| ResolveError::Load {
            paths: vec![path.to_string()],
        })?;
        debug!(path, files = package.units.len(), "loaded package");
        self.add_package(package)
    }

    /// Import table of one unit of `namespace`
    pub fn import_table(
        &mut self,
        namespace: &Namespace,
        unit: usize,
    ) -> ResolveResult<Rc<ImportTable>> {
        let key = (namespace.path.clone(), unit);
        if let Some(table) = self.cache.import_tables.get(&key) {
            return Ok(table.clone());
        }

        let specs = namespace
            .units
            .get(unit)
            .map(|file| file.imports.as_slice())
            .unwrap_or_default();

        let unknown: Vec<String> = specs
            .iter()
            .filter(|spec| needs_name_lookup(spec))
            .filter(|spec| !self.cache.package_names.contains_key(&spec.path))
            .map(|spec| spec.path.clone())
            .collect();
        if !unknown.is_empty() {
            let names = resolve_import_names(self.loader, unknown)?;
            self.cache.package_names.extend(names);
        }

        let names = &self.cache.package_names;
        let table = Rc::new(ImportTable::from_specs(specs, |path| names.get(path).cloned()));
        self.cache.import_tables.insert(key, table.clone());
        Ok(table)
    }

    /// Scope for signatures declared in one unit of the package at `path`
    pub fn scope(&mut self, path: &str, unit: usize) -> ResolveResult<Scope> {
        let namespace = self.namespace(path)?;
        let imports = self.import_table(&namespace, unit)?;
        Ok(Scope {
            namespace,
            unit,
            imports,
        })
    }

    /// Resolve every interface declared in the package at `path`
    pub fn resolve_package(&mut self, path: &str) -> ResolveResult<Package> {
        let namespace = self.namespace(path)?;
        let mut interfaces = Vec::new();
        for name in namespace.interface_names() {
            interfaces.push(self.resolve_interface(path, &name)?);
        }
        Ok(Package {
            name: namespace.name.clone(),
            import_path: namespace.path.clone(),
            interfaces,
        })
    }

    /// Resolve the interface `name` declared in the package at `path`,
    /// flattening everything it embeds.
    pub fn resolve_interface(&mut self, path: &str, name: &str) -> ResolveResult<Interface> {
        let key = (path.to_string(), name.to_string());
        if let Some(resolved) = self.cache.interfaces.get(&key) {
            return Ok(resolved.clone());
        }

        if self.cache.resolving.contains(&key) {
            let mut chain: Vec<String> = self
                .cache
                .resolving
                .iter()
                .skip_while(|entry| **entry != key)
                .map(|(path, name)| format!("{path}.{name}"))
                .collect();
            chain.push(format!("{path}.{name}"));
            return Err(ResolveError::CyclicEmbed { chain });
        }

        self.cache.resolving.insert(key.clone());
        let result = self.build_interface(path, name);
        self.cache.resolving.shift_remove(&key);

        let interface = result?;
        debug!(
            path,
            name,
            methods = interface.methods.len(),
            "resolved interface"
        );
        self.cache.interfaces.insert(key, interface.clone());
        Ok(interface)
    }

    fn build_interface(&mut self, path: &str, name: &str) -> ResolveResult<Interface> {
        let namespace = self.namespace(path)?;
        let (unit, spec) =
            namespace
                .find_type(name)
                .ok_or_else(|| ResolveError::UnknownInterface {
                    name: name.to_string(),
                    package: path.to_string(),
                })?;

        if !spec.type_params.is_empty() {
            return Err(ResolveError::unsupported_type(
                format!("{}.{name}", namespace.name),
                "generic interfaces cannot be traced",
            ));
        }

        let scope = Scope {
            imports: self.import_table(&namespace, unit)?,
            namespace: namespace.clone(),
            unit,
        };

        match unparen(&spec.ty) {
            TypeExpr::Interface(elems) => {
                let methods = self.resolve_members(&scope, name, elems)?;
                Ok(Interface::new(name, namespace.package_ref(), methods))
            }
            TypeExpr::Name { .. } => {
                // `type R = io.Reader` or `type R io.Reader`
                let target = self.resolve_reference(&scope, name, &spec.ty)?;
                Ok(Interface::new(name, namespace.package_ref(), target.methods))
            }
            other => Err(ResolveError::NotAnInterface {
                name: format!("{}.{name}", namespace.name),
                kind: other.kind_name().to_string(),
            }),
        }
    }

    fn resolve_members(
        &mut self,
        scope: &Scope,
        interface: &str,
        elems: &[InterfaceElem],
    ) -> ResolveResult<MethodSet> {
        let mut methods = MethodSet::new();

        for elem in elems {
            match elem {
                InterfaceElem::Method {
                    name, signature, ..
                } => {
                    let method = self.parse_method(scope, &name.name, signature)?;
                    methods.insert_or_replace(method);
                }
                InterfaceElem::Embed { terms, .. } => {
                    let [term] = terms.as_slice() else {
                        return Err(unsupported_member(interface, "type union"));
                    };
                    if term.tilde {
                        return Err(unsupported_member(interface, "approximation element"));
                    }
                    let embedded = self.resolve_embed(scope, interface, &term.ty)?;
                    for method in embedded.methods.iter() {
                        methods.insert_if_absent(method.clone());
                    }
                }
            }
        }

        Ok(methods)
    }

    /// Resolve an embedded element to the interface it names
    fn resolve_embed(
        &mut self,
        scope: &Scope,
        interface: &str,
        ty: &TypeExpr,
    ) -> ResolveResult<Interface> {
        match unparen(ty) {
            TypeExpr::Name {
                package: None,
                name,
                type_args,
            } if type_args.is_empty() => {
                if scope.namespace.find_type(name).is_some() {
                    return self.embedded_interface(&scope.namespace.path, name, interface);
                }
                match name.as_str() {
                    "error" => Ok(Interface::builtin_error()),
                    "comparable" => Err(unsupported_member(interface, "comparable")),
                    _ => Err(ResolveError::UnknownEmbed {
                        name: name.clone(),
                        interface: interface.to_string(),
                    }),
                }
            }
            TypeExpr::Name {
                package: Some(alias),
                name,
                type_args,
            } if type_args.is_empty() => {
                let path = self.package_path(scope, alias)?;
                let foreign = self.namespace(&path)?;
                if foreign.find_type(name).is_none() {
                    return Err(ResolveError::UnknownEmbed {
                        name: format!("{alias}.{name}"),
                        interface: interface.to_string(),
                    });
                }
                self.embedded_interface(&path, name, interface)
            }
            TypeExpr::Name { name, .. } => Err(ResolveError::unsupported_type(
                name.clone(),
                "generic interfaces cannot be embedded",
            )),
            TypeExpr::Interface(_) => Err(unsupported_member(interface, "interface")),
            other => Err(unsupported_member(interface, other.kind_name())),
        }
    }

    /// Resolve an embed target, reporting non-interfaces as unsupported members
    fn embedded_interface(
        &mut self,
        path: &str,
        name: &str,
        interface: &str,
    ) -> ResolveResult<Interface> {
        match self.resolve_interface(path, name) {
            Err(ResolveError::NotAnInterface { name: member, kind }) => Err(
                ResolveError::UnsupportedMember {
                    member: format!("{member} ({kind})"),
                    interface: interface.to_string(),
                },
            ),
            other => other,
        }
    }

    /// Follow a declaration that names another type, as in `type R io.Reader`
    fn resolve_reference(
        &mut self,
        scope: &Scope,
        declared: &str,
        ty: &TypeExpr,
    ) -> ResolveResult<Interface> {
        match unparen(ty) {
            TypeExpr::Name {
                package,
                name,
                type_args,
            } => {
                if !type_args.is_empty() {
                    return Err(ResolveError::unsupported_type(
                        name.clone(),
                        "generic interfaces cannot be traced",
                    ));
                }
                match package {
                    Some(alias) => {
                        let path = self.package_path(scope, alias)?;
                        self.resolve_interface(&path, name)
                    }
                    None if scope.namespace.find_type(name).is_some() => {
                        self.resolve_interface(&scope.namespace.path, name)
                    }
                    None if name == "error" => Ok(Interface::builtin_error()),
                    None => Err(ResolveError::NotAnInterface {
                        name: declared.to_string(),
                        kind: format!("{name} type"),
                    }),
                }
            }
            other => Err(ResolveError::NotAnInterface {
                name: declared.to_string(),
                kind: other.kind_name().to_string(),
            }),
        }
    }

    /// Import path behind `alias` in the scope's unit
    pub(crate) fn package_path(&self, scope: &Scope, alias: &str) -> ResolveResult<String> {
        scope
            .imports
            .path_of(alias)
            .map(str::to_string)
            .ok_or_else(|| ResolveError::UnknownPackage {
                alias: alias.to_string(),
                file: scope.file_name(),
            })
    }
}

fn unparen(ty: &TypeExpr) -> &TypeExpr {
    match ty {
        TypeExpr::Paren(inner) => unparen(inner),
        other => other,
    }
}

fn unsupported_member(interface: &str, member: &str) -> ResolveError {
    ResolveError::UnsupportedMember {
        member: member.to_string(),
        interface: interface.to_string(),
    }
}
