//! Traced wrapper generation
//!
//! Renders resolved interfaces into one Go file: a wrapper struct holding the
//! real implementation and a tracer, its constructor, and one forwarding
//! method per interface method that opens a span named
//! `"<Interface>.<Method>"` around the delegated call.

use crate::backend::{SpanParent, TracerBackend, CONTEXT_PATH};
use crate::error::{GenerateError, GenerateResult};
use crate::names::{parameter_names, FileImports, WrapperFields};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;
use traceable_resolver::{render_results, Interface, Method, Qualifier};

pub const HEADER: &str = "// Code generated by traceable. DO NOT EDIT.";

/// The package the generated file belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPackage {
    pub name: String,
    pub path: String,
}

impl OutputPackage {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

pub struct Generator {
    output: OutputPackage,
    backend: TracerBackend,
    interfaces: IndexMap<String, Interface>,
}

impl Generator {
    pub fn new(output: OutputPackage, backend: TracerBackend) -> Self {
        Self {
            output,
            backend,
            interfaces: IndexMap::new(),
        }
    }

    pub fn output(&self) -> &OutputPackage {
        &self.output
    }

    pub fn backend(&self) -> TracerBackend {
        self.backend
    }

    /// Queue an interface for generation. Adding the same interface twice is
    /// a no-op; two interfaces with the same name from different packages
    /// cannot share a file.
    pub fn add_interface(&mut self, interface: Interface) -> GenerateResult<()> {
        if let Some(existing) = self.interfaces.get(&interface.name) {
            if existing.package.path == interface.package.path {
                return Ok(());
            }
            return Err(GenerateError::DuplicateInterface {
                name: interface.name.clone(),
                first: format!("{}.{}", existing.package.path, existing.name),
                second: format!("{}.{}", interface.package.path, interface.name),
            });
        }
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    /// Generate the file for the single interface `name`
    pub fn generate(&self, name: &str) -> GenerateResult<Vec<u8>> {
        let interface = self
            .interfaces
            .get(name)
            .ok_or_else(|| GenerateError::UnknownInterface {
                name: name.to_string(),
            })?;
        Ok(self.render(&[interface]).into_bytes())
    }

    /// Generate one file holding every added interface, in insertion order
    pub fn generate_all(&self) -> Vec<u8> {
        let interfaces: Vec<&Interface> = self.interfaces.values().collect();
        self.render(&interfaces).into_bytes()
    }

    fn render(&self, interfaces: &[&Interface]) -> String {
        let imports = FileImports::new(&self.output.path, &self.packages(interfaces));

        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n\n");
        out.push_str(&format!("package {}\n", self.output.name));

        if !imports.is_empty() {
            out.push('\n');
            out.push_str(&imports.render_block());
        }

        for interface in interfaces {
            debug!(
                interface = %interface.name,
                methods = interface.methods.len(),
                backend = %self.backend,
                "generating wrapper"
            );
            self.write_wrapper(&mut out, interface, &imports);
        }

        out
    }

    /// Every package the file refers to, as path -> preferred alias
    fn packages(&self, interfaces: &[&Interface]) -> BTreeMap<String, String> {
        let mut packages = BTreeMap::new();

        for interface in interfaces {
            interface.type_descriptor().collect_packages(&mut packages);
            for (path, alias) in &interface.imports {
                packages
                    .entry(path.clone())
                    .or_insert_with(|| alias.clone());
            }
        }

        self.backend.tracer_type().collect_packages(&mut packages);

        let needs_background = self.backend.needs_background_context()
            && interfaces
                .iter()
                .flat_map(|interface| interface.methods.iter())
                .any(|method| method.context_param().is_none());
        if needs_background {
            packages
                .entry(CONTEXT_PATH.to_string())
                .or_insert_with(|| CONTEXT_PATH.to_string());
        }

        packages
    }

    fn write_wrapper(&self, out: &mut String, interface: &Interface, imports: &FileImports) {
        let wrapper = format!("Traced{}", interface.name);
        let wrapped = interface.type_descriptor().render(imports);
        let tracer = self.backend.tracer_type().render(imports);
        let fields = WrapperFields::for_interface(interface);
        let width = fields.width();

        out.push_str(&format!(
            "\n// {wrapper} wraps {wrapped} and records a span around every call.\n"
        ));
        out.push_str(&format!("type {wrapper} struct {{\n"));
        out.push_str(&format!("\t{:<width$} {wrapped}\n", fields.next));
        out.push_str(&format!("\t{:<width$} {tracer}\n", fields.tracer));
        out.push_str("}\n");

        out.push_str(&format!(
            "\n// New{wrapper} returns a {wrapper} delegating to next.\n"
        ));
        out.push_str(&format!(
            "func New{wrapper}(next {wrapped}, tracer {tracer}) *{wrapper} {{\n"
        ));
        out.push_str(&format!(
            "\treturn &{wrapper}{{{}: next, {}: tracer}}\n",
            fields.next, fields.tracer
        ));
        out.push_str("}\n");

        for method in interface.methods.iter() {
            self.write_method(out, &wrapper, &fields, interface, method, imports);
        }
    }

    fn write_method(
        &self,
        out: &mut String,
        wrapper: &str,
        fields: &WrapperFields,
        interface: &Interface,
        method: &Method,
        imports: &FileImports,
    ) {
        let names = parameter_names(method, imports);
        let params: Vec<String> = names
            .iter()
            .zip(&method.params)
            .map(|(name, param)| format!("{name} {}", param.ty.render(imports)))
            .collect();

        out.push_str(&format!(
            "\nfunc (t *{wrapper}) {}({}){} {{\n",
            method.name,
            params.join(", "),
            render_results(&method.results, imports)
        ));

        let span_name = format!("{}.{}", interface.name, method.name);
        let parent = match method.context_param() {
            Some(index) => SpanParent::Context(&names[index]),
            None => SpanParent::Root {
                background: imports.alias(CONTEXT_PATH),
            },
        };
        let package = self.backend.package();
        let package_alias = imports
            .qualify(&package)
            .unwrap_or_else(|| package.alias.clone());

        out.push_str(&format!(
            "\t{}\n",
            self.backend.start_span(
                &package_alias,
                &format!("t.{}", fields.tracer),
                &span_name,
                parent
            )
        ));
        out.push_str(&format!("\t{}\n\n", self.backend.finish_span()));

        let mut args = names.join(", ");
        if method.is_variadic() {
            args.push_str("...");
        }
        let call = format!("t.{}.{}({args})", fields.next, method.name);
        if method.results.is_empty() {
            out.push_str(&format!("\t{call}\n"));
        } else {
            out.push_str(&format!("\treturn {call}\n"));
        }
        out.push_str("}\n");
    }
}
