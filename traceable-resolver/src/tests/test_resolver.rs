// Tests for interface resolution and embedding

use crate::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::BTreeMap;

const CONTEXT: &str = "package context\n\ntype Context interface {\n\tDone() <-chan struct{}\n\tErr() error\n}\n";

const IO: &str = r#"package io

type Reader interface {
	Read(p []byte) (n int, err error)
}

type Closer interface {
	Close() error
}

type ReadCloser interface {
	Reader
	Closer
}

const MaxName = 8
"#;

fn context() -> TypeDescriptor {
    TypeDescriptor::qualified(PackageRef::new("context", "context"), "Context")
}

fn loader_with(path: &str, source: &str) -> MemoryLoader {
    MemoryLoader::new()
        .with_file("context", "context.go", CONTEXT)
        .with_file("io", "io.go", IO)
        .with_file(path, "a.go", source)
}

fn method_names(iface: &Interface) -> Vec<&str> {
    iface.methods.names().collect()
}

#[test]
fn test_context_method_with_two_results() {
    let loader = loader_with(
        "example.com/shapes",
        r#"package shapes

import "context"

type Shape interface {
	Area(ctx context.Context) (float64, error)
}
"#,
    );
    let mut resolver = Resolver::new(&loader);
    let shape = resolver
        .resolve_interface("example.com/shapes", "Shape")
        .unwrap();

    assert_eq!(shape.name, "Shape");
    assert_eq!(shape.package, PackageRef::new("example.com/shapes", "shapes"));
    assert_eq!(method_names(&shape), vec!["Area"]);

    let area = shape.method("Area").unwrap();
    assert_eq!(area.params, vec![Parameter::named("ctx", context())]);
    assert_eq!(
        area.results,
        vec![
            Parameter::anonymous(TypeDescriptor::named("float64")),
            Parameter::anonymous(TypeDescriptor::named("error")),
        ]
    );
    assert_eq!(area.context_param(), Some(0));

    let imports: Vec<(&str, &str)> = shape
        .imports
        .iter()
        .map(|(path, alias)| (path.as_str(), alias.as_str()))
        .collect();
    assert_eq!(imports, vec![("context", "context")]);
}

#[test]
fn test_direct_method_beats_embedded_in_either_order() {
    let loader = loader_with(
        "example.com/store",
        r#"package store

type Base interface {
	Get() string
	Close() error
}

type EmbedFirst interface {
	Base
	Get() int
}

type DirectFirst interface {
	Get() int
	Base
}
"#,
    );
    let mut resolver = Resolver::new(&loader);
    let int_result = vec![Parameter::anonymous(TypeDescriptor::named("int"))];

    let embed_first = resolver
        .resolve_interface("example.com/store", "EmbedFirst")
        .unwrap();
    assert_eq!(method_names(&embed_first), vec!["Close", "Get"]);
    assert_eq!(embed_first.method("Get").unwrap().results, int_result);

    let direct_first = resolver
        .resolve_interface("example.com/store", "DirectFirst")
        .unwrap();
    assert_eq!(method_names(&direct_first), vec!["Get", "Close"]);
    assert_eq!(direct_first.method("Get").unwrap().results, int_result);
}

#[test]
fn test_first_embed_wins_between_embeds() {
    let loader = loader_with(
        "example.com/store",
        r#"package store

type Strings interface {
	Read() string
}

type Bytes interface {
	Read() []byte
	Len() int
}

type Both interface {
	Strings
	Bytes
}
"#,
    );
    let both = Resolver::new(&loader)
        .resolve_interface("example.com/store", "Both")
        .unwrap();

    assert_eq!(method_names(&both), vec!["Read", "Len"]);
    assert_eq!(
        both.method("Read").unwrap().results,
        vec![Parameter::anonymous(TypeDescriptor::named("string"))]
    );
}

#[test]
fn test_embeds_from_other_packages() {
    let loader = loader_with(
        "example.com/files",
        r#"package files

import (
	"context"
	"io"
)

type File interface {
	io.ReadCloser
	Close() error
	Stat(ctx context.Context) (Info, error)
}
"#,
    );
    let file = Resolver::new(&loader)
        .resolve_interface("example.com/files", "File")
        .unwrap();

    assert_eq!(method_names(&file), vec!["Read", "Close", "Stat"]);

    let read = file.method("Read").unwrap();
    assert_eq!(
        read.params,
        vec![Parameter::named(
            "p",
            TypeDescriptor::slice(TypeDescriptor::named("byte"))
        )]
    );
    assert_eq!(
        read.results,
        vec![
            Parameter::named("n", TypeDescriptor::named("int")),
            Parameter::named("err", TypeDescriptor::named("error")),
        ]
    );

    let stat = file.method("Stat").unwrap();
    assert_eq!(
        stat.results[0].ty,
        TypeDescriptor::qualified(PackageRef::new("example.com/files", "files"), "Info")
    );
}

#[test]
fn test_local_signature_kept_over_foreign_overlap() {
    let loader = loader_with(
        "example.com/files",
        r#"package files

import "io"

type Handle interface {
	Close() (int, error)
	io.Closer
}
"#,
    );
    let handle = Resolver::new(&loader)
        .resolve_interface("example.com/files", "Handle")
        .unwrap();

    assert_eq!(handle.methods.len(), 1);
    assert_eq!(handle.method("Close").unwrap().results.len(), 2);
}

#[test]
fn test_embed_cycle_is_reported() {
    let loader = loader_with(
        "example.com/loop",
        "package loop\n\ntype A interface {\n\tB\n\tFoo()\n}\n\ntype B interface {\n\tA\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/loop", "A")
        .unwrap_err();

    match err {
        ResolveError::CyclicEmbed { chain } => assert_eq!(
            chain,
            vec![
                "example.com/loop.A".to_string(),
                "example.com/loop.B".to_string(),
                "example.com/loop.A".to_string(),
            ]
        ),
        other => panic!("Expected cyclic embed, got {other:?}"),
    }
}

#[test]
fn test_alias_declaration_is_followed() {
    let loader = loader_with(
        "example.com/app",
        "package app\n\nimport \"io\"\n\ntype R = io.Reader\n\ntype Local Closer\n\ntype Closer interface {\n\tClose() error\n}\n",
    );
    let mut resolver = Resolver::new(&loader);

    let reader = resolver.resolve_interface("example.com/app", "R").unwrap();
    assert_eq!(reader.name, "R");
    assert_eq!(reader.package, PackageRef::new("example.com/app", "app"));
    assert_eq!(method_names(&reader), vec!["Read"]);

    let local = resolver
        .resolve_interface("example.com/app", "Local")
        .unwrap();
    assert_eq!(method_names(&local), vec!["Close"]);
}

#[test]
fn test_builtin_error_embed() {
    let loader = loader_with(
        "example.com/errs",
        "package errs\n\ntype Coded interface {\n\terror\n\tCode() int\n}\n",
    );
    let coded = Resolver::new(&loader)
        .resolve_interface("example.com/errs", "Coded")
        .unwrap();

    assert_eq!(method_names(&coded), vec!["Error", "Code"]);
    assert_eq!(
        coded.method("Error").unwrap().results,
        vec![Parameter::anonymous(TypeDescriptor::named("string"))]
    );
}

#[test]
fn test_any_is_not_an_embeddable_interface() {
    let loader = loader_with(
        "example.com/errs",
        "package errs\n\ntype Coded interface {\n\tany\n\tCode() int\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/errs", "Coded")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnknownEmbed { name, interface } if name == "any" && interface == "Coded"),
        "got {err:?}"
    );
}

#[test]
fn test_inline_interface_members_are_rejected() {
    for body in ["\tinterface {\n\t\tPing()\n\t}\n\tPong()\n", "\tinterface{}\n\tPong()\n"] {
        let source = format!("package anon\n\ntype Flat interface {{\n{body}}}\n");
        let loader = loader_with("example.com/anon", &source);
        let err = Resolver::new(&loader)
            .resolve_interface("example.com/anon", "Flat")
            .unwrap_err();
        assert!(
            matches!(&err, ResolveError::UnsupportedMember { member, interface } if member == "interface" && interface == "Flat"),
            "{body:?}: got {err:?}"
        );
    }
}

#[test]
fn test_unknown_embed() {
    let loader = loader_with(
        "example.com/bad",
        "package bad\n\ntype Broken interface {\n\tMissing\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/bad", "Broken")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnknownEmbed { name, interface } if name == "Missing" && interface == "Broken"),
        "got {err:?}"
    );
}

#[test]
fn test_unknown_embed_in_other_package() {
    let loader = loader_with(
        "example.com/bad",
        "package bad\n\nimport \"io\"\n\ntype Broken interface {\n\tio.Seeker\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/bad", "Broken")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnknownEmbed { name, .. } if name == "io.Seeker"),
        "got {err:?}"
    );
}

#[test]
fn test_unknown_package_alias() {
    let loader = loader_with(
        "example.com/bad",
        "package bad\n\ntype Broken interface {\n\tRun(ctx context.Context) error\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/bad", "Broken")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnknownPackage { alias, file } if alias == "context" && file == "a.go"),
        "got {err:?}"
    );
}

#[test]
fn test_missing_import_fails_to_load() {
    let loader = loader_with(
        "example.com/bad",
        "package bad\n\nimport \"example.com/gone\"\n\ntype Broken interface {\n\tgone.Thing\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/bad", "Broken")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::Load { paths } if paths == &vec!["example.com/gone".to_string()]),
        "got {err:?}"
    );
}

#[test]
fn test_generic_interface_is_unsupported() {
    let loader = loader_with(
        "example.com/gen",
        "package gen\n\ntype Box[T any] interface {\n\tGet() T\n}\n",
    );
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/gen", "Box")
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedType { .. }), "got {err:?}");
}

#[test]
fn test_struct_is_not_an_interface() {
    let loader = loader_with(
        "example.com/data",
        "package data\n\ntype Point struct {\n\tX int\n}\n\ntype Uses interface {\n\tPoint\n}\n",
    );
    let mut resolver = Resolver::new(&loader);

    let err = resolver
        .resolve_interface("example.com/data", "Point")
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotAnInterface { .. }), "got {err:?}");

    let err = resolver
        .resolve_interface("example.com/data", "Uses")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnsupportedMember { interface, .. } if interface == "Uses"),
        "got {err:?}"
    );
}

#[test]
fn test_type_union_is_unsupported() {
    let loader = loader_with(
        "example.com/num",
        "package num\n\ntype Number interface {\n\t~int | ~float64\n}\n\ntype Exact interface {\n\t~int\n}\n\ntype Cmp interface {\n\tcomparable\n}\n",
    );
    let mut resolver = Resolver::new(&loader);

    for name in ["Number", "Exact", "Cmp"] {
        let err = resolver
            .resolve_interface("example.com/num", name)
            .unwrap_err();
        assert!(
            matches!(&err, ResolveError::UnsupportedMember { interface, .. } if interface == name),
            "{name}: got {err:?}"
        );
    }
}

#[test]
fn test_unknown_interface() {
    let loader = loader_with("example.com/empty", "package empty\n");
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/empty", "Nope")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnknownInterface { name, package } if name == "Nope" && package == "example.com/empty"),
        "got {err:?}"
    );
}

#[test]
fn test_resolve_package_keeps_declaration_order() {
    let loader = MemoryLoader::new()
        .with_file("example.com/multi", "b.go", "package multi\n\ntype Zeta interface {\n\tZ()\n}\n")
        .with_file(
            "example.com/multi",
            "a.go",
            "package multi\n\ntype Alpha interface {\n\tA()\n}\n\ntype Box[T any] interface {\n\tGet() T\n}\n\ntype Point struct{}\n",
        );
    let package = Resolver::new(&loader)
        .resolve_package("example.com/multi")
        .unwrap();

    assert_eq!(package.name, "multi");
    let names: Vec<&str> = package
        .interfaces
        .iter()
        .map(|iface| iface.name.as_str())
        .collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
    assert!(package.interface("Alpha").is_some());
}

#[test]
fn test_added_package_resolves_without_loader() {
    let loader = MemoryLoader::new();
    let mut resolver = Resolver::new(&loader);
    resolver
        .add_package(LoadedPackage {
            import_path: "example.com/dir".to_string(),
            name: "dir".to_string(),
            units: vec![SourceUnit::new(
                "dir.go",
                "package dir\n\ntype Pinger interface {\n\tPing() bool\n}\n",
            )],
        })
        .unwrap();

    let pinger = resolver
        .resolve_interface("example.com/dir", "Pinger")
        .unwrap();
    assert_eq!(method_names(&pinger), vec!["Ping"]);
}

#[test]
fn test_parse_errors_name_the_file() {
    let loader = loader_with("example.com/broken", "package broken\n\ntype X interface {\n");
    let err = Resolver::new(&loader)
        .resolve_interface("example.com/broken", "X")
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::Parse { file, .. } if file == "a.go"),
        "got {err:?}"
    );
}

struct CountingLoader {
    inner: MemoryLoader,
    loads: RefCell<BTreeMap<String, usize>>,
}

impl PackageLoader for CountingLoader {
    fn locate(&self, path: &str) -> Option<PackageInfo> {
        self.inner.locate(path)
    }

    fn load(&self, path: &str) -> ResolveResult<Option<LoadedPackage>> {
        *self.loads.borrow_mut().entry(path.to_string()).or_default() += 1;
        self.inner.load(path)
    }
}

#[test]
fn test_each_package_loads_once() {
    let loader = CountingLoader {
        inner: loader_with(
            "example.com/svc",
            r#"package svc

import "io"

type A interface {
	io.Reader
}

type B interface {
	io.ReadCloser
	A
}
"#,
        ),
        loads: RefCell::new(BTreeMap::new()),
    };

    let mut resolver = Resolver::new(&loader);
    resolver.resolve_interface("example.com/svc", "A").unwrap();
    let b = resolver.resolve_interface("example.com/svc", "B").unwrap();
    assert_eq!(method_names(&b), vec!["Read", "Close"]);

    let loads = loader.loads.borrow();
    assert_eq!(loads.get("example.com/svc"), Some(&1));
    assert_eq!(loads.get("io"), Some(&1));
}
