// Generated files must read back as Go declarations

use pretty_assertions::assert_eq;
use traceable_codegen::{Generator, OutputPackage, TracerBackend};
use traceable_parser::{parse_source_file, Declaration, TypeExpr};
use traceable_resolver::{MemoryLoader, Resolver};

const STORE: &str = r#"package store

import (
	"context"
	"io"
	"time"
)

type Key [16]byte

type Store interface {
	io.Closer
	Get(ctx context.Context, key Key) ([]byte, error)
	Put(ctx context.Context, key Key, value []byte, ttl time.Duration) error
	Watch(ctx context.Context, keys ...Key) (<-chan Key, func())
	Stats() map[string]int64
}
"#;

fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_file("context", "context.go", "package context\n\ntype Context interface{}\n")
        .with_file("io", "io.go", "package io\n\ntype Closer interface {\n\tClose() error\n}\n")
        .with_file("time", "time.go", "package time\n\ntype Duration int64\n")
        .with_file("example.com/store", "store.go", STORE)
}

#[test]
fn test_generated_file_parses_for_every_backend() {
    let loader = loader();
    let store = Resolver::new(&loader)
        .resolve_interface("example.com/store", "Store")
        .unwrap();

    for backend in TracerBackend::ALL {
        let mut generator = Generator::new(
            OutputPackage::new("storetrace", "example.com/store/storetrace"),
            backend,
        );
        generator.add_interface(store.clone()).unwrap();
        let source = String::from_utf8(generator.generate_all()).unwrap();

        let file = parse_source_file(&source).unwrap();
        assert_eq!(file.package.name, "storetrace");

        let paths: Vec<&str> = file.imports.iter().map(|spec| spec.path.as_str()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted, "{backend}: imports are sorted");
        assert!(paths.contains(&"example.com/store"));
        assert!(paths.contains(&"time"));
        assert!(!paths.contains(&"io"));

        let funcs: Vec<&str> = file
            .declarations
            .iter()
            .filter_map(|decl| match decl {
                Declaration::Func(func) => Some(func.name.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            funcs,
            vec!["NewTracedStore", "Close", "Get", "Put", "Watch", "Stats"],
            "{backend}"
        );

        let wrapper = file
            .type_specs()
            .find(|spec| spec.name.name == "TracedStore")
            .unwrap();
        assert!(matches!(&wrapper.ty, TypeExpr::Struct(fields) if fields.len() == 2));

        assert!(source.contains(
            "func (t *TracedStore) Watch(ctx context.Context, keys ...store.Key) (<-chan store.Key, func()) {\n"
        ));
        assert!(source.contains("t.next.Watch(ctx, keys...)"));
    }
}
