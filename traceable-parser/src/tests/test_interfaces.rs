// Tests for interface type declarations

use crate::*;
use pretty_assertions::assert_eq;

const STORE: &str = r#"package store

import "context"

// Reader reads.
type Reader interface {
	// Get fetches a value.
	Get(ctx context.Context, key string) ([]byte, error)
	List(prefix string, opts ...Option) []string
}

type ReadWriter interface {
	Reader
	io.Closer

	Put(
		key string,
		value []byte,
	) error
}

type Number interface {
	~int | ~float64
}

type Getter[T any] interface{ Get() T }
"#;

fn method_names(elems: &[InterfaceElem]) -> Vec<&str> {
    elems
        .iter()
        .filter_map(|elem| match elem {
            InterfaceElem::Method { name, .. } => Some(name.name.as_str()),
            InterfaceElem::Embed { .. } => None,
        })
        .collect()
}

#[test]
fn test_interfaces_in_source_order() {
    let file = parse_source_file(STORE).unwrap();
    let names: Vec<&str> = file
        .interfaces()
        .map(|(name, _)| name.name.as_str())
        .collect();
    assert_eq!(names, vec!["Reader", "ReadWriter", "Number", "Getter"]);
}

#[test]
fn test_method_signatures() {
    let file = parse_source_file(STORE).unwrap();
    let (_, reader) = file.interfaces().next().unwrap();
    assert_eq!(method_names(reader), vec!["Get", "List"]);

    let InterfaceElem::Method { signature, .. } = &reader[0] else {
        panic!("Expected method");
    };
    assert_eq!(signature.params.len(), 2);
    assert_eq!(signature.params[0].names[0].name, "ctx");
    assert_eq!(
        signature.params[0].ty,
        TypeExpr::qualified("context", "Context")
    );
    assert_eq!(
        signature.results[0].ty,
        TypeExpr::Slice(Box::new(TypeExpr::named("byte")))
    );

    let InterfaceElem::Method { signature, .. } = &reader[1] else {
        panic!("Expected method");
    };
    assert_eq!(
        signature.params[1].ty,
        TypeExpr::Ellipsis(Box::new(TypeExpr::named("Option")))
    );
    assert_eq!(signature.results.len(), 1);
}

#[test]
fn test_embedded_interfaces_and_multiline_params() {
    let file = parse_source_file(STORE).unwrap();
    let (_, read_writer) = file.interfaces().nth(1).unwrap();
    assert_eq!(read_writer.len(), 3);

    let embedded: Vec<&TypeExpr> = read_writer
        .iter()
        .filter_map(|elem| match elem {
            InterfaceElem::Embed { terms, .. } => Some(&terms[0].ty),
            InterfaceElem::Method { .. } => None,
        })
        .collect();
    assert_eq!(
        embedded,
        vec![
            &TypeExpr::named("Reader"),
            &TypeExpr::qualified("io", "Closer")
        ]
    );

    let InterfaceElem::Method { name, signature, .. } = &read_writer[2] else {
        panic!("Expected method");
    };
    assert_eq!(name.name, "Put");
    assert_eq!(signature.params.len(), 2);
    assert_eq!(signature.results[0].ty, TypeExpr::named("error"));
}

#[test]
fn test_type_union_constraint() {
    let file = parse_source_file(STORE).unwrap();
    let (_, number) = file.interfaces().nth(2).unwrap();

    let InterfaceElem::Embed { terms, .. } = &number[0] else {
        panic!("Expected type union");
    };
    assert_eq!(terms.len(), 2);
    assert!(terms.iter().all(|term| term.tilde));
    assert_eq!(terms[1].ty, TypeExpr::named("float64"));
}

#[test]
fn test_generic_interface_keeps_type_params() {
    let file = parse_source_file(STORE).unwrap();
    let getter = file
        .type_specs()
        .find(|spec| spec.name.name == "Getter")
        .unwrap();

    assert_eq!(getter.type_params.len(), 1);
    let TypeExpr::Interface(elems) = &getter.ty else {
        panic!("Expected interface");
    };
    assert_eq!(method_names(elems), vec!["Get"]);
}

#[test]
fn test_exported_names() {
    assert!(is_exported("Reader"));
    assert!(!is_exported("reader"));
    assert!(!is_exported("_Reader"));
    assert!(!is_exported(""));
}
