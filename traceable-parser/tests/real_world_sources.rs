// Parse realistic Go files end to end

use traceable_parser::*;

const SERVICE: &str = r#"// Copyright 2024 The Authors.

package service

import (
	"context"
	"errors"
	"fmt"
	"net/http"
	"sync"
	"time"

	"github.com/acme/geo/v2/shape"
)

// ErrNotFound is returned when nothing matches.
var ErrNotFound = errors.New("not found")

const (
	defaultTimeout = 5 * time.Second
	bufferSize     = 1 << 10
)

type Service interface {
	shape.Measurer

	Area(ctx context.Context) (float64, error)
	Subscribe(ctx context.Context, topics ...string) (<-chan Event, error)
	Handler() http.Handler
	Stats() map[string][2]int64
}

type Event struct {
	ID      string    `json:"id"`
	At      time.Time `json:"at"`
	Payload []byte
}

type server struct {
	mu     sync.RWMutex
	events map[string][]Event
	done   chan struct{}
}

func New() *server {
	return &server{events: make(map[string][]Event), done: make(chan struct{})}
}

func (s *server) Area(ctx context.Context) (float64, error) {
	select {
	case <-ctx.Done():
		return 0, ctx.Err()
	default:
	}
	return 3.14, nil
}

func (s *server) Handler() http.Handler {
	return http.HandlerFunc(func(w http.ResponseWriter, r *http.Request) {
		fmt.Fprintf(w, "{\"ok\": %v}\n", true)
	})
}

func (s *server) Stats() map[string][2]int64 {
	s.mu.RLock()
	defer s.mu.RUnlock()
	out := map[string][2]int64{}
	for k, v := range s.events {
		out[k] = [2]int64{int64(len(v)), 0}
	}
	return out
}
"#;

#[test]
fn test_service_file_parses() {
    let file = parse_source_file_with_name(SERVICE, Some("service.go".to_string())).unwrap();

    assert_eq!(file.package.name, "service");
    assert_eq!(file.imports.len(), 7);
    assert_eq!(file.imports[6].path, "github.com/acme/geo/v2/shape");
    assert_eq!(file.source_name.as_deref(), Some("service.go"));
}

#[test]
fn test_service_interface_shape() {
    let file = parse_source_file(SERVICE).unwrap();
    let (name, elems) = file.interfaces().next().unwrap();

    assert_eq!(name.name, "Service");
    assert_eq!(elems.len(), 5);
    assert!(matches!(elems[0], InterfaceElem::Embed { .. }));

    let InterfaceElem::Method { signature, .. } = &elems[2] else {
        panic!("Expected Subscribe");
    };
    assert_eq!(
        signature.results[0].ty,
        TypeExpr::Chan {
            direction: ChanDir::Recv,
            element: Box::new(TypeExpr::named("Event")),
        }
    );

    let InterfaceElem::Method { signature, .. } = &elems[4] else {
        panic!("Expected Stats");
    };
    assert_eq!(
        signature.results[0].ty,
        TypeExpr::Map {
            key: Box::new(TypeExpr::named("string")),
            value: Box::new(TypeExpr::Array {
                length: ArrayLength::Literal(2),
                element: Box::new(TypeExpr::named("int64")),
            }),
        }
    );
}

#[test]
fn test_service_declaration_counts() {
    let file = parse_source_file(SERVICE).unwrap();

    let funcs = file
        .declarations
        .iter()
        .filter(|decl| matches!(decl, Declaration::Func(_)))
        .count();
    assert_eq!(funcs, 4);
    assert_eq!(file.type_specs().count(), 3);
    assert_eq!(file.const_specs().count(), 2);
}

#[test]
fn test_struct_with_anonymous_struct_channel() {
    let file = parse_source_file(SERVICE).unwrap();
    let server = file
        .type_specs()
        .find(|spec| spec.name.name == "server")
        .unwrap();

    let TypeExpr::Struct(fields) = &server.ty else {
        panic!("Expected struct");
    };
    assert_eq!(
        fields[2].ty,
        TypeExpr::Chan {
            direction: ChanDir::Both,
            element: Box::new(TypeExpr::Struct(vec![])),
        }
    );
}
