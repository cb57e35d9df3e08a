// Tests for tracing backend statements

use crate::*;
use pretty_assertions::assert_eq;

#[test]
fn test_opentracing_statements() {
    let backend = TracerBackend::OpenTracing;
    assert_eq!(
        backend.start_span("opentracing", "t.tracer", "Store.Get", SpanParent::Context("ctx")),
        "span, ctx := opentracing.StartSpanFromContextWithTracer(ctx, t.tracer, \"Store.Get\")"
    );
    assert_eq!(
        backend.start_span("opentracing", "t.tracer", "Store.Len", SpanParent::Root { background: None }),
        "span := t.tracer.StartSpan(\"Store.Len\")"
    );
    assert_eq!(backend.finish_span(), "defer span.Finish()");
    assert_eq!(backend.tracer_type().to_string(), "opentracing.Tracer");
}

#[test]
fn test_opentelemetry_statements() {
    let backend = TracerBackend::OpenTelemetry;
    assert_eq!(
        backend.start_span("trace", "t.tracer", "Store.Get", SpanParent::Context("a0")),
        "a0, span := t.tracer.Start(a0, \"Store.Get\")"
    );
    assert_eq!(
        backend.start_span(
            "trace",
            "t.tracer",
            "Store.Len",
            SpanParent::Root {
                background: Some("context1")
            }
        ),
        "_, span := t.tracer.Start(context1.Background(), \"Store.Len\")"
    );
    assert_eq!(
        backend.start_span("trace", "t.tracer_", "Iter.next", SpanParent::Context("ctx")),
        "ctx, span := t.tracer_.Start(ctx, \"Iter.next\")"
    );
    assert_eq!(backend.finish_span(), "defer span.End()");
    assert_eq!(backend.tracer_type().to_string(), "trace.Tracer");
}

#[test]
fn test_backend_names() {
    assert_eq!(TracerBackend::default(), TracerBackend::OpenTracing);
    for backend in TracerBackend::ALL {
        assert_eq!(backend.to_string().parse::<TracerBackend>(), Ok(backend));
    }
    assert!("zipkin".parse::<TracerBackend>().is_err());
}
