//! Tracing library backends
//!
//! A backend decides which Go package provides the tracer, the type stored in
//! the wrapper and the two statements that open and close a span.

use std::fmt;
use std::str::FromStr;
use traceable_resolver::{PackageRef, TypeDescriptor};

pub const CONTEXT_PATH: &str = "context";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TracerBackend {
    /// `github.com/opentracing/opentracing-go`
    #[default]
    OpenTracing,
    /// `go.opentelemetry.io/otel/trace`
    OpenTelemetry,
}

/// How a span gets its parent
pub enum SpanParent<'a> {
    /// The name of the `context.Context` parameter
    Context(&'a str),
    /// No context parameter; `background` is the qualified `context` package
    /// when the backend needs one
    Root { background: Option<&'a str> },
}

impl TracerBackend {
    pub const ALL: [TracerBackend; 2] = [TracerBackend::OpenTracing, TracerBackend::OpenTelemetry];

    pub fn name(self) -> &'static str {
        match self {
            TracerBackend::OpenTracing => "opentracing",
            TracerBackend::OpenTelemetry => "opentelemetry",
        }
    }

    /// The package declaring the tracer type
    pub fn package(self) -> PackageRef {
        match self {
            TracerBackend::OpenTracing => {
                PackageRef::new("github.com/opentracing/opentracing-go", "opentracing")
            }
            TracerBackend::OpenTelemetry => PackageRef::new("go.opentelemetry.io/otel/trace", "trace"),
        }
    }

    pub fn tracer_type(self) -> TypeDescriptor {
        TypeDescriptor::qualified(self.package(), "Tracer")
    }

    /// Whether a method without a context parameter needs `context.Background()`
    pub fn needs_background_context(self) -> bool {
        matches!(self, TracerBackend::OpenTelemetry)
    }

    /// Statement opening the span named `span_name`.
    ///
    /// `package` is the alias the generated file uses for [`Self::package`]
    /// and `tracer` the expression holding the tracer (`t.tracer`).
    pub fn start_span(
        self,
        package: &str,
        tracer: &str,
        span_name: &str,
        parent: SpanParent<'_>,
    ) -> String {
        match (self, parent) {
            (TracerBackend::OpenTracing, SpanParent::Context(ctx)) => format!(
                "span, {ctx} := {package}.StartSpanFromContextWithTracer({ctx}, {tracer}, {span_name:?})"
            ),
            (TracerBackend::OpenTracing, SpanParent::Root { .. }) => {
                format!("span := {tracer}.StartSpan({span_name:?})")
            }
            (TracerBackend::OpenTelemetry, SpanParent::Context(ctx)) => {
                format!("{ctx}, span := {tracer}.Start({ctx}, {span_name:?})")
            }
            (TracerBackend::OpenTelemetry, SpanParent::Root { background }) => format!(
                "_, span := {tracer}.Start({}.Background(), {span_name:?})",
                background.unwrap_or(CONTEXT_PATH)
            ),
        }
    }

    pub fn finish_span(self) -> &'static str {
        match self {
            TracerBackend::OpenTracing => "defer span.Finish()",
            TracerBackend::OpenTelemetry => "defer span.End()",
        }
    }
}

impl fmt::Display for TracerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TracerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TracerBackend::ALL
            .into_iter()
            .find(|backend| backend.name() == s)
            .ok_or_else(|| format!("unknown tracer backend {s}"))
    }
}
