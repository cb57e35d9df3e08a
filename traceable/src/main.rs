use clap::{Parser, ValueEnum};
use miette::{MietteHandlerOpts, Report};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use traceable_codegen::{Generator, TracerBackend};
use traceable_resolver::{GoLoader, Resolver};

mod error;
mod output;
mod targets;

use error::CliResult;
use targets::parse_targets;

#[derive(Parser, Debug)]
#[command(
    name = "traceable",
    version,
    about = "Generate traced wrappers for Go interfaces",
    long_about = "Reads Go interface declarations and writes a Traced<Name> type per interface that opens a span around every call before delegating to the wrapped implementation."
)]
struct Cli {
    /// Interfaces to wrap, comma separated: `Name` or `import/path.Name`
    #[arg(short, long, env = "TRACEABLE_TYPES", value_delimiter = ',', required = true)]
    types: Vec<String>,

    /// File to write; stdout when omitted
    #[arg(short, long, env = "TRACEABLE_OUTPUT", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Package name for the generated file
    #[arg(short, long)]
    package: Option<String>,

    /// Tracing library the generated code calls
    #[arg(long, value_enum, env = "TRACEABLE_TRACER", default_value_t = Tracer::Opentracing)]
    tracer: Tracer,

    /// Debug logging and full error reports
    #[arg(short, long)]
    verbose: bool,

    /// Package directories; bare type names resolve in the first one
    #[arg(value_name = "DIR", default_value = ".")]
    dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tracer {
    Opentracing,
    Opentelemetry,
}

impl From<Tracer> for TracerBackend {
    fn from(tracer: Tracer) -> Self {
        match tracer {
            Tracer::Opentracing => TracerBackend::OpenTracing,
            Tracer::Opentelemetry => TracerBackend::OpenTelemetry,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    setup_miette_handler();

    if let Err(error) = run(&cli) {
        if cli.verbose {
            eprintln!("{:?}", Report::new(error));
        } else {
            eprintln!("traceable: {error}");
        }
        process::exit(1);
    }
}

/// Logs go to stderr so generated code on stdout stays clean
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

fn run(cli: &Cli) -> CliResult<()> {
    let targets = parse_targets(&cli.types)?;

    let first_dir = cli.dirs.first().cloned().unwrap_or_else(|| PathBuf::from("."));
    let loader = GoLoader::discover(&first_dir)?;
    let mut resolver = Resolver::new(&loader);

    let mut primary = None;
    for dir in &cli.dirs {
        let namespace = resolver.add_package(loader.load_dir(dir)?)?;
        debug!(dir = %dir.display(), path = %namespace.path, "loaded directory");
        primary.get_or_insert_with(|| namespace.path.clone());
    }
    let primary = match primary {
        Some(path) => path,
        None => resolver.add_package(loader.load_dir(&first_dir)?)?.path.clone(),
    };

    let mut interfaces = Vec::with_capacity(targets.len());
    for target in &targets {
        let path = target.package.as_deref().unwrap_or(&primary);
        interfaces.push(resolver.resolve_interface(path, &target.name)?);
    }

    let first_target = interfaces[0].package.clone();
    let package = output::output_package(
        &loader,
        cli.output.as_deref(),
        cli.package.as_deref(),
        &first_target,
    );

    let mut generator = Generator::new(package, cli.tracer.into());
    for interface in interfaces {
        generator.add_interface(interface)?;
    }

    output::write_output(cli.output.as_deref(), &generator.generate_all())
}
