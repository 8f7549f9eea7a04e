use anyhow::Context;
use tunable_cli::{CliOutcome, CommandLineInterceptor};
use tunable_core::{shared, Interceptor, ListSingleSelection, Schema, Tunable, TunableMeta};
use tunable_props::{PropertyFile, PropertyFormat, PropertyMap};

/// Layout parameters exposed by the demo
struct LayoutParams {
    iterations: i64,
    spring_length: f64,
    randomize: bool,
    title: String,
    algorithm: ListSingleSelection,
}

impl LayoutParams {
    fn new() -> anyhow::Result<Self> {
        let algorithm = ListSingleSelection::new(["force-directed", "circular", "grid"])?
            .with_selected("force-directed")?;
        Ok(Self {
            iterations: 500,
            spring_length: 80.0,
            randomize: false,
            title: "network".to_string(),
            algorithm,
        })
    }
}

impl Tunable for LayoutParams {
    fn declare(&self, schema: &mut Schema<Self>) {
        schema
            .integer(
                "iterations",
                TunableMeta::new("layout", "Number of iterations").with_group("Algorithm"),
                |p| p.iterations,
                |p, v| p.iterations = v,
            )
            .float(
                "springLength",
                TunableMeta::new("layout", "Spring rest length").with_group("Algorithm"),
                |p| p.spring_length,
                |p, v| p.spring_length = v,
            )
            .choice(
                "algorithm",
                TunableMeta::new("layout", "Layout algorithm").with_group("Algorithm"),
                |p| &p.algorithm,
                |p| &mut p.algorithm,
            )
            .boolean(
                "randomize",
                TunableMeta::new("layout", "Randomize initial positions"),
                |p| p.randomize,
                |p, v| p.randomize = v,
            )
            .text(
                "title",
                TunableMeta::new("layout", "Title shown above the network"),
                |p| p.title.clone(),
                |p, v| p.title = v,
            );
    }
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("TUNECTL_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    setup_tracing();

    let layout = shared(LayoutParams::new()?);
    let interceptor = Interceptor::new();
    interceptor.register(&layout)?;

    if let Some(path) = std::env::var_os("TUNECTL_PROPS") {
        let file = PropertyFile::open(&path)
            .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;
        let report = interceptor.load_all(&file);
        tracing::info!(
            path = %file.path().display(),
            applied = report.applied.len(),
            failed = report.failures.len(),
            "loaded property file"
        );
        for failure in &report.failures {
            eprintln!("warning: {}: {}", failure.key, failure.error);
        }
    }

    let cli = CommandLineInterceptor::new(&interceptor, "tunectl")
        .with_about("Show how command-line options and property files bind to layout parameters");

    match cli.apply(std::env::args_os().skip(1)) {
        CliOutcome::Exit(exit) => {
            exit.print();
            std::process::exit(exit.exit_code());
        }
        CliOutcome::Proceed(report) => {
            for failure in &report.failures {
                eprintln!("warning: {}: {}", failure.key, failure.error);
            }
        }
    }

    let mut current = PropertyMap::new();
    interceptor.store_all(&mut current)?;
    print!("{}", current.render(PropertyFormat::Properties)?);
    Ok(())
}
