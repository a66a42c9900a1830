use clap::{Parser, ValueEnum};
use flowgen::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// CLI-side mirror of `InitializerStyle` for clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InitializerCli {
    Factories,
    Injected,
}

impl From<InitializerCli> for InitializerStyle {
    fn from(value: InitializerCli) -> Self {
        match value {
            InitializerCli::Factories => InitializerStyle::Factories,
            InitializerCli::Injected => InitializerStyle::Injected,
        }
    }
}

/// Generates Go flow implementations and PlantUML diagrams from flow descriptions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow description JSON file
    flows_path: PathBuf,

    /// JSON file with generator options (codeFile, diagramDir, buildTag, initializer)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the generated Go file
    #[arg(long)]
    code_file: Option<String>,

    /// Directory for diagrams, relative to the package directory
    #[arg(long)]
    diagram_dir: Option<String>,

    /// Build tag that excludes the generated file from injector builds
    #[arg(long)]
    build_tag: Option<String>,

    /// How the generated initializers obtain step functions
    #[arg(long, value_enum)]
    initializer: Option<InitializerCli>,

    /// Pipe the generated Go file through gofmt
    #[arg(long)]
    gofmt: bool,

    /// Save all artifacts to a bundle file instead of writing them
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Only list the artifacts that would be written
    #[arg(long)]
    dry_run: bool,

    /// Log debug output (graphs and service bindings)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("flowgen=debug,info")
        } else {
            EnvFilter::new("flowgen=info,warn")
        }
    });
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(verbose))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every flow was generated.
fn run(cli: Cli) -> Result<bool> {
    let start = Instant::now();

    let mut options = match &cli.config {
        Some(path) => GeneratorOptions::from_file(path)?,
        None => GeneratorOptions::default(),
    };
    if let Some(code_file) = cli.code_file {
        options.code_file = code_file;
    }
    if let Some(dir) = cli.diagram_dir {
        options.diagram_dir = dir;
    }
    if let Some(tag) = cli.build_tag {
        options.build_tag = tag;
    }
    if let Some(style) = cli.initializer {
        options.initializer = style.into();
    }

    let unit = RawUnit::from_file(&cli.flows_path)?.into_unit()?;
    println!(
        "Compiling {} flow(s) of package '{}'...",
        unit.flows.len(),
        unit.package
    );

    let mut builder = Compiler::builder(unit).with_options(options);
    if cli.gofmt {
        builder = builder.with_formatter(Box::new(GofmtFormatter::default()));
    }
    let compiled = builder.build().compile()?;

    for rejection in &compiled.rejected {
        eprintln!("-> Skipped flow '{}': {}", rejection.flow, rejection);
    }

    if cli.dry_run {
        for artifact in &compiled.artifacts {
            println!("-> {} ({} bytes)", artifact.path().display(), artifact.content().len());
        }
    } else if let Some(path) = &cli.bundle {
        let count = compiled.artifacts.len();
        let complete = compiled.is_complete();
        compiled.into_bundle().save(path)?;
        println!("-> Saved {} artifact(s) to '{}'", count, path.display());
        println!("Done in {:?}", start.elapsed());
        return Ok(complete);
    } else {
        compiled.write(&FsWriter)?;
        for artifact in &compiled.artifacts {
            println!("-> Wrote {}", artifact.path().display());
        }
    }

    println!("Done in {:?}", start.elapsed());
    Ok(compiled.is_complete())
}
