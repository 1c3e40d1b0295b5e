use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yamlschema::{load_str, CodeGenerator, Errata, Severity};

/// Generate a C++ validator class from a YAML or JSON schema file.
#[derive(Debug, Parser)]
#[command(name = "yamlschema", version, about)]
struct Args {
    /// Path to the schema file.
    schema: Option<PathBuf>,

    /// Header output path. Defaults to the source path with an `.h`
    /// extension, then `<class>.h`.
    #[arg(long)]
    hdr: Option<PathBuf>,

    /// Source output path. Defaults to the header path with a `.cc`
    /// extension, then `<class>.cc`.
    #[arg(long)]
    src: Option<PathBuf>,

    /// Name of the generated class.
    #[arg(long, default_value = "Schema")]
    class: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut notes = Errata::new();

    let Some(schema_path) = args.schema else {
        notes.error("An input schema file is required");
        return Ok(report(&notes));
    };

    let hdr_path = args.hdr.unwrap_or_else(|| match &args.src {
        Some(src) => src.with_extension("h"),
        None => PathBuf::from(format!("{}.h", args.class)),
    });
    let src_path = args
        .src
        .unwrap_or_else(|| hdr_path.with_extension("cc"));

    let content = fs::read_to_string(&schema_path)
        .with_context(|| format!("Failed to read schema file '{}'", schema_path.display()))?;
    notes.info(format!(
        "Loaded schema file '{}' - {} bytes",
        schema_path.display(),
        content.len()
    ));
    tracing::debug!(
        schema = %schema_path.display(),
        bytes = content.len(),
        "schema loaded"
    );

    let root = match load_str(&content) {
        Ok(root) => root,
        Err(err) => {
            notes.error(err.to_string());
            return Ok(report(&notes));
        }
    };

    let generator = CodeGenerator::new(&root, args.class.as_str(), hdr_path.display().to_string());
    let (artifact, errata) = generator.run().into_parts();
    notes.note(errata);

    if let Some(artifact) = artifact {
        fs::write(&hdr_path, &artifact.header)
            .with_context(|| format!("Failed to write header output file '{}'", hdr_path.display()))?;
        fs::write(&src_path, &artifact.source)
            .with_context(|| format!("Failed to write source output file '{}'", src_path.display()))?;
        tracing::info!(
            hdr = %hdr_path.display(),
            src = %src_path.display(),
            class = %args.class,
            "validator generated"
        );
    }

    Ok(report(&notes))
}

/// Prints every accumulated note in order; the exit code reflects the
/// overall severity.
fn report(notes: &Errata) -> ExitCode {
    for note in notes.iter() {
        println!("{}", note.text());
    }
    if notes.severity() >= Severity::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
