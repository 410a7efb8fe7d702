//! spec2tools - compile an OpenAPI/Swagger document into runnable
//! tool-server bundles.
//!
//! Reads a spec file (JSON or YAML), normalizes it, and writes one flat
//! text-archive bundle per target language (server source + dependency
//! manifest + usage guide).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use server_codegen::Bundle;
use spec_compiler::CodeTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    Node,
    Python,
    All,
}

/// Compile an OpenAPI/Swagger spec into tool-server bundles
#[derive(Parser, Debug)]
#[command(name = "spec2tools")]
#[command(version = "0.1.0")]
#[command(about = "Generate tool-calling server code from an OpenAPI/Swagger spec")]
struct Args {
    /// Path to the specification document (JSON or YAML)
    spec: PathBuf,

    /// Target language to emit
    #[arg(long, value_enum, default_value = "all")]
    target: TargetArg,

    /// Directory to write bundles into; prints to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let content = std::fs::read_to_string(&args.spec)
        .map_err(|e| format!("Failed to read {}: {}", args.spec.display(), e))?;

    let server = server_codegen::compile(&content)?;
    info!(
        "Compiled '{}': {} endpoints",
        server.name,
        server.endpoints.len()
    );

    let targets: Vec<CodeTarget> = match args.target {
        TargetArg::Node => vec![CodeTarget::Node],
        TargetArg::Python => vec![CodeTarget::Python],
        TargetArg::All => CodeTarget::all().to_vec(),
    };

    for target in targets {
        let bundle = Bundle::for_target(&server, target);
        let rendered = bundle.render();

        match &args.output {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}-{}.bundle.txt", server.id, target.as_str()));
                std::fs::write(&path, rendered)?;
                info!("Wrote {}", path.display());
            }
            None => {
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}
