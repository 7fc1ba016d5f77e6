//! Write the OpenAPI document to stdout or a file
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!   cargo run --bin export_openapi -- --output docs/openapi.json

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use utoipa::OpenApi;

use attendance_ledger::gateway::openapi::ApiDoc;

#[derive(Parser, Debug)]
#[command(about = "Export the attendance ledger OpenAPI document")]
struct Args {
    /// Destination file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("OpenAPI document exported to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
