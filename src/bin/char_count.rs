use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use book_api::tools::CharReport;

#[derive(Parser, Debug)]
#[command(name = "char-count")]
#[command(about = "Count letters and digits in a text file")]
struct Args {
    /// File to analyse
    file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Error opening file {}", args.file.display()))?;

    let report = CharReport::from_bytes(&bytes);
    println!("{report}");
    Ok(())
}
