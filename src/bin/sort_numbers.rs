use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use book_api::tools::sort_file;

#[derive(Parser, Debug)]
#[command(name = "sort-numbers")]
#[command(about = "Sort a file of integers (one per line) in ascending order")]
struct Args {
    /// File to read, one integer per line
    input: PathBuf,

    /// File to write the sorted integers to
    output: PathBuf,
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
    let count = sort_file(&args.input, &args.output)?;

    println!(
        "Successfully sorted {count} numbers from {} to {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
