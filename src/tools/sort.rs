use std::io::Write;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("Invalid number '{value}' on line {line}: {source}")]
    InvalidNumber {
        line: usize,
        value: String,
        source: ParseIntError,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One integer per line. Blank lines are skipped and surrounding whitespace
/// is ignored; line numbers in errors are 1-based.
pub fn parse_numbers(text: &str) -> Result<Vec<i64>, SortError> {
    let mut numbers = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        let number = value.parse().map_err(|source| SortError::InvalidNumber {
            line: index + 1,
            value: value.to_string(),
            source,
        })?;
        numbers.push(number);
    }
    Ok(numbers)
}

pub fn write_numbers<W: Write>(mut writer: W, numbers: &[i64]) -> std::io::Result<()> {
    for number in numbers {
        writeln!(writer, "{number}")?;
    }
    writer.flush()
}

/// Sort the integers of `input` into `output`; returns how many were written.
pub fn sort_file(input: &Path, output: &Path) -> Result<usize, SortError> {
    let text = std::fs::read_to_string(input).map_err(|source| SortError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let mut numbers = parse_numbers(&text)?;
    numbers.sort_unstable();

    let write_err = |source| SortError::Write {
        path: output.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(output).map_err(write_err)?;
    write_numbers(std::io::BufWriter::new(file), &numbers).map_err(write_err)?;

    tracing::debug!(count = numbers.len(), "Sorted numbers");
    Ok(numbers.len())
}
