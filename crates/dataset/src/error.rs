use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the survey dataset. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("dataset file not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// Low-level IO failure while reading the file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Malformed CSV (unbalanced quotes, ragged rows, invalid UTF-8).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A required header is absent.
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    /// The Value cell is neither null nor a finite number.
    #[error("invalid Value {value:?} on line {line}")]
    InvalidValue { line: u64, value: String },
    /// The Survey Year cell could not be parsed as a date or a year.
    #[error("invalid Survey Year {value:?} on line {line}")]
    InvalidDate { line: u64, value: String },
}
