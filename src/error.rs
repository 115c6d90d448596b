//! Error types for the ingestion pipeline.

use thiserror::Error;

/// A remote resource could not be retrieved.
#[derive(Debug, Error)]
#[error("failed to fetch data from {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(url: &str, cause: impl ToString) -> Self {
        FetchError {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Structured tabular input that does not have the expected shape.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("empty tabular data provided")]
    Empty,

    #[error("tabular data must contain 'year', 'month' and 'value' columns")]
    MissingColumns,

    #[error("missing required field '{field}' on line {line}")]
    MissingField { line: u64, field: &'static str },

    #[error("invalid {field} '{value}' on line {line}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("no valid data rows found")]
    NoData,

    #[error("error parsing tabular data: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
