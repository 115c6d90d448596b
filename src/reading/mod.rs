//! Decoding of published series into typed observations.

pub mod monthly;
pub mod tabular;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::FormatError;

/// One monthly value, before it is tied to a region and parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

/// First year the store accepts.
pub const MIN_YEAR: i32 = 1900;
/// Last year the store accepts.
pub const MAX_YEAR: i32 = 2030;

impl Observation {
    pub fn new(year: i32, month: u32, value: f64) -> Self {
        Observation { year, month, value }
    }

    /// Whether the observation falls inside the period the store accepts.
    pub fn is_valid(&self) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&self.year) && (1..=12).contains(&self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
/// Layout of a series file.
pub enum Format {
    /// Whitespace-delimited year rows with twelve monthly columns.
    #[default]
    Text,
    /// Comma-separated `year,month,value` rows with a header.
    Csv,
}

/// Decodes `content` according to `format`.
///
/// The text layout is tolerant and never fails; the tabular layout is strict.
pub fn decode(content: &str, format: Format) -> Result<Vec<Observation>, FormatError> {
    match format {
        Format::Text => Ok(monthly::decode(content)),
        Format::Csv => tabular::decode(content),
    }
}

// -- Tests -------------------------------------------------------------------
