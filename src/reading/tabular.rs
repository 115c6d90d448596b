//! Comma-separated `year,month,value` files.
//!
//! Unlike the published text layout this one is strict: any malformed row
//! rejects the whole input.

use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::Observation;
use crate::error::FormatError;

pub fn decode(content: &str) -> Result<Vec<Observation>, FormatError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(FormatError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(year_idx), Some(month_idx), Some(value_idx)) =
        (column("year"), column("month"), column("value"))
    else {
        return Err(FormatError::MissingColumns);
    };

    let mut observations = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let year = parse_field(&record, year_idx, "year", line)?;
        let month = parse_field(&record, month_idx, "month", line)?;
        let value: f64 = parse_field(&record, value_idx, "value", line)?;
        if !value.is_finite() {
            return Err(FormatError::InvalidNumber {
                line,
                field: "value",
                value: value.to_string(),
            });
        }

        observations.push(Observation::new(year, month, value));
    }

    if observations.is_empty() {
        return Err(FormatError::NoData);
    }

    Ok(observations)
}

fn parse_field<T: FromStr>(
    record: &StringRecord,
    idx: usize,
    field: &'static str,
    line: u64,
) -> Result<T, FormatError> {
    let raw = match record.get(idx) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(FormatError::MissingField { line, field }),
    };

    raw.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        field,
        value: raw.to_string(),
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn should_decode_rows() {
        let content = "
        year,month,value
        2023,1,5.2
        2023,2,6.1
        ";

        let observations = decode(content).unwrap();

        assert_eq!(
            observations,
            vec![Observation::new(2023, 1, 5.2), Observation::new(2023, 2, 6.1)]
        );
    }

    #[test]
    fn should_accept_columns_in_any_order() {
        let observations = decode("value,year,month,source\n7.5,1990,6,hadukgrid").unwrap();

        assert_eq!(observations, vec![Observation::new(1990, 6, 7.5)]);
    }

    #[test]
    fn should_reject_missing_column() {
        let err = decode("year,value\n2023,5.2").unwrap_err();
        assert!(matches!(err, FormatError::MissingColumns));

        let err = decode("invalid,csv,data").unwrap_err();
        assert!(matches!(err, FormatError::MissingColumns));
    }

    #[test]
    fn should_reject_header_only() {
        let err = decode("year,month,value\n").unwrap_err();

        assert!(matches!(err, FormatError::NoData));
    }

    #[test]
    fn should_reject_empty_input() {
        assert!(matches!(decode("  \n ").unwrap_err(), FormatError::Empty));
    }

    #[test]
    fn should_reject_missing_field() {
        let err = decode("year,month,value\n2023,1,5.2\n2023,2").unwrap_err();

        match err {
            FormatError::MissingField { line, field } => {
                assert_eq!(line, 3);
                assert_eq!(field, "value");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn should_reject_non_numeric_field() {
        let err = decode("year,month,value\n2023,Jan,5.2").unwrap_err();

        assert!(matches!(
            err,
            FormatError::InvalidNumber { field: "month", .. }
        ));
    }

    #[test]
    fn should_reject_non_finite_value() {
        let err = decode("year,month,value\n2023,1,NaN").unwrap_err();

        assert!(matches!(err, FormatError::InvalidNumber { field: "value", .. }));
    }
}
