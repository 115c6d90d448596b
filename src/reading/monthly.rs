//! Monthly series text files and their parsing logic.
//!
//! A file opens with free-text header lines (title, update notice, column
//! header) followed by one row per year: the year, twelve monthly values and
//! optionally seasonal and annual columns, which are ignored. Missing months
//! are written as `---`.

use tracing::debug;

use super::Observation;

const MONTHS_PER_YEAR: usize = 12;
const COMMENT_MARKER: &str = "#";
const PROVISIONAL_MARKER: &str = "Provisional";

/// Tokens standing for a value that is not available.
const MISSING_VALUES: [&str; 4] = ["---", "na", "NA", ""];

/// Decodes a monthly series file into observations, in row then month order.
///
/// Malformed rows and unparseable values are dropped, never reported as
/// errors.
pub fn decode(content: &str) -> Vec<Observation> {
    let mut observations = Vec::new();
    let mut data_started = false;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !data_started {
            if line.starts_with(COMMENT_MARKER) || line.starts_with(PROVISIONAL_MARKER) {
                debug!(line = idx + 1, "skipping marker line");
                continue;
            }
            if !starts_with_year(line) {
                continue;
            }
            debug!(line = idx + 1, "found start of data");
            data_started = true;
        }

        match parse_year_row(line) {
            Some(row) => observations.extend(row),
            None => debug!(line = idx + 1, "discarding malformed row"),
        }
    }

    observations
}

fn starts_with_year(line: &str) -> bool {
    line.len() >= 4 && line.as_bytes()[..4].iter().all(u8::is_ascii_digit)
}

/// Parses a year row, or `None` if it is too short or the year is invalid.
fn parse_year_row(line: &str) -> Option<Vec<Observation>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MONTHS_PER_YEAR + 1 {
        return None;
    }

    let year: i32 = tokens[0].parse().ok()?;

    let observations = tokens[1..=MONTHS_PER_YEAR]
        .iter()
        .zip(1..)
        .filter_map(|(token, month)| {
            parse_monthly_value(token).map(|value| Observation::new(year, month, value))
        })
        .collect();

    Some(observations)
}

fn parse_monthly_value(token: &str) -> Option<f64> {
    if MISSING_VALUES.contains(&token) {
        return None;
    }

    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    const SAMPLE: &str = "\
Met Office HadUK-Grid Climate Series
UK Mean temperature (Degrees C)
Areal series, starting from 1884
Provisional data are shown for the latest months
Last updated 01-Mar-2024 09:45

year    jan    feb    mar    apr    may    jun    jul    aug    sep    oct    nov    dec     win     spr     sum     aut     ann
2022    4.5    5.3    6.5    8.3   11.9   14.1   16.6   16.9   13.6   12.0    8.4    2.9    4.56    8.88   15.87   11.33   10.07
2023    5.3    5.6    5.9    8.2   11.5   15.8   15.1   15.6   15.2   11.5    6.9    6.3    4.26    8.52   15.50   11.21    9.97
2024    5.3    7.3    ---    ---    ---    ---    ---    ---    ---    ---    ---    ---    5.85     ---     ---     ---     ---
";

    #[test]
    fn should_decode_published_file() {
        let observations = decode(SAMPLE);

        assert_eq!(observations.len(), 12 + 12 + 2);
        assert_eq!(observations[0], Observation::new(2022, 1, 4.5));
        assert_eq!(observations[11], Observation::new(2022, 12, 2.9));
        assert_eq!(observations[12], Observation::new(2023, 1, 5.3));
        assert_eq!(observations[25], Observation::new(2024, 2, 7.3));
    }

    #[test]
    fn should_decode_months_in_order() {
        let observations =
            decode("2023 5.2 6.1 7.0 8.5 11.2 14.0 16.1 15.9 13.4 10.8 7.7 5.1");

        let months: Vec<u32> = observations.iter().map(|o| o.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());
        assert_eq!(observations[0], Observation::new(2023, 1, 5.2));
        assert_eq!(observations[1], Observation::new(2023, 2, 6.1));
        assert_eq!(observations[2], Observation::new(2023, 3, 7.0));
        assert_eq!(observations[11], Observation::new(2023, 12, 5.1));
    }

    #[test]
    fn should_skip_missing_values() {
        let observations = decode("2023 --- 6.1 NA 7.0 8.0 9.0 10.0 11.0 12.0 13.0 na 15.0");

        let months: Vec<u32> = observations.iter().map(|o| o.month).collect();
        assert_eq!(months, vec![2, 4, 5, 6, 7, 8, 9, 10, 12]);
    }

    #[test]
    fn should_skip_unparseable_values() {
        let observations = decode("2023 1.0 x 3.0 4.0 5.0 6.0 7.0 8.0 9.0 10.0 11.0 nan");

        assert_eq!(observations.len(), 10);
        assert!(observations.iter().all(|o| o.month != 2 && o.month != 12));
    }

    #[test]
    fn should_skip_provisional_header() {
        let observations =
            decode("Provisional data\n2023 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0 9.0 10.0 11.0 12.0\n");

        assert_eq!(observations.len(), 12);
        assert!(observations.iter().all(|o| o.year == 2023));
    }

    #[test]
    fn should_skip_comment_lines() {
        let observations =
            decode("# 1999 comment\n  \n2023 1 2 3 4 5 6 7 8 9 10 11 12\n\n2024 1 2 3 4 5 6 7 8 9 10 11 12");

        assert_eq!(observations.len(), 24);
        assert_eq!(observations[12].year, 2024);
    }

    #[test]
    fn should_drop_short_rows() {
        let observations = decode("2023 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0 9.0");

        assert!(observations.is_empty());
    }

    #[test]
    fn should_drop_rows_with_invalid_year() {
        let content = "2023 1 2 3 4 5 6 7 8 9 10 11 12\n20x4 1 2 3 4 5 6 7 8 9 10 11 12";

        let observations = decode(content);

        assert_eq!(observations.len(), 12);
    }

    #[test]
    fn should_keep_duplicate_years() {
        let content = "2023 1 2 3 4 5 6 7 8 9 10 11 12\n2023 2 2 3 4 5 6 7 8 9 10 11 12";

        let observations = decode(content);

        assert_eq!(observations.len(), 24);
        assert_eq!(observations[0].value, 1.0);
        assert_eq!(observations[12].value, 2.0);
    }

    #[test]
    fn should_ignore_lines_before_data() {
        assert!(decode("year jan feb mar\nnot data at all").is_empty());
        assert!(!starts_with_year("202"));
        assert!(starts_with_year("19999"));
    }
}
