//! Row validation for delimited weather files.
//!
//! Row layout, no header:
//! `city_id,city_name,weather_id,weather_name,rainfall_probability`.
//! The weather id column is ignored. Invalid rows yield `None` so the caller
//! can count them and carry on.

use csv::{Reader, ReaderBuilder};

use crate::models::WeatherRecord;

pub const FIELD_COUNT: usize = 5;

/// Headerless reader that accepts rows of any length. Quoting follows the
/// usual CSV rules; blank lines are skipped.
pub fn row_reader(content: &[u8]) -> Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content)
}

/// Fields of the first row in `line`, empty when there is none
pub fn split_row(line: &str) -> Vec<String> {
    row_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Build a record from one row, or `None` when the row must be skipped
pub fn parse_row<S: AsRef<str>>(fields: &[S], timestamp: &str, ttl: i64) -> Option<WeatherRecord> {
    if fields.len() < FIELD_COUNT {
        return None;
    }

    let field = |index: usize| fields[index].as_ref().trim();

    let city_id: i64 = field(0).parse().ok()?;
    let city_name = field(1);
    let weather_name = field(3);
    let rainfall: i64 = field(4).parse().ok()?;

    if city_name.is_empty() || weather_name.is_empty() {
        return None;
    }
    if !(0..=100).contains(&rainfall) {
        return None;
    }

    Some(WeatherRecord {
        city_id,
        city_name: city_name.to_string(),
        weather_id: None,
        weather_name: weather_name.to_string(),
        rainfall_probability: u8::try_from(rainfall).ok()?,
        timestamp: timestamp.to_string(),
        ttl: Some(ttl),
    })
}

pub fn parse_line(line: &str, timestamp: &str, ttl: i64) -> Option<WeatherRecord> {
    parse_row(&split_row(line), timestamp, ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: &str = "2024-01-01T00:00:00";
    const E: i64 = 1_704_067_200;

    #[test]
    fn parses_valid_row() {
        let record = parse_row(&["1", "Sapporo", "1", "Clear", "10"], T, E).unwrap();
        assert_eq!(
            record,
            WeatherRecord {
                city_id: 1,
                city_name: "Sapporo".to_string(),
                weather_id: None,
                weather_name: "Clear".to_string(),
                rainfall_probability: 10,
                timestamp: T.to_string(),
                ttl: Some(E),
            }
        );
    }

    #[test]
    fn ignores_weather_id_column() {
        let a = parse_row(&["13", "Tokyo", "2", "Rain", "80"], T, E).unwrap();
        let b = parse_row(&["13", "Tokyo", "not-a-number", "Rain", "80"], T, E).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.weather_id, None);
    }

    #[test]
    fn skips_out_of_range_rainfall() {
        for value in ["150", "101", "-1", "-100"] {
            assert!(parse_row(&["1", "Sapporo", "1", "Clear", value], T, E).is_none(), "{}", value);
        }
        for value in ["0", "100"] {
            assert!(parse_row(&["1", "Sapporo", "1", "Clear", value], T, E).is_some(), "{}", value);
        }
    }

    #[test]
    fn skips_malformed_rows() {
        assert!(parse_row(&["1", "Sapporo", "1", "Clear"], T, E).is_none());
        assert!(parse_row::<&str>(&[], T, E).is_none());
        assert!(parse_row(&["x", "Sapporo", "1", "Clear", "10"], T, E).is_none());
        assert!(parse_row(&["1", "Sapporo", "1", "Clear", "ten"], T, E).is_none());
        assert!(parse_row(&["1", "  ", "1", "Clear", "10"], T, E).is_none());
        assert!(parse_row(&["1", "Sapporo", "1", "", "10"], T, E).is_none());
    }

    #[test]
    fn trims_fields_and_line_endings() {
        let record = parse_line(" 27 , Osaka ,3, Rain , 65 \r\n", T, E).unwrap();
        assert_eq!(record.city_id, 27);
        assert_eq!(record.city_name, "Osaka");
        assert_eq!(record.weather_name, "Rain");
        assert_eq!(record.rainfall_probability, 65);
    }

    #[test]
    fn extra_columns_are_tolerated() {
        assert!(parse_line("40,Hakata,1,Clear,5,extra", T, E).is_some());
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let record = parse_line("13,\"Tokyo, Central\",3,Rain,80", T, E).unwrap();
        assert_eq!(record.city_name, "Tokyo, Central");
        assert_eq!(record.rainfall_probability, 80);

        let record = parse_line("1,Sapporo,1,Clear,\"10\"", T, E).unwrap();
        assert_eq!(record.rainfall_probability, 10);
    }

    #[test]
    fn blank_lines_have_no_fields() {
        assert!(split_row("").is_empty());
        assert!(parse_line("", T, E).is_none());
    }
}
