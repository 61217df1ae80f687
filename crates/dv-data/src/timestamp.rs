//! Timestamp parsing for time filters

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use dv_core::{Field, Value};

use crate::{DataContainer, DataError};

/// Patterns tried, in order, when a field has no explicit format
const DEFAULT_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
];

/// Parse a timestamp string to milliseconds since epoch (UTC).
///
/// `format` follows chrono syntax, with two shorthands: `x` for epoch
/// milliseconds and `X` for epoch seconds.
pub fn parse_timestamp_ms(text: &str, format: Option<&str>) -> Result<f64, DataError> {
    let text = text.trim();
    let failed = || DataError::Timestamp(text.to_string());

    match format {
        Some("x") => text.parse::<f64>().map_err(|_| failed()),
        Some("X") => text.parse::<f64>().map(|s| s * 1000.0).map_err(|_| failed()),
        Some(format) => NaiveDateTime::parse_from_str(text, format)
            .map(|dt| dt.and_utc().timestamp_millis() as f64)
            .or_else(|_| {
                DateTime::parse_from_str(text, format).map(|dt| dt.timestamp_millis() as f64)
            })
            .or_else(|_| {
                NaiveDate::parse_from_str(text, format)
                    .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis() as f64)
            })
            .map_err(|_| failed()),
        None => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.timestamp_millis() as f64);
            }
            if let Some(dt) = DEFAULT_PATTERNS
                .iter()
                .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
            {
                return Ok(dt.and_utc().timestamp_millis() as f64);
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis() as f64)
                .map_err(|_| failed())
        }
    }
}

/// Milliseconds since epoch of a cell; numbers are taken as milliseconds
pub fn cell_to_timestamp_ms(value: &Value, format: Option<&str>) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => match format {
            Some("X") => Some(n * 1000.0),
            _ => Some(*n),
        },
        Value::String(s) => parse_timestamp_ms(s, format).ok(),
        _ => None,
    }
}

/// Per-row timestamp accessor for a field; unparseable rows map to NaN
pub fn timestamp_accessor<'a>(
    container: &'a dyn DataContainer,
    field: &'a Field,
) -> impl Fn(usize) -> f64 + 'a {
    move |row| {
        let value = field.resolve(container.value_at(row, field.field_idx));
        cell_to_timestamp_ms(&value, field.format.as_deref()).unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_data_container;
    use dv_core::FieldType;

    #[test]
    fn test_default_patterns() {
        assert_eq!(
            parse_timestamp_ms("2016-10-01 09:45:39", None).unwrap(),
            1475315139000.0
        );
        assert_eq!(
            parse_timestamp_ms("2016-10-01 09:45:39.001", None).unwrap(),
            1475315139001.0
        );
        assert_eq!(
            parse_timestamp_ms("2016-10-01T09:45:39Z", None).unwrap(),
            1475315139000.0
        );
        assert_eq!(parse_timestamp_ms("2016-10-01", None).unwrap(), 1475280000000.0);
        assert!(parse_timestamp_ms("yesterday", None).is_err());
    }

    #[test]
    fn test_explicit_formats() {
        assert_eq!(parse_timestamp_ms("1475315139", Some("X")).unwrap(), 1475315139000.0);
        assert_eq!(parse_timestamp_ms("1475315139001", Some("x")).unwrap(), 1475315139001.0);
        assert_eq!(
            parse_timestamp_ms("01.10.2016 09:45", Some("%d.%m.%Y %H:%M")).unwrap(),
            1475315100000.0
        );
    }

    #[test]
    fn test_accessor_maps_bad_rows_to_nan() {
        let container = create_data_container(vec![
            vec![Value::from("2016-10-01 09:45:39")],
            vec![Value::from("garbage")],
            vec![Value::Number(5.0)],
        ]);
        let field = Field::new("time", FieldType::Timestamp, 0);
        let accessor = timestamp_accessor(&container, &field);

        assert_eq!(accessor(0), 1475315139000.0);
        assert!(accessor(1).is_nan());
        assert_eq!(accessor(2), 5.0);
    }
}
