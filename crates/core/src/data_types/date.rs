use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::{DataTypeError, Result};

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Parses a date from a UNIX timestamp or a date string.
///
/// A zero timestamp and empty values yield `None`. Dates without an
/// offset are read as UTC.
pub fn parse_date(value: &Value) -> Result<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => from_timestamp(n.as_i64().unwrap_or_default(), value),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(timestamp) = s.parse::<i64>() {
                return from_timestamp(timestamp, value);
            }
            parse_date_str(s)
                .map(Some)
                .ok_or_else(|| DataTypeError::InvalidDate(s.to_string()).into())
        }
        other => Err(DataTypeError::InvalidDate(other.to_string()).into()),
    }
}

fn from_timestamp(timestamp: i64, raw: &Value) -> Result<Option<DateTime<Utc>>> {
    if timestamp == 0 {
        return Ok(None);
    }
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(Some)
        .ok_or_else(|| DataTypeError::InvalidDate(raw.to_string()).into())
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
