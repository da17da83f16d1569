//! Loosely-typed tabular rows with validated column access.
//!
//! The query API returns JSON arrays of row objects where most values
//! arrive as text. [`Row`] wraps one object and exposes coercing
//! accessors; a missing column or an unparsable value is a
//! [`Error::Schema`], raised at the point of access so the failure names
//! the offending column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Row(map)),
            other => Err(Error::schema("<row>", format!("expected a JSON object, got {other}"))),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        match self.0.get(column) {
            Some(Value::Null) | None => false,
            // pandas-style serialization of a missing value.
            Some(Value::String(s)) if s == "nan" => false,
            Some(_) => true,
        }
    }

    fn value(&self, column: &str) -> Result<&Value> {
        match self.0.get(column) {
            Some(value) if self.contains(column) => Ok(value),
            _ => Err(Error::schema(column, "column absent")),
        }
    }

    /// Column as text. Numbers are stringified; other types are errors.
    pub fn text(&self, column: &str) -> Result<String> {
        match self.value(column)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(Error::schema(column, format!("expected text, got {other}"))),
        }
    }

    /// Column as f64, coercing numeric text (the query API serves most
    /// numbers as strings).
    pub fn number(&self, column: &str) -> Result<f64> {
        match self.value(column)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::schema(column, "number does not fit in f64")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::schema(column, format!("`{s}` is not numeric"))),
            other => Err(Error::schema(column, format!("expected a number, got {other}"))),
        }
    }

    /// Column as f64, treating an absent column or null as `None`.
    pub fn opt_number(&self, column: &str) -> Result<Option<f64>> {
        if self.contains(column) {
            self.number(column).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64> {
        match self.value(column)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| Error::schema(column, "number does not fit in i64")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::schema(column, format!("`{s}` is not an integer"))),
            other => Err(Error::schema(column, format!("expected an integer, got {other}"))),
        }
    }

    /// Column as a UTC timestamp. Accepts RFC 3339 text, bare dates and
    /// unix epochs (milliseconds or seconds).
    pub fn datetime(&self, column: &str) -> Result<DateTime<Utc>> {
        match self.value(column)? {
            Value::String(s) => parse_datetime_utc(s)
                .ok_or_else(|| Error::schema(column, format!("`{s}` is not a timestamp"))),
            Value::Number(n) => n
                .as_i64()
                .and_then(epoch_to_datetime)
                .ok_or_else(|| Error::schema(column, format!("`{n}` is not a timestamp"))),
            other => Err(Error::schema(column, format!("expected a timestamp, got {other}"))),
        }
    }

    /// Column as a calendar date, truncating any time-of-day component.
    pub fn date(&self, column: &str) -> Result<NaiveDate> {
        Ok(self.datetime(column)?.date_naive())
    }
}

/// Parse the timestamp formats the upstream APIs actually emit.
pub fn parse_datetime_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    None
}

fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    // Heuristic shared with pandas: values this large are milliseconds.
    if epoch.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        Row::from_value(value).unwrap()
    }

    #[test]
    fn numeric_text_is_coerced() {
        let r = row(json!({"price": "1.25", "count": 3}));
        assert_eq!(r.number("price").unwrap(), 1.25);
        assert_eq!(r.number("count").unwrap(), 3.0);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let r = row(json!({"price": "1.25"}));
        let err = r.number("volume").unwrap_err();
        assert!(matches!(err, Error::Schema { column, .. } if column == "volume"));
    }

    #[test]
    fn null_counts_as_absent() {
        let r = row(json!({"price": null}));
        assert!(!r.contains("price"));
        assert_eq!(r.opt_number("price").unwrap(), None);
    }

    #[test]
    fn nan_text_counts_as_absent() {
        let r = row(json!({"amount": "nan"}));
        assert!(!r.contains("amount"));
        assert_eq!(r.opt_number("amount").unwrap(), None);
        assert!(r.number("amount").is_err());
    }

    #[test]
    fn non_numeric_text_is_a_schema_error() {
        let r = row(json!({"price": "n/a"}));
        assert!(r.number("price").is_err());
    }

    #[test]
    fn timestamps_truncate_to_day() {
        let r = row(json!({"date": "2022-01-01T07:45:00.000Z"}));
        assert_eq!(r.date("date").unwrap(), NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn bare_dates_and_epochs_parse() {
        let r = row(json!({"a": "2022-03-05", "b": 1646438400, "c": 1646438400000i64}));
        assert_eq!(r.date("a").unwrap(), NaiveDate::from_ymd_opt(2022, 3, 5).unwrap());
        assert_eq!(r.date("b").unwrap(), NaiveDate::from_ymd_opt(2022, 3, 5).unwrap());
        assert_eq!(r.date("c").unwrap(), NaiveDate::from_ymd_opt(2022, 3, 5).unwrap());
    }

    #[test]
    fn non_object_rows_are_rejected() {
        assert!(Row::from_value(json!([1, 2, 3])).is_err());
    }
}
