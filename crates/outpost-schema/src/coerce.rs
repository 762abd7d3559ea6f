//! Type checking and narrow coercions for resolved field values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use outpost_config::{FieldDef, FieldType};
use serde_json::{Number, Value};

use crate::error::ValidationError;

/// Check a resolved value against a field's declared type.
///
/// `multiple` fields accept an array (each element is checked) or a single
/// value, which is wrapped. Accepted coercions:
/// - string types: numbers and booleans are stringified
/// - number: numeric strings
/// - integer: integral floats and integer strings
/// - boolean: `"true"` / `"false"` (any case)
/// - datetime: RFC-3339 / ISO-8601 strings and `YYYY-MM-DD`, normalised to
///   RFC-3339 UTC with millisecond precision
pub fn coerce_value(field: &FieldDef, value: Value) -> Result<Value, ValidationError> {
  if field.multiple {
    let items = match value {
      Value::Array(items) => items,
      single => vec![single],
    };
    return items
      .into_iter()
      .map(|item| coerce_scalar(&field.name, field.field_type, item))
      .collect::<Result<Vec<_>, _>>()
      .map(Value::Array);
  }

  coerce_scalar(&field.name, field.field_type, value)
}

fn coerce_scalar(field: &str, expected: FieldType, value: Value) -> Result<Value, ValidationError> {
  let mismatch = |value: &Value| ValidationError::TypeMismatch {
    field: field.to_string(),
    expected,
    found: kind(value).to_string(),
  };

  match expected {
    FieldType::String | FieldType::Text | FieldType::Password => match value {
      Value::String(_) => Ok(value),
      Value::Number(ref n) => Ok(Value::String(n.to_string())),
      Value::Bool(b) => Ok(Value::String(b.to_string())),
      _ => Err(mismatch(&value)),
    },

    FieldType::Number => match value {
      Value::Number(_) => Ok(value),
      Value::String(ref s) => parse_number(s).ok_or_else(|| mismatch(&value)),
      _ => Err(mismatch(&value)),
    },

    FieldType::Integer => match value {
      Value::Number(ref n) => integral(n).ok_or_else(|| mismatch(&value)),
      Value::String(ref s) => s
        .trim()
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| mismatch(&value)),
      _ => Err(mismatch(&value)),
    },

    FieldType::Boolean => match value {
      Value::Bool(_) => Ok(value),
      Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(mismatch(&value)),
      },
      _ => Err(mismatch(&value)),
    },

    FieldType::Object => match value {
      Value::Object(_) => Ok(value),
      _ => Err(mismatch(&value)),
    },

    FieldType::Datetime => match value {
      Value::String(ref s) => parse_datetime(s)
        .map(Value::String)
        .ok_or_else(|| mismatch(&value)),
      _ => Err(mismatch(&value)),
    },
  }
}

/// Parse an ISO-8601 timestamp and normalise it to RFC-3339 UTC.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_datetime(input: &str) -> Option<String> {
  let input = input.trim();

  let parsed: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
    dt.with_timezone(&Utc)
  } else if let Some(naive) = parse_naive(input) {
    naive.and_utc()
  } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
    date.and_hms_opt(0, 0, 0)?.and_utc()
  } else {
    return None;
  };

  Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
  const FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
  ];
  FORMATS
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

fn parse_number(s: &str) -> Option<Value> {
  s.trim()
    .parse::<f64>()
    .ok()
    .and_then(Number::from_f64)
    .map(Value::Number)
}

fn integral(n: &Number) -> Option<Value> {
  if let Some(i) = n.as_i64() {
    return Some(Value::from(i));
  }
  if let Some(u) = n.as_u64() {
    return Some(Value::from(u));
  }
  n.as_f64()
    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
    .map(|f| Value::from(f as i64))
}

/// JSON kind name used in mismatch messages.
pub(crate) fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
