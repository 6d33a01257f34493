//! Decoding helpers turning raw stored values into typed rules.
//!
//! Stored values arrive the way a settings table keeps them: mostly strings,
//! sometimes JSON-encoded blobs, occasionally already structured. Decoding is
//! best effort; malformed blobs degrade to empty values instead of failing.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{DesignExceptionRule, TrackingParam, TrackingParameters};

/// Truthiness of a stored value under the store's loose typing rules.
///
/// `null`, `false`, `0`, `""`, `"0"` and empty arrays are false. Decoded
/// objects are always true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Coerce an optional stored value to a strict flag; absent is `false`.
#[must_use]
pub fn coerce_flag(raw: Option<&Value>) -> bool {
    raw.is_some_and(is_truthy)
}

/// Render a scalar stored value as text. Structures yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if *flag { "1".into() } else { String::new() }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse an integer setting stored either as a JSON number or numeric string.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer.
pub fn parse_integer(value: &Value, path: &str) -> ConfigResult<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ConfigError::InvalidField {
        path: path.to_string(),
        value: Some(value.to_string()),
        reason: "must be an integer",
    })
}

/// Split a comma-separated address list, trimming each entry.
///
/// Empty entries are kept here; the variable builder drops them.
#[must_use]
pub fn split_access_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|entry| entry.trim().to_string()).collect()
}

/// Decode tracking parameters from their stored notation.
///
/// A string that is non-empty and does not decode to a truthy JSON value is
/// the legacy notation and is kept verbatim. Anything else is read as ordered
/// `{param}` rows (a JSON array, or an object whose values are rows).
#[must_use]
pub fn decode_tracking_parameters(raw: Option<&Value>) -> TrackingParameters {
    let rows = match raw {
        None | Some(Value::Null) => return TrackingParameters::default(),
        Some(Value::String(text)) => {
            if text.is_empty() {
                return TrackingParameters::default();
            }
            match serde_json::from_str::<Value>(text) {
                Ok(decoded) if is_truthy(&decoded) => decoded,
                _ => return TrackingParameters::Legacy(text.clone()),
            }
        }
        Some(structured) => structured.clone(),
    };

    let params = row_values(&rows, "tracking_parameters")
        .into_iter()
        .map(|row| TrackingParam {
            param: row.get("param").and_then(scalar_text).unwrap_or_default(),
        })
        .collect();
    TrackingParameters::List(params)
}

/// Decode the cookie passthrough rules; malformed or absent data yields `{}`.
#[must_use]
pub fn decode_cookie_presence(raw: Option<&Value>) -> Value {
    match raw {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Value::Object(Map::new());
            }
            serde_json::from_str(text).unwrap_or_else(|err| {
                warn!(error = %err, "pass_on_cookie_presence is not valid JSON; ignoring");
                Value::Object(Map::new())
            })
        }
        Some(structured) => structured.clone(),
    }
}

/// Decode the ordered design exception rules.
///
/// Entries that are not objects still occupy their position in the sequence
/// as empty rules, so later rules keep their original index.
#[must_use]
pub fn decode_design_exceptions(raw: Option<&Value>) -> Vec<DesignExceptionRule> {
    let rows = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(text) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!(error = %err, "design exceptions are not valid JSON; ignoring");
                    return Vec::new();
                }
            }
        }
        Some(structured) => structured.clone(),
    };

    row_values(&rows, "design_exceptions")
        .into_iter()
        .map(|row| DesignExceptionRule {
            regexp: row.get("regexp").and_then(scalar_text).unwrap_or_default(),
            value: row.get("value").and_then(scalar_text).unwrap_or_default(),
        })
        .collect()
}

/// Ordered row objects from an array or a keyed object of rows.
fn row_values(rows: &Value, field: &'static str) -> Vec<Map<String, Value>> {
    let items: Vec<&Value> = match rows {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => {
            warn!(field, value = %other, "expected a list of rows; ignoring");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .map(|item| item.as_object().cloned().unwrap_or_default())
        .collect()
}
