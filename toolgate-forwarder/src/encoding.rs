//! Argument stringification for URLs and headers.

use serde_json::Value;

/// Renders a scalar argument the way it travels in a path, query, or header.
///
/// Strings are used verbatim, booleans become `true`/`false`, numbers keep
/// their JSON text. Returns `None` for `null`; composite values fall back to
/// compact JSON.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Flattens `(name, value)` arguments into query pairs, unencoded.
///
/// Arrays repeat the key once per element; `null` values and `null`
/// elements are omitted.
#[must_use]
pub fn query_pairs<'a>(
    arguments: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> Vec<(&'a str, String)> {
    let mut pairs = Vec::new();
    for (name, value) in arguments {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().filter_map(scalar_text).map(|text| (name, text)));
            }
            other => pairs.extend(scalar_text(other).map(|text| (name, text))),
        }
    }
    pairs
}
