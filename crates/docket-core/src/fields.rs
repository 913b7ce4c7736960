//! Defensive field extraction over loosely-typed JSON values.
//!
//! The external workflow has emitted both "Title Case With Spaces" and
//! `snake_case` keys across runs, so every lookup goes through an ordered
//! list of key variants. A key matches only when it is present, non-null,
//! and coercible to the requested type; otherwise the next variant is tried.

use chrono::Datelike;
use serde_json::Value;

/// True when any of the key variants is present with a non-null value.
pub(crate) fn has_any_key(obj: &Value, keys: &[&str]) -> bool {
    let Some(map) = obj.as_object() else {
        return false;
    };
    keys.iter()
        .any(|k| map.get(*k).is_some_and(|v| !v.is_null()))
}

/// First present, non-null value among the key variants.
pub(crate) fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    keys.iter()
        .find_map(|k| map.get(*k).filter(|v| !v.is_null()))
}

/// Read a non-empty string through the key-variant list.
pub(crate) fn read_string(obj: &Value, keys: &[&str]) -> Option<String> {
    let map = obj.as_object()?;
    keys.iter()
        .find_map(|k| {
            map.get(*k)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .map(str::to_string)
}

/// Read a number through the key-variant list, accepting JSON numbers and
/// numeric strings.
pub(crate) fn read_number(obj: &Value, keys: &[&str]) -> Option<f64> {
    let map = obj.as_object()?;
    keys.iter().find_map(|k| map.get(*k).and_then(coerce_number))
}

/// Read an array through the key-variant list.
pub(crate) fn read_array<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    let map = obj.as_object()?;
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_array))
}

/// Numeric coercion: JSON number, or a string holding one.
pub(crate) fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Best-effort text rendering of a scalar list item. Containers yield `None`.
pub(crate) fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Page number from a free-text section reference: strip every non-digit,
/// parse the rest. Empty, unparsable, and zero all become page 1.
pub(crate) fn page_from_section(section: Option<&str>) -> u32 {
    let digits: String = section
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n,
    }
}

/// Current calendar year, the stand-in for filing years the sources never
/// reliably provide.
pub(crate) fn current_year() -> i32 {
    chrono::Utc::now().year()
}
