//! Shape validation for untrusted model JSON.
//!
//! Every stage converts the gateway's raw `Value` into typed results here,
//! at the boundary; unvalidated JSON never crosses into the rest of the
//! pipeline.

use std::collections::BTreeSet;

use serde_json::Value;

use super::error::StageError;

/// Extracts a required string field.
pub(crate) fn require_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, StageError> {
    value
        .get(key)
        .ok_or_else(|| StageError::MalformedModelOutput(format!("missing field '{key}'")))?
        .as_str()
        .ok_or_else(|| StageError::MalformedModelOutput(format!("field '{key}' is not a string")))
}

/// Extracts a required array field.
pub(crate) fn require_array<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], StageError> {
    value
        .get(key)
        .ok_or_else(|| StageError::MalformedModelOutput(format!("missing field '{key}'")))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| StageError::MalformedModelOutput(format!("field '{key}' is not an array")))
}

/// Extracts a required numeric score and clamps it into [0, 100].
///
/// Out-of-range values are clamped rather than rejected; a model that says
/// 105 still told us something, a model that says "high" did not.
pub(crate) fn require_score(value: &Value, key: &str) -> Result<f64, StageError> {
    let raw = value
        .get(key)
        .ok_or_else(|| StageError::MalformedModelOutput(format!("missing field '{key}'")))?
        .as_f64()
        .ok_or_else(|| {
            StageError::MalformedModelOutput(format!("field '{key}' is not numeric"))
        })?;

    Ok(raw.clamp(0.0, 100.0))
}

/// Extracts a required numeric pixel value.
pub(crate) fn require_pixels(value: &Value, key: &str) -> Result<u32, StageError> {
    let raw = value
        .get(key)
        .ok_or_else(|| StageError::MalformedModelOutput(format!("missing region field '{key}'")))?
        .as_u64()
        .ok_or_else(|| {
            StageError::MalformedModelOutput(format!("region field '{key}' is not a pixel count"))
        })?;

    u32::try_from(raw).map_err(|_| {
        StageError::MalformedModelOutput(format!("region field '{key}' is out of range"))
    })
}

/// Collects an optional array of strings, preserving order.
pub(crate) fn optional_string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Collects an optional array of strings as a set.
pub(crate) fn optional_string_set(value: &Value, key: &str) -> BTreeSet<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
