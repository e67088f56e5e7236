//! Pure helper functions for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! These never fail — they always produce a usable value.

use serde_json::Value;

/// Extracts a list of `f64` from `params[name]`, returning `default` if the key
/// is missing, is not an array, or holds any non-numeric element.
///
/// Accepts JSON integers as well as floats.
pub fn param_f64_list(params: &Value, name: &str, default: &[f64]) -> Vec<f64> {
    params
        .get(name)
        .and_then(Value::as_array)
        .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
        .unwrap_or_else(|| default.to_vec())
}
