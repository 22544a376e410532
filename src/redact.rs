//! Masking of credentials in request payloads before they reach the log.

use serde_json::{Map, Value};

/// Keys whose values never reach the log, compared case-insensitively
pub const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "pass",
    "passwd",
    "token",
    "authorization",
    "auth",
    "secret",
];

pub const MASK: &str = "***";

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS
        .iter()
        .any(|sensitive| key.eq_ignore_ascii_case(sensitive))
}

/// Return a copy of `payload` with every sensitive key's value replaced by `***`.
///
/// Objects and arrays are walked recursively, so a password buried in a list of
/// objects is masked as well. The input is left untouched.
pub fn mask_sensitive_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => {
            let masked: Map<String, Value> = map
                .iter()
                .map(|(key, value)| {
                    let value = if is_sensitive(key) {
                        Value::String(MASK.to_string())
                    } else {
                        mask_sensitive_payload(value)
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(masked)
        }
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive_payload).collect()),
        other => other.clone(),
    }
}
