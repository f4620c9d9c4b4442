//! Response envelope helpers.
//!
//! Success is a bare JSON array of row objects (or the metadata mapping for
//! the meta endpoints); failure is `{"error": ..., "traceback": ...}`.
//! `traceback` is diagnostic-only and carries no contract.

use serde_json::{json, Value};

pub fn rows_body(rows: Vec<Value>) -> Value {
    Value::Array(rows)
}

pub fn error_envelope(message: &str, traceback: &str) -> Value {
    json!({
        "error": message,
        "traceback": traceback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_has_both_fields() {
        let v = error_envelope("boom", "detail");
        assert_eq!(v["error"], "boom");
        assert_eq!(v["traceback"], "detail");
    }
}
