//! Shared helpers for the expression integration suite.

use datexpr_eval::{date_expressions, ExpressionRegistry};
use datexpr_types::ExprValue;

/// The anchor timestamp used throughout: 2021-02-12T15:34:15.020Z.
pub const REFERENCE: &str = "2021-02-12T12:34:15.020-03:00";

pub fn registry() -> ExpressionRegistry {
    date_expressions()
}

/// Call an expression, panicking on any raised error.
pub fn call(registry: &ExpressionRegistry, name: &str, args: &[ExprValue]) -> ExprValue {
    registry
        .call(name, args)
        .unwrap_or_else(|err| panic!("{name} raised: {err}"))
}

/// Build an argument from JSON notation.
pub fn v(json: serde_json::Value) -> ExprValue {
    ExprValue::from(json)
}

pub fn s(text: &str) -> ExprValue {
    ExprValue::from(text)
}

/// Unwrap a string result.
pub fn text(value: ExprValue) -> String {
    match value {
        ExprValue::String(text) => text,
        other => panic!("expected a string result, got {other:?}"),
    }
}

/// A serialize request rendering full ISO in UTC, used wherever the
/// expected output must not depend on the machine's zone.
pub fn iso_utc() -> ExprValue {
    v(serde_json::json!(["ISO", { "zone": "utc" }]))
}

/// A date value carrying the anchor timestamp with its parse zone pinned
/// to UTC.
pub fn reference_utc() -> ExprValue {
    v(serde_json::json!([REFERENCE, { "zone": "utc" }]))
}
