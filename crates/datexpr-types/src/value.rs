//! Host-facing values - the runtime representation exchanged with the
//! expression evaluator.
//!
//! This module defines the `ExprValue` union plus the shape descriptors
//! (`ExprType`) expression signatures use to validate argument slices.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::CalendarInstant;

/// The value union shared with the host evaluator.
///
/// Hosts typically feed JSON-shaped data in; `NativeDate` and `Instant`
/// appear once date operations start producing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ExprValue {
    /// Null, also the stand-in for an omitted optional argument
    Null,
    /// Boolean value
    Bool(bool),
    /// Double-precision number (the host's only numeric type)
    Number(f64),
    /// String value
    String(String),
    /// Ordered list of values
    Array(Vec<ExprValue>),
    /// String-keyed map preserving insertion order
    Object(IndexMap<String, ExprValue>),
    /// A platform date handle
    NativeDate(SystemTime),
    /// A parsed calendar instant
    Instant(CalendarInstant),
}

impl ExprValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The external type name, as reported in shape errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::NativeDate(_) => "date",
            Self::Instant(_) => "instant",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ExprValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ExprValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_native_date(&self) -> Option<SystemTime> {
        match self {
            Self::NativeDate(st) => Some(*st),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<&CalendarInstant> {
        match self {
            Self::Instant(instant) => Some(instant),
            _ => None,
        }
    }
}

impl From<bool> for ExprValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for ExprValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ExprValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ExprValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<ExprValue>> for ExprValue {
    fn from(items: Vec<ExprValue>) -> Self {
        Self::Array(items)
    }
}

impl From<IndexMap<String, ExprValue>> for ExprValue {
    fn from(map: IndexMap<String, ExprValue>) -> Self {
        Self::Object(map)
    }
}

impl From<CalendarInstant> for ExprValue {
    fn from(instant: CalendarInstant) -> Self {
        Self::Instant(instant)
    }
}

impl From<SystemTime> for ExprValue {
    fn from(st: SystemTime) -> Self {
        Self::NativeDate(st)
    }
}

impl From<serde_json::Value> for ExprValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&ExprValue> for serde_json::Value {
    fn from(value: &ExprValue) -> Self {
        match value {
            ExprValue::Null => Self::Null,
            ExprValue::Bool(b) => Self::Bool(*b),
            ExprValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Self::Null, Self::Number),
            ExprValue::String(s) => Self::String(s.clone()),
            ExprValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            ExprValue::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
            ExprValue::NativeDate(st) => match system_time_iso(*st) {
                Some(iso) => Self::String(iso),
                None => Self::Null,
            },
            ExprValue::Instant(instant) => match instant.to_iso8601() {
                Some(iso) => Self::String(iso),
                None => Self::Null,
            },
        }
    }
}

fn system_time_iso(st: SystemTime) -> Option<String> {
    let ms = match st.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).ok()?,
        Err(e) => i64::try_from(e.duration().as_millis()).ok().map(|n| -n)?,
    };
    CalendarInstant::from_epoch_millis(ms as f64, crate::CalendarZone::Utc).to_iso8601()
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::NativeDate(st) => match system_time_iso(*st) {
                Some(iso) => f.write_str(&iso),
                None => f.write_str("[native date]"),
            },
            Self::Instant(instant) => write!(f, "{instant}"),
        }
    }
}

/// Parameter shape descriptors used by expression signatures.
///
/// A parameter declares a *set* of acceptable shapes; `Undefined` in the
/// set marks the parameter optional (an omitted argument arrives as
/// `Null`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExprType {
    String,
    Number,
    Bool,
    Object,
    Array,
    Date,
    Instant,
    Undefined,
    Any,
}

impl ExprType {
    pub fn matches(&self, value: &ExprValue) -> bool {
        match self {
            Self::String => matches!(value, ExprValue::String(_)),
            Self::Number => matches!(value, ExprValue::Number(_)),
            Self::Bool => matches!(value, ExprValue::Bool(_)),
            Self::Object => matches!(value, ExprValue::Object(_)),
            Self::Array => matches!(value, ExprValue::Array(_)),
            Self::Date => matches!(value, ExprValue::NativeDate(_)),
            Self::Instant => matches!(value, ExprValue::Instant(_)),
            Self::Undefined => matches!(value, ExprValue::Null),
            Self::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Date => "date",
            Self::Instant => "instant",
            Self::Undefined => "undefined",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construct a `SystemTime` from signed epoch milliseconds.
pub fn system_time_from_epoch_millis(ms: i64) -> SystemTime {
    if ms >= 0 {
        UNIX_EPOCH + Duration::from_millis(ms as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(ms.unsigned_abs())
    }
}
