//! Evaluation errors for the date expression set

use datexpr_types::UnitParseError;
use thiserror::Error;

/// Result type for expression evaluation
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors raised during expression evaluation.
///
/// Only shape and naming problems raise: a value of the wrong type for
/// its position, an unknown unit or configuration key, or incompatible
/// calendar components. Content that merely fails to parse degrades to
/// an invalid instant instead (see the parser module).
#[derive(Debug, Error, Clone)]
pub enum ExprError {
    /// No expression registered under the given name
    #[error("Unknown expression: {name}")]
    UnknownExpression { name: String },

    /// More arguments than the expression declares parameters
    #[error("Too many arguments for {name}: expected at most {expected}, got {got}")]
    TooManyArguments {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Argument shape does not match any declared parameter shape
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Unit or calendar component name not recognized
    #[error("Invalid unit {unit}")]
    InvalidUnit { unit: String },

    /// Calendar components from incompatible date systems given together
    #[error("Can't mix {left} with {right}")]
    ConflictingFields {
        left: &'static str,
        right: &'static str,
    },

    /// Unrecognized `$dateSetConfig` key
    #[error("Unknown date config '{key}'")]
    UnknownConfig { key: String },

    /// Property name outside the instant property allow-list
    #[error("Invalid instant property {property}")]
    InvalidProperty { property: String },
}

impl ExprError {
    /// Create an unknown expression error
    pub fn unknown_expression(name: impl Into<String>) -> Self {
        Self::UnknownExpression { name: name.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid unit error
    pub fn invalid_unit(unit: impl Into<String>) -> Self {
        Self::InvalidUnit { unit: unit.into() }
    }

    /// Create an unknown config key error
    pub fn unknown_config(key: impl Into<String>) -> Self {
        Self::UnknownConfig { key: key.into() }
    }

    /// Create an invalid property error
    pub fn invalid_property(property: impl Into<String>) -> Self {
        Self::InvalidProperty {
            property: property.into(),
        }
    }
}

impl From<UnitParseError> for ExprError {
    fn from(err: UnitParseError) -> Self {
        Self::InvalidUnit { unit: err.0 }
    }
}
