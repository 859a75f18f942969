//! Date parsing, formatting, and calendar arithmetic for data-driven evaluators
//!
//! This crate bundles the full date expression stack:
//! - A codec between tagged date values and calendar instants (ISO 8601,
//!   RFC 2822, HTTP, SQL, epoch numbers, field objects, custom patterns)
//! - Millisecond-resolution instants carrying an IANA or fixed-offset zone
//! - Calendar operations: unit boundaries, field overwrites, zone changes,
//!   comparisons, and duration arithmetic
//! - An expression registry exposing everything as `$date*` operations with
//!   per-position argument validation
//!
//! # Example
//!
//! ```
//! use datexpr::{date_expressions, ExprValue};
//!
//! let registry = date_expressions();
//!
//! // Reformat an ISO timestamp through a custom pattern.
//! let date = ExprValue::from("2020-10-14T23:09:30.787Z");
//! let month = registry.call("$date", &[ExprValue::from("MMMM"), date]).unwrap();
//! assert_eq!(month, ExprValue::from("October"));
//! ```

// Re-export the public APIs of the internal crates
pub use datexpr_eval as eval;
pub use datexpr_types as types;

// Convenience re-exports
pub use datexpr_eval::{
    date_expressions, ExprError, ExprFn, ExprResult, ExpressionRegistry, ExpressionSignature,
};
pub use datexpr_types::{
    CalendarDuration, CalendarInstant, CalendarUnit, CalendarZone, DateFields, ExprType, ExprValue,
};
