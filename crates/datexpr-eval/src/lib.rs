//! Date Expression Evaluation Engine
//!
//! This crate implements the date value codec and the calendar operations
//! exposed through the `$date*` expression set:
//!
//! - **Decoding**: date values in any tagged format to calendar instants
//! - **Encoding**: instants back out through the same format tags
//! - **Custom Patterns**: a token grammar (`yyyy/MM/dd`) for both directions
//! - **Boundaries**: `$dateStartOf` / `$dateEndOf` over calendar units
//! - **Mutation**: `$dateSet` field overwrites and `$dateSetConfig` zone moves
//! - **Comparison**: `$dateGt`/`$dateGte`/`$dateLt`/`$dateLte` and unit-floored `$dateEq`
//! - **Arithmetic**: `$dateMoveForward` / `$dateMoveBackward` duration shifts
//!
//! # Example
//!
//! ```
//! use datexpr_eval::date_expressions;
//! use datexpr_types::ExprValue;
//!
//! let registry = date_expressions();
//! let date = ExprValue::from("2020-10-14T23:09:30.787Z");
//! let year = registry.call("$date", &[ExprValue::from("y"), date]).unwrap();
//! assert_eq!(year, ExprValue::from("2020"));
//! ```
//!
//! # Failure policy
//!
//! Two failure channels stay deliberately separate throughout the crate.
//! Structural problems raise [`ExprError`]: a value whose type contradicts
//! its format tag, an unknown unit, property, or configuration key, or
//! incompatible calendar components. Content problems never raise: text of
//! the right type that fails its grammar, out-of-range calendar fields, or
//! an unresolvable zone degrade to an invalid instant that flows through
//! every subsequent operation and serializes to each tag's designated
//! degraded output. `$dateIsValid` is the one operation that never raises
//! at all.

pub mod error;
pub mod expressions;
pub mod format;
pub mod parse;
pub mod pattern;
pub mod registry;
pub mod serialize;

// Re-export main types
pub use error::{ExprError, ExprResult};
pub use expressions::date_expressions;
pub use format::{FormatOptions, FormatRequest, FormatTag};
pub use parse::{destructure, parse_date_value};
pub use registry::{ExprFn, ExpressionRegistry, ExpressionSignature};
pub use serialize::{read_property, serialize_instant};
