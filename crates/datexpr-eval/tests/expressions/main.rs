//! Integration tests for the `$date*` expression set
//!
//! Everything runs end to end through [`datexpr_eval::ExpressionRegistry::call`]:
//! - Format conversion and the custom pattern grammar
//! - `$dateIsValid` over well-formed, malformed, and mis-shaped inputs
//! - Unit boundaries (`$dateStartOf` / `$dateEndOf`)
//! - Field and configuration mutation (`$dateSet` / `$dateSetConfig`)
//! - Comparisons and unit-floored equality
//! - Duration arithmetic (`$dateMoveForward` / `$dateMoveBackward`)

mod boundaries;
mod common;
mod comparison;
mod conversion;
mod mutation;
