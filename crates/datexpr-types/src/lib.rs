//! Value model and calendar types for the datexpr expression set
//!
//! This crate defines:
//! - The host-facing value union (`ExprValue`) and the parameter shape
//!   descriptors (`ExprType`) expression signatures are declared with
//! - The calendar-aware instant (`CalendarInstant`) together with its
//!   companions: zones, units, durations, and named field bundles

pub mod duration;
pub mod fields;
pub mod instant;
pub mod unit;
pub mod value;
pub mod zone;

pub use duration::CalendarDuration;
pub use fields::DateFields;
pub use instant::{CalendarInstant, InvalidReason};
pub use unit::{CalendarUnit, UnitParseError};
pub use value::{ExprType, ExprValue};
pub use zone::CalendarZone;
