//! The `$date*` expression set.
//!
//! Fourteen operations over the decode/encode codec: format conversion,
//! validity, unit boundaries, field and configuration mutation, instant
//! comparison, and duration arithmetic. Every implementation receives its
//! full argument slice; the trailing date parameter is the host's current
//! value, passed explicitly, with missing positions padded to `undefined`
//! by [`ExpressionRegistry::call`].

use std::cmp::Ordering;
use std::sync::Arc;

use datexpr_types::{
    CalendarDuration, CalendarInstant, CalendarUnit, CalendarZone, ExprType, ExprValue,
};
use indexmap::IndexMap;

use crate::error::{ExprError, ExprResult};
use crate::parse::{fields_from_object, parse_date_value};
use crate::registry::ExpressionRegistry;
use crate::serialize::serialize_instant;

/// Shapes accepted where a date value is expected.
const DATE_VALUE: &[ExprType] = &[ExprType::String, ExprType::Array];
/// Shapes accepted where an optional format request is expected.
const DATE_FORMAT: &[ExprType] = &[ExprType::String, ExprType::Array, ExprType::Undefined];
/// Shapes accepted for a zone-sensitive unit or field-object argument.
const UNIT_VALUE: &[ExprType] = &[ExprType::String, ExprType::Array];
const FIELDS_VALUE: &[ExprType] = &[ExprType::Object, ExprType::Array];

/// Build a registry holding the full `$date*` expression set.
pub fn date_expressions() -> ExpressionRegistry {
    let mut registry = ExpressionRegistry::new();

    // Conversion and validity.
    registry.register(
        "$date",
        vec![DATE_FORMAT.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(date),
    );
    registry.register("$dateNow", vec![DATE_FORMAT.to_vec()], Arc::new(date_now));
    registry.register(
        "$dateIsValid",
        vec![vec![ExprType::Any]],
        Arc::new(date_is_valid),
    );

    // Unit boundaries.
    registry.register(
        "$dateStartOf",
        vec![UNIT_VALUE.to_vec(), DATE_FORMAT.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| boundary(args, CalendarInstant::start_of)),
    );
    registry.register(
        "$dateEndOf",
        vec![UNIT_VALUE.to_vec(), DATE_FORMAT.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| boundary(args, CalendarInstant::end_of)),
    );

    // Mutation.
    registry.register(
        "$dateSet",
        vec![
            FIELDS_VALUE.to_vec(),
            DATE_FORMAT.to_vec(),
            DATE_VALUE.to_vec(),
        ],
        Arc::new(date_set),
    );
    registry.register(
        "$dateSetConfig",
        vec![
            vec![ExprType::Object],
            DATE_FORMAT.to_vec(),
            DATE_VALUE.to_vec(),
        ],
        Arc::new(date_set_config),
    );

    // Comparison. Each reads as `date OP reference` with the reference
    // first and the date trailing.
    registry.register(
        "$dateGt",
        vec![DATE_VALUE.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| compare(args, Ordering::is_gt)),
    );
    registry.register(
        "$dateGte",
        vec![DATE_VALUE.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| compare(args, Ordering::is_ge)),
    );
    registry.register(
        "$dateLt",
        vec![DATE_VALUE.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| compare(args, Ordering::is_lt)),
    );
    registry.register(
        "$dateLte",
        vec![DATE_VALUE.to_vec(), DATE_VALUE.to_vec()],
        Arc::new(|args| compare(args, Ordering::is_le)),
    );
    registry.register(
        "$dateEq",
        vec![
            DATE_VALUE.to_vec(),
            vec![ExprType::String, ExprType::Undefined],
            DATE_VALUE.to_vec(),
        ],
        Arc::new(date_eq),
    );

    // Duration arithmetic.
    registry.register(
        "$dateMoveForward",
        vec![
            vec![ExprType::Object],
            DATE_FORMAT.to_vec(),
            DATE_VALUE.to_vec(),
        ],
        Arc::new(|args| date_move(args, false)),
    );
    registry.register(
        "$dateMoveBackward",
        vec![
            vec![ExprType::Object],
            DATE_FORMAT.to_vec(),
            DATE_VALUE.to_vec(),
        ],
        Arc::new(|args| date_move(args, true)),
    );

    registry
}

// ============================================================================
// Operations
// ============================================================================

/// `$date(serializeFormat?, date)`: decode, then re-encode.
fn date(args: &[ExprValue]) -> ExprResult<ExprValue> {
    let instant = parse_date_value(arg(args, 1))?;
    serialize_instant(&instant, arg(args, 0))
}

/// `$dateNow(serializeFormat?)`: the current instant in the local zone.
fn date_now(args: &[ExprValue]) -> ExprResult<ExprValue> {
    serialize_instant(&CalendarInstant::now(), arg(args, 0))
}

/// `$dateIsValid(value)`: the one operation that never raises; shape
/// errors read as invalid.
fn date_is_valid(args: &[ExprValue]) -> ExprResult<ExprValue> {
    let valid = parse_date_value(arg(args, 0)).is_ok_and(|instant| instant.is_valid());
    Ok(ExprValue::Bool(valid))
}

/// `$dateStartOf` / `$dateEndOf`: reproject onto the unit's zone, then
/// take the unit boundary.
fn boundary(
    args: &[ExprValue],
    pick: fn(&CalendarInstant, CalendarUnit) -> CalendarInstant,
) -> ExprResult<ExprValue> {
    let instant = parse_date_value(arg(args, 2))?;
    let (unit, zone) = zoned_value(arg(args, 0))?;
    let unit = unit_of(unit)?;
    let instant = pick(&reproject(&instant, zone), unit);
    serialize_instant(&instant, arg(args, 1))
}

/// `$dateSet(values, serializeFormat?, date)`: overwrite calendar fields
/// in the target zone. A day carried from the date clamps to the new
/// month's length; a stated out-of-range field degrades instead.
fn date_set(args: &[ExprValue]) -> ExprResult<ExprValue> {
    let instant = parse_date_value(arg(args, 2))?;
    let (values, zone) = zoned_value(arg(args, 0))?;
    let map = values
        .as_object()
        .ok_or_else(|| ExprError::type_mismatch("object", values.type_name()))?;
    let fields = fields_from_object(map)?;
    let instant = reproject(&instant, zone).with_fields(&fields);
    serialize_instant(&instant, arg(args, 1))
}

/// `$dateSetConfig(config, serializeFormat?, date)`: apply configuration
/// keys in the object's own order. Only `zone` is recognized.
fn date_set_config(args: &[ExprValue]) -> ExprResult<ExprValue> {
    let mut instant = parse_date_value(arg(args, 2))?;
    let config = arg(args, 0)
        .as_object()
        .ok_or_else(|| ExprError::type_mismatch("object", arg(args, 0).type_name()))?;
    for (key, value) in config {
        instant = match key.as_str() {
            "zone" => {
                let spec = value
                    .as_string()
                    .ok_or_else(|| ExprError::type_mismatch("string", value.type_name()))?;
                instant.with_zone_named(spec)
            }
            other => return Err(ExprError::unknown_config(other)),
        };
    }
    serialize_instant(&instant, arg(args, 1))
}

/// Ordering comparisons: `$dateGt`, `$dateGte`, `$dateLt`, `$dateLte`.
/// An invalid side fails every ordering.
fn compare(args: &[ExprValue], accept: fn(Ordering) -> bool) -> ExprResult<ExprValue> {
    let reference = parse_date_value(arg(args, 0))?;
    let date = parse_date_value(arg(args, 1))?;
    let result = date.compare(&reference).is_some_and(accept);
    Ok(ExprValue::Bool(result))
}

/// `$dateEq(reference, compareUnit?, date)`: equality after flooring both
/// sides to the unit in the reference's zone.
fn date_eq(args: &[ExprValue]) -> ExprResult<ExprValue> {
    let reference = parse_date_value(arg(args, 0))?;
    let unit = match arg(args, 1) {
        ExprValue::Null => CalendarUnit::Millisecond,
        other => unit_of(other)?,
    };
    let date = parse_date_value(arg(args, 2))?;
    Ok(ExprValue::Bool(reference.same_as(&date, unit)))
}

/// `$dateMoveForward` / `$dateMoveBackward`: shift by a duration object.
fn date_move(args: &[ExprValue], backward: bool) -> ExprResult<ExprValue> {
    let instant = parse_date_value(arg(args, 2))?;
    let map = arg(args, 0)
        .as_object()
        .ok_or_else(|| ExprError::type_mismatch("object", arg(args, 0).type_name()))?;
    let mut duration = duration_from_object(map)?;
    if backward {
        duration = duration.negated();
    }
    serialize_instant(&instant.shift(&duration), arg(args, 1))
}

// ============================================================================
// Argument plumbing
// ============================================================================

/// Positional argument access; positions past the slice read as
/// `undefined`, matching how the registry pads calls.
fn arg(args: &[ExprValue], position: usize) -> &ExprValue {
    args.get(position).unwrap_or(&ExprValue::Null)
}

/// Split a zone-sensitive argument: a bare `value` or `[value, zone]`.
fn zoned_value(value: &ExprValue) -> ExprResult<(&ExprValue, Option<&str>)> {
    match value {
        ExprValue::Array(items) => {
            let zone = match items.get(1) {
                None | Some(ExprValue::Null) => None,
                Some(ExprValue::String(spec)) => Some(spec.as_str()),
                Some(other) => return Err(ExprError::type_mismatch("string", other.type_name())),
            };
            Ok((items.first().unwrap_or(&ExprValue::Null), zone))
        }
        other => Ok((other, None)),
    }
}

fn unit_of(value: &ExprValue) -> ExprResult<CalendarUnit> {
    let name = value
        .as_string()
        .ok_or_else(|| ExprError::type_mismatch("string", value.type_name()))?;
    Ok(name.parse()?)
}

/// Reproject onto the zone of a `[value, zone]` pair, defaulting to the
/// local zone. Unresolvable zone names degrade the instant.
fn reproject(instant: &CalendarInstant, zone: Option<&str>) -> CalendarInstant {
    match zone {
        Some(spec) => instant.with_zone_named(spec),
        None => instant.with_zone(CalendarZone::Local),
    }
}

/// Decode a duration object: unit names (singular or plural) to signed
/// counts. Whole counts walk the calendar; fractional remainders fold
/// into clock milliseconds.
fn duration_from_object(map: &IndexMap<String, ExprValue>) -> ExprResult<CalendarDuration> {
    let mut duration = CalendarDuration::default();
    for (key, value) in map {
        let unit: CalendarUnit = key.parse()?;
        let count = value
            .as_number()
            .ok_or_else(|| ExprError::type_mismatch("number", value.type_name()))?;
        duration.set(unit, count);
    }
    Ok(duration)
}
