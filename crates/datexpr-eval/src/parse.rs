//! Date value destructuring and decoding.
//!
//! A date value arrives in one of three shapes: a bare value (assumed
//! full ISO), `[value, options]` (ISO with options), or
//! `[value, formatTag, options?]`. Decoding dispatches on the tag.
//!
//! Two failure policies meet here and stay deliberately separate: a raw
//! value whose type contradicts its tag raises, while content of the
//! right type that merely fails to parse degrades to an invalid instant.

use datexpr_types::{CalendarInstant, CalendarZone, DateFields, ExprValue};
use indexmap::IndexMap;

use crate::error::{ExprError, ExprResult};
use crate::format::{FormatOptions, FormatTag};
use crate::pattern;

/// Normalize the three accepted date value shapes into a
/// `(value, tag, options)` triple. A string in the second array slot is
/// always a format tag, never options.
pub fn destructure(input: &ExprValue) -> (&ExprValue, FormatTag, &ExprValue) {
    const NULL: &ExprValue = &ExprValue::Null;
    match input {
        ExprValue::Array(items) => {
            let value = items.first().unwrap_or(NULL);
            match items.get(1) {
                Some(ExprValue::String(tag)) => (
                    value,
                    FormatTag::from_name(tag),
                    items.get(2).unwrap_or(NULL),
                ),
                Some(options) => (value, FormatTag::Iso, options),
                None => (value, FormatTag::Iso, NULL),
            }
        }
        other => (other, FormatTag::Iso, NULL),
    }
}

/// Decode a date value into a calendar instant.
pub fn parse_date_value(input: &ExprValue) -> ExprResult<CalendarInstant> {
    let (value, tag, options) = destructure(input);
    // A value that is already an instant passes through whatever the tag
    // says, options and all.
    if let Some(instant) = value.as_instant() {
        return Ok(instant.clone());
    }
    let options = FormatOptions::from_value(options)?;
    let zone = match options.zone.as_deref() {
        Some(spec) => match CalendarZone::parse(spec) {
            Some(zone) => zone,
            None => {
                log::debug!("unresolvable parse zone {spec:?}");
                return Ok(unsupported_zone(spec));
            }
        },
        None => CalendarZone::Local,
    };

    let instant = match &tag {
        FormatTag::Iso | FormatTag::IsoDate | FormatTag::IsoWeekDate | FormatTag::IsoTime => {
            CalendarInstant::parse_iso(require_string(value)?, zone, options.set_zone)
        }
        FormatTag::Rfc2822 => {
            CalendarInstant::parse_rfc2822(require_string(value)?, zone, options.set_zone)
        }
        FormatTag::Http => {
            CalendarInstant::parse_http(require_string(value)?, zone, options.set_zone)
        }
        FormatTag::Sql | FormatTag::SqlDate | FormatTag::SqlTime => {
            CalendarInstant::parse_sql(require_string(value)?, zone, options.set_zone)
        }
        FormatTag::UnixEpochMs => CalendarInstant::from_epoch_millis(require_number(value)?, zone),
        FormatTag::UnixEpochS => CalendarInstant::from_epoch_seconds(require_number(value)?, zone),
        FormatTag::NativeDate => {
            let st = value
                .as_native_date()
                .ok_or_else(|| ExprError::type_mismatch("date", value.type_name()))?;
            CalendarInstant::from_system_time(st, zone)
        }
        FormatTag::PlainObject => {
            let map = value
                .as_object()
                .ok_or_else(|| ExprError::type_mismatch("object", value.type_name()))?;
            CalendarInstant::from_fields(&fields_from_object(map)?, zone)
        }
        FormatTag::CalendarInstant => value
            .as_instant()
            .ok_or_else(|| ExprError::type_mismatch("instant", value.type_name()))?
            .clone(),
        // Property reads have no decode form; the tag name falls through
        // as a pattern like any other unrecognized tag.
        FormatTag::CalendarInstantProperty => pattern::parse(
            require_string(value)?,
            "CalendarInstantProperty",
            zone,
            options.set_zone,
        )?,
        FormatTag::Pattern(p) => {
            pattern::parse(require_string(value)?, p, zone, options.set_zone)?
        }
    };
    if let Some(reason) = instant.invalid_reason() {
        log::debug!("date value degraded to invalid: {}", reason.explanation);
    }
    Ok(instant)
}

/// Decode a calendar field object, as used by `PlainObject` values and
/// `$dateSet`. Unknown keys and incompatible component groups raise.
pub fn fields_from_object(map: &IndexMap<String, ExprValue>) -> ExprResult<DateFields> {
    let mut fields = DateFields::default();
    for (key, value) in map {
        let number = value
            .as_number()
            .ok_or_else(|| ExprError::type_mismatch("number", value.type_name()))?;
        if !fields.set_named(key, number.trunc() as i64) {
            return Err(ExprError::invalid_unit(key));
        }
    }
    if let Some((left, right)) = fields.conflict() {
        return Err(ExprError::ConflictingFields { left, right });
    }
    Ok(fields)
}

fn unsupported_zone(spec: &str) -> CalendarInstant {
    CalendarInstant::invalid(
        "unsupported zone",
        format!("the zone \"{spec}\" is not supported"),
    )
}

fn require_string(value: &ExprValue) -> ExprResult<&str> {
    value
        .as_string()
        .ok_or_else(|| ExprError::type_mismatch("string", value.type_name()))
}

fn require_number(value: &ExprValue) -> ExprResult<f64> {
    value
        .as_number()
        .ok_or_else(|| ExprError::type_mismatch("number", value.type_name()))
}
