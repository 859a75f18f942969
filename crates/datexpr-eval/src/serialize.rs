//! Instant rendering.
//!
//! The inverse of [`crate::parse`]: a format request selects the output
//! shape, and an `options.zone` reprojects the instant before any
//! local-looking grammar is rendered. Invalid instants never raise here;
//! each tag has a designated degraded output (`null`, `NaN`, an empty
//! object, or the literal `Invalid DateTime` for patterns).

use chrono::{DateTime, FixedOffset};
use datexpr_types::{CalendarInstant, ExprValue};
use indexmap::IndexMap;

use crate::error::{ExprError, ExprResult};
use crate::format::{FormatOptions, FormatRequest, FormatTag};
use crate::pattern;

/// Render an instant per a format request (`undefined`, a tag string, or
/// `[tag, options]`).
pub fn serialize_instant(instant: &CalendarInstant, request: &ExprValue) -> ExprResult<ExprValue> {
    let request = FormatRequest::destructure(request)?;
    if request.tag == FormatTag::CalendarInstantProperty {
        let property = request
            .options
            .as_string()
            .ok_or_else(|| ExprError::type_mismatch("string", request.options.type_name()))?;
        return read_property(instant, property);
    }

    let options = FormatOptions::from_value(&request.options)?;
    let projected;
    let instant = match options.zone.as_deref() {
        Some(spec) => {
            projected = instant.with_zone_named(spec);
            &projected
        }
        None => instant,
    };

    Ok(match &request.tag {
        FormatTag::Iso => text_or_null(
            instant.to_iso8601_with(options.suppress_milliseconds, options.include_offset),
        ),
        FormatTag::IsoDate => rendered(instant, |local| local.format("%Y-%m-%d").to_string()),
        FormatTag::IsoWeekDate => rendered(instant, |local| local.format("%G-W%V-%u").to_string()),
        FormatTag::IsoTime => text_or_null(iso_time(instant, &options)),
        FormatTag::Rfc2822 => rendered(instant, |local| local.to_rfc2822()),
        FormatTag::Http => match instant.to_utc() {
            Some(utc) => ExprValue::String(utc.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
            None => ExprValue::Null,
        },
        FormatTag::Sql => rendered(instant, |local| {
            sql_offset(local.format("%Y-%m-%d %H:%M:%S%.3f").to_string(), local, &options)
        }),
        FormatTag::SqlDate => rendered(instant, |local| local.format("%Y-%m-%d").to_string()),
        FormatTag::SqlTime => rendered(instant, |local| {
            sql_offset(local.format("%H:%M:%S%.3f").to_string(), local, &options)
        }),
        FormatTag::UnixEpochMs => match instant.epoch_millis() {
            Some(ms) => ExprValue::Number(ms as f64),
            None => ExprValue::Number(f64::NAN),
        },
        FormatTag::UnixEpochS => match instant.epoch_millis() {
            Some(ms) => ExprValue::Number(ms as f64 / 1000.0),
            None => ExprValue::Number(f64::NAN),
        },
        FormatTag::NativeDate => match instant.epoch_millis() {
            Some(ms) => ExprValue::NativeDate(datexpr_types::value::system_time_from_epoch_millis(
                ms,
            )),
            None => ExprValue::Null,
        },
        FormatTag::PlainObject => ExprValue::Object(field_object(instant)),
        FormatTag::CalendarInstant => ExprValue::Instant(instant.clone()),
        // Property reads return early above; they carry no options object.
        FormatTag::CalendarInstantProperty => unreachable!(),
        FormatTag::Pattern(p) => ExprValue::String(pattern::format(instant, p)),
    })
}

/// Read a single named field off an instant. Unknown names raise; on an
/// invalid instant only the validity fields carry values.
pub fn read_property(instant: &CalendarInstant, property: &str) -> ExprResult<ExprValue> {
    Ok(match property {
        "day" => num32(instant.day()),
        "daysInMonth" => num32(instant.days_in_month()),
        "daysInYear" => num32(instant.days_in_year()),
        "hour" => num32(instant.hour()),
        "invalidExplanation" => text_or_null(
            instant
                .invalid_reason()
                .map(|reason| reason.explanation.clone()),
        ),
        "invalidReason" => {
            text_or_null(instant.invalid_reason().map(|reason| reason.code.clone()))
        }
        "isInDST" => flag(instant.is_in_dst()),
        "isInLeapYear" => flag(instant.is_in_leap_year()),
        "isOffsetFixed" => flag(instant.is_offset_fixed()),
        "isValid" => ExprValue::Bool(instant.is_valid()),
        "millisecond" => num32(instant.millisecond()),
        "minute" => num32(instant.minute()),
        "month" => num32(instant.month()),
        "monthLong" => text_or_null(instant.month_long()),
        "monthShort" => text_or_null(instant.month_short()),
        "offset" => match instant.offset_minutes() {
            Some(minutes) => ExprValue::Number(f64::from(minutes)),
            None => ExprValue::Null,
        },
        "ordinal" => num32(instant.ordinal()),
        "quarter" => num32(instant.quarter()),
        "second" => num32(instant.second()),
        "weekNumber" => num32(instant.week_number()),
        "weekYear" => match instant.week_year() {
            Some(year) => ExprValue::Number(f64::from(year)),
            None => ExprValue::Null,
        },
        "weekday" => num32(instant.weekday()),
        "weekdayLong" => text_or_null(instant.weekday_long()),
        "weekdayShort" => text_or_null(instant.weekday_short()),
        "weeksInWeekYear" => num32(instant.weeks_in_week_year()),
        "year" => match instant.year() {
            Some(year) => ExprValue::Number(f64::from(year)),
            None => ExprValue::Null,
        },
        "zoneName" => text_or_null(instant.zone_name()),
        other => return Err(ExprError::invalid_property(other)),
    })
}

fn sql_offset(mut out: String, local: DateTime<FixedOffset>, options: &FormatOptions) -> String {
    if options.include_offset {
        out.push_str(&local.format(" %:z").to_string());
    }
    out
}

/// `HH:mm:ss[.SSS][offset]`, honoring the same milliseconds and offset
/// options as the full ISO form.
fn iso_time(instant: &CalendarInstant, options: &FormatOptions) -> Option<String> {
    let local = instant.local()?;
    let mut out = local.format("%H:%M:%S").to_string();
    let millis = local.timestamp_subsec_millis().min(999);
    if !(options.suppress_milliseconds && millis == 0) {
        out.push_str(&format!(".{millis:03}"));
    }
    if options.include_offset {
        out.push_str(&instant.iso_offset_suffix()?);
    }
    Some(out)
}

fn field_object(instant: &CalendarInstant) -> IndexMap<String, ExprValue> {
    let mut map = IndexMap::new();
    let fields: [(&str, Option<f64>); 7] = [
        ("year", instant.year().map(f64::from)),
        ("month", instant.month().map(f64::from)),
        ("day", instant.day().map(f64::from)),
        ("hour", instant.hour().map(f64::from)),
        ("minute", instant.minute().map(f64::from)),
        ("second", instant.second().map(f64::from)),
        ("millisecond", instant.millisecond().map(f64::from)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            map.insert(name.to_string(), ExprValue::Number(value));
        }
    }
    map
}

fn rendered(
    instant: &CalendarInstant,
    render: impl Fn(DateTime<FixedOffset>) -> String,
) -> ExprValue {
    match instant.local() {
        Some(local) => ExprValue::String(render(local)),
        None => ExprValue::Null,
    }
}

fn text_or_null(text: Option<String>) -> ExprValue {
    match text {
        Some(text) => ExprValue::String(text),
        None => ExprValue::Null,
    }
}

fn num32(value: Option<u32>) -> ExprValue {
    match value {
        Some(value) => ExprValue::Number(f64::from(value)),
        None => ExprValue::Null,
    }
}

fn flag(value: Option<bool>) -> ExprValue {
    match value {
        Some(value) => ExprValue::Bool(value),
        None => ExprValue::Null,
    }
}
