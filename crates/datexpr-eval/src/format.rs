//! Format tags and format requests.
//!
//! Every decode and encode is driven by a *format request*: a tag naming
//! one of the recognized representations, optionally paired with an
//! options object. A tag outside the recognized set is not an error; it
//! is treated as a custom rendering pattern (see the pattern module).

use datexpr_types::ExprValue;

use crate::error::{ExprError, ExprResult};

/// The recognized representation tags, plus the custom-pattern fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatTag {
    /// Full ISO 8601 (`2021-02-12T15:34:15.020Z`)
    Iso,
    /// ISO calendar date (`2021-02-12`)
    IsoDate,
    /// ISO week date (`2021-W06-5`)
    IsoWeekDate,
    /// ISO time of day (`15:34:15.020Z`)
    IsoTime,
    /// RFC 2822 (`Fri, 12 Feb 2021 15:34:15 +0000`)
    Rfc2822,
    /// HTTP-date, RFC 7231 (`Fri, 12 Feb 2021 15:34:15 GMT`)
    Http,
    /// SQL datetime literal (`2021-02-12 15:34:15.020 +00:00`)
    Sql,
    /// SQL date literal (`2021-02-12`)
    SqlDate,
    /// SQL time literal (`15:34:15.020 +00:00`)
    SqlTime,
    /// Milliseconds since the Unix epoch
    UnixEpochMs,
    /// Seconds since the Unix epoch
    UnixEpochS,
    /// The platform date handle
    NativeDate,
    /// Calendar field object (`{year, month, day, ...}`)
    PlainObject,
    /// The internal instant itself, for chaining
    CalendarInstant,
    /// A single named property read off the instant
    CalendarInstantProperty,
    /// Anything else: a custom token pattern such as `yyyy/MM/dd`
    Pattern(String),
}

impl FormatTag {
    /// Map a tag name onto the recognized set; unknown names become
    /// custom patterns.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ISO" => Self::Iso,
            "ISODate" => Self::IsoDate,
            "ISOWeekDate" => Self::IsoWeekDate,
            "ISOTime" => Self::IsoTime,
            "RFC2822" => Self::Rfc2822,
            "HTTP" => Self::Http,
            "SQL" => Self::Sql,
            "SQLDate" => Self::SqlDate,
            "SQLTime" => Self::SqlTime,
            "UnixEpochMs" => Self::UnixEpochMs,
            "UnixEpochS" => Self::UnixEpochS,
            "NativeDate" => Self::NativeDate,
            "PlainObject" => Self::PlainObject,
            "CalendarInstant" => Self::CalendarInstant,
            "CalendarInstantProperty" => Self::CalendarInstantProperty,
            other => Self::Pattern(other.to_string()),
        }
    }
}

/// A destructured format request: the tag plus its raw options value.
///
/// The options value stays raw because its shape depends on the tag:
/// an object for most tags, a property name string for
/// `CalendarInstantProperty`.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRequest {
    pub tag: FormatTag,
    pub options: ExprValue,
}

impl FormatRequest {
    /// Destructure a format request value: omitted requests default to
    /// `ISO`, a string is a bare tag, and an array is `[tag, options]`.
    pub fn destructure(request: &ExprValue) -> ExprResult<Self> {
        match request {
            ExprValue::Null => Ok(Self {
                tag: FormatTag::Iso,
                options: ExprValue::Null,
            }),
            ExprValue::String(name) => Ok(Self {
                tag: FormatTag::from_name(name),
                options: ExprValue::Null,
            }),
            ExprValue::Array(items) => {
                let name = items
                    .first()
                    .and_then(ExprValue::as_string)
                    .ok_or_else(|| {
                        ExprError::type_mismatch(
                            "string",
                            items.first().map_or("undefined", ExprValue::type_name),
                        )
                    })?;
                Ok(Self {
                    tag: FormatTag::from_name(name),
                    options: items.get(1).cloned().unwrap_or(ExprValue::Null),
                })
            }
            other => Err(ExprError::type_mismatch(
                "string | array | undefined",
                other.type_name(),
            )),
        }
    }
}

/// Decoded format options, shared by parse and serialize sides.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Zone to interpret zone-less input in, or to reproject output onto
    pub zone: Option<String>,
    /// Keep the offset carried by the parsed text as the instant's zone
    pub set_zone: bool,
    /// Drop the fractional part of ISO renderings when it is zero
    pub suppress_milliseconds: bool,
    /// Render the offset suffix of ISO renderings
    pub include_offset: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            zone: None,
            set_zone: false,
            suppress_milliseconds: false,
            include_offset: true,
        }
    }
}

impl FormatOptions {
    /// Decode an options object. Unrecognized keys are ignored; a
    /// recognized key with the wrong value type raises.
    pub fn from_value(value: &ExprValue) -> ExprResult<Self> {
        let mut options = Self::default();
        let map = match value {
            ExprValue::Null => return Ok(options),
            ExprValue::Object(map) => map,
            other => {
                return Err(ExprError::type_mismatch(
                    "object | undefined",
                    other.type_name(),
                ))
            }
        };
        for (key, value) in map {
            match key.as_str() {
                "zone" => {
                    let spec = value
                        .as_string()
                        .ok_or_else(|| ExprError::type_mismatch("string", value.type_name()))?;
                    options.zone = Some(spec.to_string());
                }
                "setZone" => options.set_zone = require_bool(value)?,
                "suppressMilliseconds" => options.suppress_milliseconds = require_bool(value)?,
                "includeOffset" => options.include_offset = require_bool(value)?,
                _ => {}
            }
        }
        Ok(options)
    }
}

fn require_bool(value: &ExprValue) -> ExprResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| ExprError::type_mismatch("boolean", value.type_name()))
}
