//! Custom token patterns.
//!
//! Format tags outside the recognized set are interpreted as token
//! patterns: runs of the same ASCII letter are tokens (`yyyy`, `MM`,
//! `SSS`), single-quoted spans are literal text (`''` is an escaped
//! quote), everything else matches itself. Rendering an unknown token
//! emits it literally; parsing against one fails the whole match.

use chrono::FixedOffset;
use datexpr_types::zone::parse_offset_spec;
use datexpr_types::{CalendarInstant, CalendarZone, DateFields};

use crate::error::{ExprError, ExprResult};

const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS_LONG: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, PartialEq)]
enum Piece {
    Token(String),
    Literal(String),
}

fn lex(pattern: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            let mut quoted = String::new();
            while let Some(q) = chars.next() {
                if q == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        quoted.push('\'');
                    } else {
                        break;
                    }
                } else {
                    quoted.push(q);
                }
            }
            if quoted.is_empty() {
                literal.push('\'');
            } else {
                literal.push_str(&quoted);
            }
        } else if c.is_ascii_alphabetic() {
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            let mut token = String::from(c);
            while chars.peek() == Some(&c) {
                chars.next();
                token.push(c);
            }
            pieces.push(Piece::Token(token));
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}

// ============================================================================
// Rendering
// ============================================================================

/// Render an instant against a token pattern. Invalid instants render as
/// the fixed invalid marker.
pub fn format(instant: &CalendarInstant, pattern: &str) -> String {
    if !instant.is_valid() {
        return "Invalid DateTime".to_string();
    }
    let mut out = String::new();
    for piece in lex(pattern) {
        match piece {
            Piece::Literal(text) => out.push_str(&text),
            Piece::Token(token) => match render_token(instant, &token) {
                Some(text) => out.push_str(&text),
                None => {
                    log::debug!("unrecognized pattern token {token}, emitting literally");
                    out.push_str(&token);
                }
            },
        }
    }
    out
}

fn render_token(instant: &CalendarInstant, token: &str) -> Option<String> {
    let text = match token {
        "y" => instant.year()?.to_string(),
        "yy" => format!("{:02}", instant.year()?.rem_euclid(100)),
        "yyyy" => format!("{:04}", instant.year()?),
        "M" => instant.month()?.to_string(),
        "MM" => format!("{:02}", instant.month()?),
        "MMM" => instant.month_short()?,
        "MMMM" => instant.month_long()?,
        "d" => instant.day()?.to_string(),
        "dd" => format!("{:02}", instant.day()?),
        "o" => instant.ordinal()?.to_string(),
        "ooo" => format!("{:03}", instant.ordinal()?),
        "H" => instant.hour()?.to_string(),
        "HH" => format!("{:02}", instant.hour()?),
        "h" => twelve_hour(instant.hour()?).to_string(),
        "hh" => format!("{:02}", twelve_hour(instant.hour()?)),
        "m" => instant.minute()?.to_string(),
        "mm" => format!("{:02}", instant.minute()?),
        "s" => instant.second()?.to_string(),
        "ss" => format!("{:02}", instant.second()?),
        "S" => instant.millisecond()?.to_string(),
        "SSS" => format!("{:03}", instant.millisecond()?),
        "a" => if instant.hour()? < 12 { "AM" } else { "PM" }.to_string(),
        "E" => instant.weekday()?.to_string(),
        "EEE" => instant.weekday_short()?,
        "EEEE" => instant.weekday_long()?,
        "W" => instant.week_number()?.to_string(),
        "WW" => format!("{:02}", instant.week_number()?),
        "kk" => format!("{:02}", instant.week_year()?.rem_euclid(100)),
        "kkkk" => format!("{:04}", instant.week_year()?),
        "q" => instant.quarter()?.to_string(),
        "qq" => format!("{:02}", instant.quarter()?),
        "Z" => narrow_offset(instant.offset_minutes()?),
        "ZZ" => {
            let minutes = instant.offset_minutes()?;
            format!("{}{:02}:{:02}", sign_of(minutes), minutes.abs() / 60, minutes.abs() % 60)
        }
        "ZZZ" => {
            let minutes = instant.offset_minutes()?;
            format!("{}{:02}{:02}", sign_of(minutes), minutes.abs() / 60, minutes.abs() % 60)
        }
        "z" => instant.zone_name()?,
        "X" => instant.epoch_millis()?.div_euclid(1000).to_string(),
        "x" => instant.epoch_millis()?.to_string(),
        _ => return None,
    };
    Some(text)
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn sign_of(minutes: i32) -> char {
    if minutes < 0 { '-' } else { '+' }
}

fn narrow_offset(minutes: i32) -> String {
    let magnitude = minutes.abs();
    if magnitude % 60 == 0 {
        format!("{}{}", sign_of(minutes), magnitude / 60)
    } else {
        format!("{}{}:{:02}", sign_of(minutes), magnitude / 60, magnitude % 60)
    }
}

// ============================================================================
// Scanning
// ============================================================================

/// Parse text against a token pattern.
///
/// Content that does not match the pattern degrades to an invalid
/// instant; mixing calendar components from incompatible date systems
/// raises.
pub fn parse(
    text: &str,
    pattern: &str,
    zone: CalendarZone,
    set_zone: bool,
) -> ExprResult<CalendarInstant> {
    let Some(scan) = scan_pattern(text, pattern) else {
        log::debug!("input {text:?} does not match pattern {pattern:?}");
        return Ok(CalendarInstant::invalid(
            "unparsable",
            format!("the input \"{text}\" can't be parsed as format \"{pattern}\""),
        ));
    };
    if let Some(ms) = scan.epoch_millis {
        return Ok(CalendarInstant::from_epoch_millis(ms as f64, zone));
    }
    let mut fields = scan.fields;
    if let Some((left, right)) = fields.conflict() {
        return Err(ExprError::ConflictingFields { left, right });
    }
    if scan.twelve_hour {
        if let (Some(hour), Some(pm)) = (fields.hour, scan.meridiem) {
            fields.hour = Some(resolve_twelve_hour(hour, pm));
        }
    }
    if let Some(name) = &scan.zone_name {
        let Some(parsed_zone) = CalendarZone::parse(name) else {
            return Ok(CalendarInstant::invalid(
                "unsupported zone",
                format!("the zone \"{name}\" is not supported"),
            ));
        };
        let instant = CalendarInstant::from_fields(&fields, parsed_zone);
        return Ok(if set_zone { instant } else { instant.with_zone(zone) });
    }
    Ok(CalendarInstant::from_parsed_fields(
        fields,
        scan.offset,
        zone,
        set_zone,
    ))
}

#[derive(Default)]
struct Scan {
    fields: DateFields,
    offset: Option<FixedOffset>,
    zone_name: Option<String>,
    meridiem: Option<bool>,
    twelve_hour: bool,
    epoch_millis: Option<i64>,
}

fn scan_pattern(text: &str, pattern: &str) -> Option<Scan> {
    let mut scan = Scan::default();
    let mut rest = text;
    for piece in lex(pattern) {
        rest = match piece {
            Piece::Literal(lit) => rest.strip_prefix(lit.as_str())?,
            Piece::Token(token) => scan_token(&mut scan, &token, rest)?,
        };
    }
    rest.is_empty().then_some(scan)
}

fn scan_token<'a>(scan: &mut Scan, token: &str, rest: &'a str) -> Option<&'a str> {
    match token {
        "y" => {
            let (year, rest) = scan_digits(rest, 1, 6)?;
            scan.fields.year = Some(year);
            Some(rest)
        }
        "yy" => {
            let (year, rest) = scan_digits(rest, 2, 2)?;
            scan.fields.year = Some(untruncate_year(year));
            Some(rest)
        }
        "yyyy" => {
            let (year, rest) = scan_digits(rest, 4, 4)?;
            scan.fields.year = Some(year);
            Some(rest)
        }
        "M" | "MM" => scan_into(rest, token.len(), 2, &mut scan.fields.month),
        "MMM" => {
            let (month, rest) = scan_name(rest, &MONTHS_SHORT)?;
            scan.fields.month = Some(month);
            Some(rest)
        }
        "MMMM" => {
            let (month, rest) = scan_name(rest, &MONTHS_LONG)?;
            scan.fields.month = Some(month);
            Some(rest)
        }
        "d" | "dd" => scan_into(rest, token.len(), 2, &mut scan.fields.day),
        "o" => scan_into(rest, 1, 3, &mut scan.fields.ordinal),
        "ooo" => scan_into(rest, 3, 3, &mut scan.fields.ordinal),
        "H" | "HH" => scan_into(rest, token.len(), 2, &mut scan.fields.hour),
        "h" | "hh" => {
            scan.twelve_hour = true;
            scan_into(rest, token.len(), 2, &mut scan.fields.hour)
        }
        "m" | "mm" => scan_into(rest, token.len(), 2, &mut scan.fields.minute),
        "s" | "ss" => scan_into(rest, token.len(), 2, &mut scan.fields.second),
        "S" => scan_into(rest, 1, 3, &mut scan.fields.millisecond),
        "SSS" => scan_into(rest, 3, 3, &mut scan.fields.millisecond),
        "a" => {
            let (pm, rest) = scan_meridiem(rest)?;
            scan.meridiem = Some(pm);
            Some(rest)
        }
        // Weekday and quarter tokens are validated but carry no
        // information the date systems don't already have.
        "E" => scan_digits(rest, 1, 1).map(|(_, rest)| rest),
        "EEE" => scan_name(rest, &WEEKDAYS_SHORT).map(|(_, rest)| rest),
        "EEEE" => scan_name(rest, &WEEKDAYS_LONG).map(|(_, rest)| rest),
        "q" | "qq" => scan_digits(rest, token.len(), 2).map(|(_, rest)| rest),
        "W" | "WW" => scan_into(rest, token.len(), 2, &mut scan.fields.week_number),
        "kk" => {
            let (year, rest) = scan_digits(rest, 2, 2)?;
            scan.fields.week_year = Some(untruncate_year(year));
            Some(rest)
        }
        "kkkk" => scan_into(rest, 4, 4, &mut scan.fields.week_year),
        "Z" | "ZZ" | "ZZZ" => {
            let (offset, rest) = scan_offset(rest)?;
            scan.offset = Some(offset);
            Some(rest)
        }
        "z" => {
            let (name, rest) = scan_zone_name(rest)?;
            scan.zone_name = Some(name.to_string());
            Some(rest)
        }
        "x" => {
            let (ms, rest) = scan_signed(rest)?;
            scan.epoch_millis = Some(ms);
            Some(rest)
        }
        "X" => {
            let (seconds, rest) = scan_signed(rest)?;
            scan.epoch_millis = Some(seconds.checked_mul(1000)?);
            Some(rest)
        }
        _ => None,
    }
}

fn scan_digits(rest: &str, min: usize, max: usize) -> Option<(i64, &str)> {
    let count = rest
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    if count < min {
        return None;
    }
    let (digits, tail) = rest.split_at(count);
    digits.parse::<i64>().ok().map(|value| (value, tail))
}

fn scan_into<'a>(
    rest: &'a str,
    min: usize,
    max: usize,
    slot: &mut Option<i64>,
) -> Option<&'a str> {
    let (value, rest) = scan_digits(rest, min, max)?;
    *slot = Some(value);
    Some(rest)
}

fn scan_signed(rest: &str) -> Option<(i64, &str)> {
    let (sign, body) = match rest.strip_prefix('-') {
        Some(body) => (-1, body),
        None => (1, rest),
    };
    let (value, tail) = scan_digits(body, 1, 17)?;
    Some((sign * value, tail))
}

fn scan_name<'a>(rest: &'a str, candidates: &[&str]) -> Option<(i64, &'a str)> {
    for (index, name) in candidates.iter().enumerate() {
        if let Some(head) = rest.get(..name.len()) {
            if head.eq_ignore_ascii_case(name) {
                return Some((index as i64 + 1, &rest[name.len()..]));
            }
        }
    }
    None
}

fn scan_meridiem(rest: &str) -> Option<(bool, &str)> {
    for (name, pm) in [("AM", false), ("PM", true)] {
        if let Some(head) = rest.get(..2) {
            if head.eq_ignore_ascii_case(name) {
                return Some((pm, &rest[2..]));
            }
        }
    }
    None
}

fn scan_offset(rest: &str) -> Option<(FixedOffset, &str)> {
    if let Some(tail) = rest.strip_prefix('Z') {
        return FixedOffset::east_opt(0).map(|offset| (offset, tail));
    }
    let bytes = rest.as_bytes();
    if bytes.first().is_none_or(|b| *b != b'+' && *b != b'-') {
        return None;
    }
    let mut end = 1;
    let mut seen_colon = false;
    while end < bytes.len() && end < 7 {
        match bytes[end] {
            b if b.is_ascii_digit() => end += 1,
            b':' if !seen_colon => {
                seen_colon = true;
                end += 1;
            }
            _ => break,
        }
    }
    if bytes.get(end - 1) == Some(&b':') {
        end -= 1;
    }
    let offset = parse_offset_spec(&rest[..end])?;
    Some((offset, &rest[end..]))
}

fn scan_zone_name(rest: &str) -> Option<(&str, &str)> {
    let end = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'+' | b'-'))
        .count();
    (end > 0).then(|| (&rest[..end], &rest[end..]))
}

fn untruncate_year(two_digit: i64) -> i64 {
    if two_digit <= 49 {
        2000 + two_digit
    } else {
        1900 + two_digit
    }
}

fn resolve_twelve_hour(hour: i64, pm: bool) -> i64 {
    match (hour % 12, pm) {
        (h, true) => h + 12,
        (h, false) => h,
    }
}
