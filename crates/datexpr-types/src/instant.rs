//! Calendar-aware instants.
//!
//! A `CalendarInstant` couples an absolute UTC timestamp (millisecond
//! resolution) with the zone its calendar fields are derived in. Content
//! that fails to parse produces an *invalid* instant carrying a reason;
//! invalid instants flow through every operation instead of raising, so
//! validity can be observed downstream.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::{days_in_month, is_leap_year};
use crate::zone::parse_offset_spec;
use crate::{CalendarDuration, CalendarUnit, CalendarZone, DateFields};

/// Why an instant is invalid: a short machine-readable code plus a human
/// explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidReason {
    pub code: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum Repr {
    Valid { utc: DateTime<Utc>, zone: CalendarZone },
    Invalid { reason: InvalidReason },
}

/// An absolute instant paired with its rendering zone, or an invalid
/// marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInstant {
    repr: Repr,
}

// ============================================================================
// Construction
// ============================================================================

impl CalendarInstant {
    /// Wrap an absolute timestamp, truncating to millisecond resolution.
    pub fn from_utc(utc: DateTime<Utc>, zone: CalendarZone) -> Self {
        let truncated = utc
            .with_nanosecond((utc.nanosecond() / 1_000_000).min(999) * 1_000_000)
            .unwrap_or(utc);
        Self {
            repr: Repr::Valid { utc: truncated, zone },
        }
    }

    /// The current instant, rendered in the host machine's zone.
    pub fn now() -> Self {
        Self::from_utc(Utc::now(), CalendarZone::Local)
    }

    /// An invalid instant with a reason code and explanation.
    pub fn invalid(code: &str, explanation: impl Into<String>) -> Self {
        Self {
            repr: Repr::Invalid {
                reason: InvalidReason {
                    code: code.to_string(),
                    explanation: explanation.into(),
                },
            },
        }
    }

    pub fn from_epoch_millis(ms: f64, zone: CalendarZone) -> Self {
        if !ms.is_finite() {
            return Self::invalid(
                "invalid input",
                format!("epoch milliseconds must be finite, got {ms}"),
            );
        }
        let ms = ms.trunc();
        if ms < i64::MIN as f64 || ms > i64::MAX as f64 {
            return Self::overflowed();
        }
        match DateTime::<Utc>::from_timestamp_millis(ms as i64) {
            Some(utc) => Self::from_utc(utc, zone),
            None => Self::overflowed(),
        }
    }

    pub fn from_epoch_seconds(seconds: f64, zone: CalendarZone) -> Self {
        if !seconds.is_finite() {
            return Self::invalid(
                "invalid input",
                format!("epoch seconds must be finite, got {seconds}"),
            );
        }
        // Round rather than truncate: a millisecond-precision fraction must
        // survive the float multiplication (0.02 s is exactly 20 ms).
        Self::from_epoch_millis((seconds * 1000.0).round(), zone)
    }

    pub fn from_system_time(st: SystemTime, zone: CalendarZone) -> Self {
        let ms: i128 = match st.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i128,
            Err(e) => -(e.duration().as_millis() as i128),
        };
        match i64::try_from(ms) {
            Ok(ms) => Self::from_epoch_millis(ms as f64, zone),
            Err(_) => Self::overflowed(),
        }
    }

    /// Resolve a wall-clock reading in a zone (see
    /// `CalendarZone::resolve_wall` for the gap/fold rules).
    pub fn from_wall(wall: NaiveDateTime, zone: CalendarZone) -> Self {
        match zone.resolve_wall(wall) {
            Some(utc) => Self::from_utc(utc, zone),
            None => Self::overflowed(),
        }
    }

    /// Build from a named field bundle, completing missing components from
    /// the current wall clock in `zone`.
    pub fn from_fields(fields: &DateFields, zone: CalendarZone) -> Self {
        Self::from_parsed_fields(*fields, None, zone, false)
    }

    /// Build from components scanned out of text.
    ///
    /// `text_offset` is the offset the text itself carried, if any: the
    /// wall-clock components are interpreted at that offset, and with
    /// `set_zone` it becomes the instant's zone instead of `zone`.
    pub fn from_parsed_fields(
        fields: DateFields,
        text_offset: Option<FixedOffset>,
        zone: CalendarZone,
        set_zone: bool,
    ) -> Self {
        let interp = match text_offset {
            Some(offset) => CalendarZone::Fixed(offset),
            None => zone,
        };
        let filled = fields.fill_from(wall_now(interp));
        let Some(wall) = filled.to_wall() else {
            return Self::invalid("unit out of range", "a calendar component is out of range");
        };
        let target = if set_zone { interp } else { zone };
        Self::from_wall(wall, interp).with_zone(target)
    }

    fn overflowed() -> Self {
        Self::invalid(
            "datetime out of range",
            "the instant is outside the supported range",
        )
    }
}

// ============================================================================
// Text grammars
// ============================================================================

impl CalendarInstant {
    /// ISO-8601: calendar, ordinal, and week dates at any truncation,
    /// optional time, optional offset, or time-only text.
    pub fn parse_iso(text: &str, zone: CalendarZone, set_zone: bool) -> Self {
        match iso_components(text) {
            Some((fields, offset)) => Self::from_parsed_fields(fields, offset, zone, set_zone),
            None => Self::invalid(
                "unparsable",
                format!("the input \"{text}\" can't be parsed as ISO 8601"),
            ),
        }
    }

    /// RFC 2822, e.g. `Fri, 12 Feb 2021 15:34:15 +0000`.
    pub fn parse_rfc2822(text: &str, zone: CalendarZone, set_zone: bool) -> Self {
        match DateTime::parse_from_rfc2822(text.trim()) {
            Ok(dt) => {
                let target = if set_zone {
                    CalendarZone::Fixed(*dt.offset())
                } else {
                    zone
                };
                Self::from_utc(dt.with_timezone(&Utc), target)
            }
            Err(_) => Self::invalid(
                "unparsable",
                format!("the input \"{text}\" can't be parsed as RFC 2822"),
            ),
        }
    }

    /// HTTP-date (RFC 7231): IMF-fixdate, RFC 850, or asctime. Always GMT.
    pub fn parse_http(text: &str, zone: CalendarZone, set_zone: bool) -> Self {
        const HTTP_FORMATS: &[&str] = &[
            "%a, %d %b %Y %H:%M:%S GMT",
            "%A, %d-%b-%y %H:%M:%S GMT",
            "%a %b %e %H:%M:%S %Y",
        ];
        let trimmed = text.trim();
        for format in HTTP_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                let target = if set_zone { CalendarZone::Utc } else { zone };
                return Self::from_utc(Utc.from_utc_datetime(&naive), target);
            }
        }
        Self::invalid(
            "unparsable",
            format!("the input \"{text}\" can't be parsed as an HTTP date"),
        )
    }

    /// SQL date/time literals: `yyyy-MM-dd[ HH:mm[:ss[.SSS]]][ ±HH:MM]`
    /// or a bare time.
    pub fn parse_sql(text: &str, zone: CalendarZone, set_zone: bool) -> Self {
        let (body, offset) = split_sql_offset(text);
        let fields = (|| {
            if let Ok(dt) = NaiveDateTime::parse_from_str(body, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(merge_fields(gregorian_fields(dt.date()), time_fields(dt.time())));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(body, "%Y-%m-%d %H:%M") {
                return Some(merge_fields(gregorian_fields(dt.date()), time_fields(dt.time())));
            }
            if let Ok(date) = NaiveDate::parse_from_str(body, "%Y-%m-%d") {
                return Some(gregorian_fields(date));
            }
            if let Ok(time) = NaiveTime::parse_from_str(body, "%H:%M:%S%.f") {
                return Some(time_fields(time));
            }
            if let Ok(time) = NaiveTime::parse_from_str(body, "%H:%M") {
                return Some(time_fields(time));
            }
            None
        })();
        match fields {
            Some(fields) => Self::from_parsed_fields(fields, offset, zone, set_zone),
            None => Self::invalid(
                "unparsable",
                format!("the input \"{text}\" can't be parsed as SQL"),
            ),
        }
    }
}

fn iso_components(text: &str) -> Option<(DateFields, Option<FixedOffset>)> {
    if text.is_empty() {
        return None;
    }
    if let Some(time) = text.strip_prefix(['T', 't']) {
        return parse_iso_time(time);
    }
    match text.find(['T', 't']) {
        Some(split) => {
            let date = parse_iso_date(&text[..split])?;
            let (time, offset) = parse_iso_time(&text[split + 1..])?;
            Some((merge_fields(date, time), offset))
        }
        None if text.contains(':') => parse_iso_time(text),
        None => parse_iso_date(text).map(|fields| (fields, None)),
    }
}

/// `yyyy`, `±yyyyyy`, `yyyy-MM[-dd]`, `yyyy-Www[-d]`, or `yyyy-ooo`,
/// with the separators optional.
fn parse_iso_date(part: &str) -> Option<DateFields> {
    let (year, rest) = if part.starts_with(['+', '-']) {
        let sign = if part.starts_with('-') { -1 } else { 1 };
        let (year, rest) = take_digits(&part[1..], 6)?;
        (sign * year, rest)
    } else {
        take_digits(part, 4)?
    };
    let mut fields = DateFields {
        year: Some(year),
        ..Default::default()
    };
    if rest.is_empty() {
        return Some(fields);
    }

    if let Some(week_rest) = rest.strip_prefix("-W").or_else(|| rest.strip_prefix('W')) {
        let (week, rest) = take_digits(week_rest, 2)?;
        fields.year = None;
        fields.week_year = Some(year);
        fields.week_number = Some(week);
        if rest.is_empty() {
            return Some(fields);
        }
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        let (weekday, rest) = take_digits(rest, 1)?;
        if !rest.is_empty() {
            return None;
        }
        fields.weekday = Some(weekday);
        return Some(fields);
    }

    let rest = rest.strip_prefix('-').unwrap_or(rest);
    if rest.len() == 3 && rest.bytes().all(|b| b.is_ascii_digit()) {
        let (ordinal, _) = take_digits(rest, 3)?;
        fields.ordinal = Some(ordinal);
        return Some(fields);
    }
    let (month, rest) = take_digits(rest, 2)?;
    fields.month = Some(month);
    if rest.is_empty() {
        return Some(fields);
    }
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let (day, rest) = take_digits(rest, 2)?;
    if !rest.is_empty() {
        return None;
    }
    fields.day = Some(day);
    Some(fields)
}

/// `HH[:mm[:ss[.SSS]]]` with the colons optional, plus an optional
/// trailing offset.
fn parse_iso_time(part: &str) -> Option<(DateFields, Option<FixedOffset>)> {
    let (clock, offset) = split_iso_offset(part)?;
    let mut fields = DateFields::default();
    let (hour, mut rest) = take_digits(clock, 2)?;
    fields.hour = Some(hour);
    if !rest.is_empty() && !rest.starts_with(['.', ',']) {
        let tail = rest.strip_prefix(':').unwrap_or(rest);
        let (minute, tail) = take_digits(tail, 2)?;
        fields.minute = Some(minute);
        rest = tail;
        if !rest.is_empty() && !rest.starts_with(['.', ',']) {
            let tail = rest.strip_prefix(':').unwrap_or(rest);
            let (second, tail) = take_digits(tail, 2)?;
            fields.second = Some(second);
            rest = tail;
        }
    }
    if let Some(fraction) = rest.strip_prefix(['.', ',']) {
        if fields.second.is_none()
            || fraction.is_empty()
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let head: String = fraction.chars().take(3).collect();
        fields.millisecond = Some(format!("{head:0<3}").parse().ok()?);
        rest = "";
    }
    if !rest.is_empty() {
        return None;
    }
    Some((fields, offset))
}

fn split_iso_offset(text: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(head) = text.strip_suffix(['Z', 'z']) {
        return Some((head, FixedOffset::east_opt(0)));
    }
    match text.find(['+', '-']) {
        Some(idx) => {
            let offset = parse_offset_spec(&text[idx..])?;
            Some((&text[..idx], Some(offset)))
        }
        None => Some((text, None)),
    }
}

fn split_sql_offset(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some(idx) = text.rfind(' ') {
        let tail = &text[idx + 1..];
        if tail.starts_with(['+', '-']) {
            if let Some(offset) = parse_offset_spec(tail) {
                return (&text[..idx], Some(offset));
            }
        }
    }
    (text, None)
}

/// Read exactly `n` ASCII digits off the front.
fn take_digits(s: &str, n: usize) -> Option<(i64, &str)> {
    if s.len() < n || !s.as_bytes()[..n].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let (digits, rest) = s.split_at(n);
    digits.parse::<i64>().ok().map(|value| (value, rest))
}

fn gregorian_fields(date: NaiveDate) -> DateFields {
    DateFields {
        year: Some(date.year().into()),
        month: Some(date.month().into()),
        day: Some(date.day().into()),
        ..Default::default()
    }
}

fn time_fields(time: NaiveTime) -> DateFields {
    DateFields {
        hour: Some(time.hour().into()),
        minute: Some(time.minute().into()),
        second: Some(time.second().into()),
        millisecond: Some(i64::from((time.nanosecond() / 1_000_000).min(999))),
        ..Default::default()
    }
}

fn merge_fields(date: DateFields, time: DateFields) -> DateFields {
    DateFields {
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        millisecond: time.millisecond,
        ..date
    }
}

/// The current wall-clock reading in a zone.
fn wall_now(zone: CalendarZone) -> NaiveDateTime {
    let now = Utc::now();
    now.naive_utc()
        .checked_add_offset(zone.offset_at(now))
        .unwrap_or_else(|| now.naive_utc())
}

// ============================================================================
// Accessors
// ============================================================================

impl CalendarInstant {
    pub fn is_valid(&self) -> bool {
        matches!(self.repr, Repr::Valid { .. })
    }

    pub fn invalid_reason(&self) -> Option<&InvalidReason> {
        match &self.repr {
            Repr::Invalid { reason } => Some(reason),
            Repr::Valid { .. } => None,
        }
    }

    pub fn zone(&self) -> Option<CalendarZone> {
        match &self.repr {
            Repr::Valid { zone, .. } => Some(*zone),
            Repr::Invalid { .. } => None,
        }
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match &self.repr {
            Repr::Valid { utc, .. } => Some(*utc),
            Repr::Invalid { .. } => None,
        }
    }

    pub fn epoch_millis(&self) -> Option<i64> {
        self.to_utc().map(|utc| utc.timestamp_millis())
    }

    pub fn epoch_seconds(&self) -> Option<f64> {
        self.epoch_millis().map(|ms| ms as f64 / 1000.0)
    }

    /// The wall-clock projection: the instant at the offset its zone has
    /// in force.
    pub fn local(&self) -> Option<DateTime<FixedOffset>> {
        let Repr::Valid { utc, zone } = &self.repr else {
            return None;
        };
        Some(utc.with_timezone(&zone.offset_at(*utc)))
    }

    pub fn year(&self) -> Option<i32> {
        self.local().map(|l| l.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.local().map(|l| l.month())
    }

    pub fn day(&self) -> Option<u32> {
        self.local().map(|l| l.day())
    }

    pub fn ordinal(&self) -> Option<u32> {
        self.local().map(|l| l.ordinal())
    }

    pub fn hour(&self) -> Option<u32> {
        self.local().map(|l| l.hour())
    }

    pub fn minute(&self) -> Option<u32> {
        self.local().map(|l| l.minute())
    }

    pub fn second(&self) -> Option<u32> {
        self.local().map(|l| l.second())
    }

    pub fn millisecond(&self) -> Option<u32> {
        self.local().map(|l| l.timestamp_subsec_millis().min(999))
    }

    /// ISO weekday, 1 = Monday through 7 = Sunday.
    pub fn weekday(&self) -> Option<u32> {
        self.local().map(|l| l.weekday().number_from_monday())
    }

    pub fn weekday_long(&self) -> Option<String> {
        self.local().map(|l| l.format("%A").to_string())
    }

    pub fn weekday_short(&self) -> Option<String> {
        self.local().map(|l| l.format("%a").to_string())
    }

    pub fn month_long(&self) -> Option<String> {
        self.local().map(|l| l.format("%B").to_string())
    }

    pub fn month_short(&self) -> Option<String> {
        self.local().map(|l| l.format("%b").to_string())
    }

    pub fn week_number(&self) -> Option<u32> {
        self.local().map(|l| l.iso_week().week())
    }

    pub fn week_year(&self) -> Option<i32> {
        self.local().map(|l| l.iso_week().year())
    }

    pub fn weeks_in_week_year(&self) -> Option<u32> {
        let week_year = self.week_year()?;
        // December 28th always falls in the last ISO week of its year.
        Some(NaiveDate::from_ymd_opt(week_year, 12, 28)?.iso_week().week())
    }

    pub fn quarter(&self) -> Option<u32> {
        self.month().map(|m| (m - 1) / 3 + 1)
    }

    pub fn days_in_month(&self) -> Option<u32> {
        let local = self.local()?;
        Some(days_in_month(local.year(), local.month()))
    }

    pub fn days_in_year(&self) -> Option<u32> {
        self.is_in_leap_year().map(|leap| if leap { 366 } else { 365 })
    }

    pub fn is_in_leap_year(&self) -> Option<bool> {
        self.year().map(is_leap_year)
    }

    /// Offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> Option<i32> {
        self.local().map(|l| l.offset().local_minus_utc() / 60)
    }

    pub fn zone_name(&self) -> Option<String> {
        self.zone().map(|zone| zone.name())
    }

    pub fn is_offset_fixed(&self) -> Option<bool> {
        self.zone().map(|zone| zone.is_fixed())
    }

    /// Whether the current offset is ahead of the zone's standard offset,
    /// sampled at January 1st and July 1st of the instant's year.
    pub fn is_in_dst(&self) -> Option<bool> {
        let utc = self.to_utc()?;
        let zone = self.zone()?;
        let year = self.year()?;
        let jan = zone.resolve_wall(NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?)?;
        let jul = zone.resolve_wall(NaiveDate::from_ymd_opt(year, 7, 1)?.and_hms_opt(0, 0, 0)?)?;
        let offset_at = |at: DateTime<Utc>| zone.offset_at(at).local_minus_utc();
        Some(offset_at(utc) > offset_at(jan).min(offset_at(jul)))
    }
}

// ============================================================================
// Transformations
// ============================================================================

impl CalendarInstant {
    /// Reproject into another zone; the absolute instant is preserved.
    pub fn with_zone(&self, zone: CalendarZone) -> Self {
        match &self.repr {
            Repr::Valid { utc, .. } => Self::from_utc(*utc, zone),
            Repr::Invalid { .. } => self.clone(),
        }
    }

    /// Reproject by zone specifier; an unresolvable specifier degrades the
    /// instant to invalid.
    pub fn with_zone_named(&self, spec: &str) -> Self {
        if !self.is_valid() {
            return self.clone();
        }
        match CalendarZone::parse(spec) {
            Some(zone) => self.with_zone(zone),
            None => Self::invalid("unsupported zone", format!("the zone \"{spec}\" is not supported")),
        }
    }

    /// Floor to the start of a calendar unit, in the instant's zone.
    pub fn start_of(&self, unit: CalendarUnit) -> Self {
        let Repr::Valid { zone, .. } = &self.repr else {
            return self.clone();
        };
        let zone = *zone;
        let Some(local) = self.local() else {
            return self.clone();
        };
        match floor_wall(local.naive_local(), unit) {
            Some(wall) => Self::from_wall(wall, zone),
            None => Self::overflowed(),
        }
    }

    /// The last representable millisecond of the unit containing this
    /// instant: start of the next unit minus one millisecond.
    pub fn end_of(&self, unit: CalendarUnit) -> Self {
        if !self.is_valid() {
            return self.clone();
        }
        let mut one = CalendarDuration::default();
        one.set(unit, 1.0);
        let mut back = CalendarDuration::default();
        back.milliseconds = -1.0;
        self.shift(&one).start_of(unit).shift(&back)
    }

    /// Overwrite the named calendar fields, keeping the rest. A carried
    /// day clamps to the new month's length; a stated out-of-range field
    /// comes back invalid.
    pub fn with_fields(&self, fields: &DateFields) -> Self {
        let Repr::Valid { zone, .. } = &self.repr else {
            return self.clone();
        };
        let zone = *zone;
        let Some(local) = self.local() else {
            return self.clone();
        };
        match fields.overlay_on(local.naive_local()).to_wall() {
            Some(wall) => Self::from_wall(wall, zone),
            None => Self::invalid("unit out of range", "a calendar component is out of range"),
        }
    }

    /// Calendar-aware shift: months first (clamping the day to the target
    /// month's length), then days, then the clock components as absolute
    /// milliseconds. All in the instant's own zone.
    pub fn shift(&self, duration: &CalendarDuration) -> Self {
        let Repr::Valid { zone, .. } = &self.repr else {
            return self.clone();
        };
        let zone = *zone;
        let Some(local) = self.local() else {
            return self.clone();
        };
        let mut wall = local.naive_local();

        let months = duration.total_months();
        if months != 0 {
            let Some(date) = add_months(wall.date(), months) else {
                return Self::overflowed();
            };
            wall = date.and_time(wall.time());
        }
        let days = duration.total_days();
        if days != 0 {
            let shifted = if days >= 0 {
                wall.date().checked_add_days(Days::new(days as u64))
            } else {
                wall.date().checked_sub_days(Days::new(days.unsigned_abs()))
            };
            let Some(date) = shifted else {
                return Self::overflowed();
            };
            wall = date.and_time(wall.time());
        }

        let base = if months != 0 || days != 0 {
            Self::from_wall(wall, zone)
        } else {
            self.clone()
        };
        let clock = duration.total_clock_millis();
        if clock == 0 {
            return base;
        }
        let Some(base_utc) = base.to_utc() else {
            return base;
        };
        match Duration::try_milliseconds(clock).and_then(|d| base_utc.checked_add_signed(d)) {
            Some(shifted) => Self::from_utc(shifted, zone),
            None => Self::overflowed(),
        }
    }

    /// Absolute ordering; `None` when either side is invalid.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.to_utc()?.cmp(&other.to_utc()?))
    }

    /// Whether both instants fall inside the same `unit`, floored in
    /// *this* instant's zone.
    pub fn same_as(&self, other: &Self, unit: CalendarUnit) -> bool {
        let Some(zone) = self.zone() else {
            return false;
        };
        if !other.is_valid() {
            return false;
        }
        let ours = self.start_of(unit).to_utc();
        let theirs = other.with_zone(zone).start_of(unit).to_utc();
        match (ours, theirs) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

fn floor_wall(local: NaiveDateTime, unit: CalendarUnit) -> Option<NaiveDateTime> {
    let date = local.date();
    let wall = match unit {
        CalendarUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
        CalendarUnit::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), month, 1)?.and_hms_opt(0, 0, 0)?
        }
        CalendarUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_hms_opt(0, 0, 0)?,
        CalendarUnit::Week => date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))?
            .and_hms_opt(0, 0, 0)?,
        CalendarUnit::Day => date.and_hms_opt(0, 0, 0)?,
        CalendarUnit::Hour => local.with_minute(0)?.with_second(0)?.with_nanosecond(0)?,
        CalendarUnit::Minute => local.with_second(0)?.with_nanosecond(0)?,
        CalendarUnit::Second => local.with_nanosecond(0)?,
        CalendarUnit::Millisecond => local,
    };
    Some(wall)
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl CalendarInstant {
    /// Offset suffix for ISO renderings: `Z` for fixed zero-offset zones,
    /// `±HH:MM` otherwise.
    pub fn iso_offset_suffix(&self) -> Option<String> {
        let local = self.local()?;
        let zone = self.zone()?;
        if local.offset().local_minus_utc() == 0 && zone.is_fixed() {
            Some("Z".to_string())
        } else {
            Some(local.format("%:z").to_string())
        }
    }

    /// Full ISO-8601 rendering. `suppress_milliseconds` drops the
    /// fractional part only when it is zero.
    pub fn to_iso8601_with(&self, suppress_milliseconds: bool, include_offset: bool) -> Option<String> {
        let local = self.local()?;
        let mut out = local.format("%Y-%m-%dT%H:%M:%S").to_string();
        let millis = local.timestamp_subsec_millis().min(999);
        if !(suppress_milliseconds && millis == 0) {
            out.push_str(&format!(".{millis:03}"));
        }
        if include_offset {
            out.push_str(&self.iso_offset_suffix()?);
        }
        Some(out)
    }

    pub fn to_iso8601(&self) -> Option<String> {
        self.to_iso8601_with(false, true)
    }
}

impl fmt::Display for CalendarInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso8601() {
            Some(iso) => f.write_str(&iso),
            None => f.write_str("Invalid DateTime"),
        }
    }
}
