//! Time zone handling for calendar instants.
//!
//! Zones come from four sources: the host machine (`local`), UTC, fixed
//! offsets (`UTC+3`, `+05:30`), and IANA names resolved through chrono-tz.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The zone a `CalendarInstant` derives its calendar fields in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The host machine's zone
    Local,
    /// Coordinated Universal Time
    Utc,
    /// A fixed offset east of UTC
    Fixed(FixedOffset),
    /// An IANA zone with full transition rules
    Named(Tz),
}

impl CalendarZone {
    /// Resolve a zone specifier: `local`/`system`, `utc`/`gmt` (optionally
    /// with a fixed offset, `UTC+3`, `gmt-2:30`), a bare offset
    /// (`+05:00`, `-0330`), or an IANA name.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        let lower = spec.to_ascii_lowercase();
        match lower.as_str() {
            "local" | "system" => return Some(Self::Local),
            "utc" | "gmt" => return Some(Self::Utc),
            _ => {}
        }
        for prefix in ["utc", "gmt"] {
            if let Some(rest) = lower.strip_prefix(prefix) {
                return parse_offset_spec(rest).map(Self::Fixed);
            }
        }
        if spec.starts_with(['+', '-']) {
            return parse_offset_spec(spec).map(Self::Fixed);
        }
        Tz::from_str(spec).ok().map(Self::Named)
    }

    /// The offset in force at an absolute instant.
    pub fn offset_at(&self, utc: DateTime<Utc>) -> FixedOffset {
        match self {
            Self::Local => Local.offset_from_utc_datetime(&utc.naive_utc()).fix(),
            Self::Utc => Utc.fix(),
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.offset_from_utc_datetime(&utc.naive_utc()).fix(),
        }
    }

    /// Resolve a wall-clock reading to an absolute instant.
    ///
    /// Ambiguous wall times (clock set back) take the earlier offset;
    /// nonexistent wall times (clock set forward) resolve against the
    /// offset in force at the naive time read as UTC, which lands just
    /// past the transition. `None` only for times outside the supported
    /// range.
    pub fn resolve_wall(&self, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
        let resolved = match self {
            Self::Local => earliest(Local.from_local_datetime(&wall)),
            Self::Utc => Some(Utc.from_utc_datetime(&wall)),
            Self::Fixed(offset) => earliest(offset.from_local_datetime(&wall)),
            Self::Named(tz) => earliest(tz.from_local_datetime(&wall)),
        };
        match resolved {
            Some(utc) => Some(utc),
            None => {
                let guess = self.offset_at(Utc.from_utc_datetime(&wall));
                wall.checked_sub_offset(guess).map(|n| Utc.from_utc_datetime(&n))
            }
        }
    }

    /// Whether the offset never varies (`isOffsetFixed` property).
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Utc | Self::Fixed(_))
    }

    /// Display name: `local`, `UTC`, `UTC+3` / `UTC+3:30`, or the IANA
    /// name.
    pub fn name(&self) -> String {
        match self {
            Self::Local => "local".to_string(),
            Self::Utc => "UTC".to_string(),
            Self::Fixed(offset) => {
                let total = offset.local_minus_utc();
                if total == 0 {
                    return "UTC".to_string();
                }
                let sign = if total < 0 { '-' } else { '+' };
                let minutes = total.abs() / 60;
                if minutes % 60 == 0 {
                    format!("UTC{sign}{}", minutes / 60)
                } else {
                    format!("UTC{sign}{}:{:02}", minutes / 60, minutes % 60)
                }
            }
            Self::Named(tz) => tz.name().to_string(),
        }
    }
}

fn earliest<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<DateTime<Utc>> {
    match result {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Parse `±H`, `±HH`, `±H:MM`, `±HH:MM`, or `±HHMM` into a fixed offset.
pub fn parse_offset_spec(spec: &str) -> Option<FixedOffset> {
    let rest = spec.strip_prefix(['+', '-'])?;
    let sign: i32 = if spec.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => {
            if h.is_empty() || h.len() > 2 || m.len() != 2 {
                return None;
            }
            (h, m)
        }
        None => match rest.len() {
            1 | 2 => (rest, "0"),
            4 => (&rest[..2], &rest[2..]),
            _ => return None,
        },
    };
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Serialize for CalendarZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for CalendarZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        Self::parse(&spec).ok_or_else(|| D::Error::custom(format!("unrecognized zone '{spec}'")))
    }
}
