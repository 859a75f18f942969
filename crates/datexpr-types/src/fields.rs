//! Named calendar field bundles.
//!
//! A `DateFields` value is the decoded form of a plain-object date and of
//! the `$dateSet` overwrite argument. Text parsing fills one too: pattern
//! tokens and partial ISO forms set some components and the rest follow
//! the completion rules here.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Optional calendar components, all read in some zone's wall clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFields {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub ordinal: Option<i64>,
    pub week_year: Option<i64>,
    pub week_number: Option<i64>,
    pub weekday: Option<i64>,
    pub hour: Option<i64>,
    pub minute: Option<i64>,
    pub second: Option<i64>,
    pub millisecond: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Year,
    Month,
    Day,
    Ordinal,
    WeekYear,
    WeekNumber,
    Weekday,
    Hour,
    Minute,
    Second,
    Millisecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSystem {
    Gregorian,
    Week,
    Ordinal,
}

const GREGORIAN_LADDER: &[Component] = &[
    Component::Year,
    Component::Month,
    Component::Day,
    Component::Hour,
    Component::Minute,
    Component::Second,
    Component::Millisecond,
];

const WEEK_LADDER: &[Component] = &[
    Component::WeekYear,
    Component::WeekNumber,
    Component::Weekday,
    Component::Hour,
    Component::Minute,
    Component::Second,
    Component::Millisecond,
];

const ORDINAL_LADDER: &[Component] = &[
    Component::Year,
    Component::Ordinal,
    Component::Hour,
    Component::Minute,
    Component::Second,
    Component::Millisecond,
];

fn minimum(component: Component) -> i64 {
    match component {
        Component::Year | Component::WeekYear => 1,
        Component::Month | Component::Day | Component::Ordinal => 1,
        Component::WeekNumber | Component::Weekday => 1,
        Component::Hour | Component::Minute | Component::Second | Component::Millisecond => 0,
    }
}

impl DateFields {
    /// A fully populated bundle (all three date systems) for a wall-clock
    /// reading; used as the completion base.
    pub fn from_wall(wall: NaiveDateTime) -> Self {
        let date = wall.date();
        let week = date.iso_week();
        Self {
            year: Some(date.year().into()),
            month: Some(date.month().into()),
            day: Some(date.day().into()),
            ordinal: Some(date.ordinal().into()),
            week_year: Some(week.year().into()),
            week_number: Some(week.week().into()),
            weekday: Some(date.weekday().number_from_monday().into()),
            hour: Some(wall.hour().into()),
            minute: Some(wall.minute().into()),
            second: Some(wall.second().into()),
            millisecond: Some(i64::from((wall.nanosecond() / 1_000_000).min(999))),
        }
    }

    /// Set a component by its external name (case-insensitive, singular or
    /// plural). Returns `false` for unrecognized names.
    pub fn set_named(&mut self, key: &str, value: i64) -> bool {
        match key.to_ascii_lowercase().as_str() {
            "year" | "years" => self.year = Some(value),
            "month" | "months" => self.month = Some(value),
            "day" | "days" => self.day = Some(value),
            "ordinal" | "ordinals" => self.ordinal = Some(value),
            "weekyear" | "weekyears" => self.week_year = Some(value),
            "weeknumber" | "weeknumbers" => self.week_number = Some(value),
            "weekday" | "weekdays" => self.weekday = Some(value),
            "hour" | "hours" => self.hour = Some(value),
            "minute" | "minutes" => self.minute = Some(value),
            "second" | "seconds" => self.second = Some(value),
            "millisecond" | "milliseconds" => self.millisecond = Some(value),
            _ => return false,
        }
        true
    }

    /// Incompatible component groups, reported as a pair of group names.
    pub fn conflict(&self) -> Option<(&'static str, &'static str)> {
        let week = self.week_year.is_some() || self.week_number.is_some() || self.weekday.is_some();
        let gregorian = self.year.is_some() || self.month.is_some() || self.day.is_some();
        if week && (gregorian || self.ordinal.is_some()) {
            return Some(("weekYear/weekNumber/weekday", "year/month/day/ordinal"));
        }
        if self.ordinal.is_some() && (self.month.is_some() || self.day.is_some()) {
            return Some(("ordinal", "month/day"));
        }
        None
    }

    /// Complete missing components: units above the highest one given come
    /// from `now`, units below default to their minimum. Components outside
    /// the bundle's date system are cleared.
    pub fn fill_from(&self, now: NaiveDateTime) -> Self {
        let base = Self::from_wall(now);
        let mut out = Self::default();
        let mut seen = false;
        for &component in self.ladder() {
            let value = match self.get(component) {
                Some(v) => {
                    seen = true;
                    Some(v)
                }
                None if !seen => base.get(component),
                None => Some(minimum(component)),
            };
            out.set(component, value);
        }
        out
    }

    /// Complete missing components from an existing wall-clock reading:
    /// everything unstated is kept (the `$dateSet` merge rule). A day
    /// carried from the base clamps to the merged month's length; a day
    /// stated in the overlay never does.
    pub fn overlay_on(&self, base: NaiveDateTime) -> Self {
        let base = Self::from_wall(base);
        let mut out = Self::default();
        for &component in self.ladder() {
            out.set(component, self.get(component).or_else(|| base.get(component)));
        }
        if self.system() == DateSystem::Gregorian && self.day.is_none() {
            if let (Some(year), Some(month)) = (
                out.year.and_then(to_i32),
                out.month.and_then(to_u32).filter(|m| (1..=12).contains(m)),
            ) {
                let limit = i64::from(days_in_month(year, month));
                out.day = out.day.map(|day| day.min(limit));
            }
        }
        out
    }

    /// Build the wall-clock reading. `None` when a component is missing or
    /// out of range for its slot.
    pub fn to_wall(&self) -> Option<NaiveDateTime> {
        let date = match self.system() {
            DateSystem::Gregorian => {
                NaiveDate::from_ymd_opt(to_i32(self.year?)?, to_u32(self.month?)?, to_u32(self.day?)?)?
            }
            DateSystem::Ordinal => NaiveDate::from_yo_opt(to_i32(self.year?)?, to_u32(self.ordinal?)?)?,
            DateSystem::Week => {
                let weekday = match self.weekday? {
                    n @ 1..=7 => Weekday::try_from((n - 1) as u8).ok()?,
                    _ => return None,
                };
                NaiveDate::from_isoywd_opt(to_i32(self.week_year?)?, to_u32(self.week_number?)?, weekday)?
            }
        };
        let time = NaiveTime::from_hms_milli_opt(
            to_u32(self.hour?)?,
            to_u32(self.minute?)?,
            to_u32(self.second?)?,
            to_u32(self.millisecond?)?,
        )?;
        Some(date.and_time(time))
    }

    fn system(&self) -> DateSystem {
        if self.week_year.is_some() || self.week_number.is_some() || self.weekday.is_some() {
            DateSystem::Week
        } else if self.ordinal.is_some() {
            DateSystem::Ordinal
        } else {
            DateSystem::Gregorian
        }
    }

    fn ladder(&self) -> &'static [Component] {
        match self.system() {
            DateSystem::Gregorian => GREGORIAN_LADDER,
            DateSystem::Week => WEEK_LADDER,
            DateSystem::Ordinal => ORDINAL_LADDER,
        }
    }

    fn get(&self, component: Component) -> Option<i64> {
        match component {
            Component::Year => self.year,
            Component::Month => self.month,
            Component::Day => self.day,
            Component::Ordinal => self.ordinal,
            Component::WeekYear => self.week_year,
            Component::WeekNumber => self.week_number,
            Component::Weekday => self.weekday,
            Component::Hour => self.hour,
            Component::Minute => self.minute,
            Component::Second => self.second,
            Component::Millisecond => self.millisecond,
        }
    }

    fn set(&mut self, component: Component, value: Option<i64>) {
        match component {
            Component::Year => self.year = value,
            Component::Month => self.month = value,
            Component::Day => self.day = value,
            Component::Ordinal => self.ordinal = value,
            Component::WeekYear => self.week_year = value,
            Component::WeekNumber => self.week_number = value,
            Component::Weekday => self.weekday = value,
            Component::Hour => self.hour = value,
            Component::Minute => self.minute = value,
            Component::Second => self.second = value,
            Component::Millisecond => self.millisecond = value,
        }
    }
}

fn to_i32(value: i64) -> Option<i32> {
    i32::try_from(value).ok()
}

fn to_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
