//! Signed calendar durations for `$dateMoveForward` / `$dateMoveBackward`.

use serde::{Deserialize, Serialize};

use crate::CalendarUnit;

const DAY_MILLIS: f64 = 86_400_000.0;

/// A component-wise signed duration.
///
/// Components stay separate so the calendar-aware part (years through
/// days) can use calendar arithmetic while the clock part collapses to
/// absolute milliseconds. Only the whole part of a calendar component
/// walks the calendar; its fractional remainder folds into the clock
/// part at fixed lengths (a year is 365 days, a quarter 91, a month 30,
/// a week 7, a day 24 hours).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarDuration {
    pub years: f64,
    pub quarters: f64,
    pub months: f64,
    pub weeks: f64,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub milliseconds: f64,
}

impl CalendarDuration {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Every component negated; a backward move runs the forward path on
    /// the negated duration.
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            quarters: -self.quarters,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            milliseconds: -self.milliseconds,
        }
    }

    pub fn set(&mut self, unit: CalendarUnit, count: f64) {
        match unit {
            CalendarUnit::Year => self.years = count,
            CalendarUnit::Quarter => self.quarters = count,
            CalendarUnit::Month => self.months = count,
            CalendarUnit::Week => self.weeks = count,
            CalendarUnit::Day => self.days = count,
            CalendarUnit::Hour => self.hours = count,
            CalendarUnit::Minute => self.minutes = count,
            CalendarUnit::Second => self.seconds = count,
            CalendarUnit::Millisecond => self.milliseconds = count,
        }
    }

    /// Whole months carried by the calendar components.
    pub fn total_months(&self) -> i64 {
        whole(self.years)
            .saturating_mul(12)
            .saturating_add(whole(self.quarters).saturating_mul(3))
            .saturating_add(whole(self.months))
    }

    /// Whole days carried by the week/day components.
    pub fn total_days(&self) -> i64 {
        whole(self.weeks).saturating_mul(7).saturating_add(whole(self.days))
    }

    /// Clock components plus every fractional calendar remainder,
    /// collapsed to milliseconds and rounded.
    pub fn total_clock_millis(&self) -> i64 {
        let clock = self.hours * 3_600_000.0
            + self.minutes * 60_000.0
            + self.seconds * 1_000.0
            + self.milliseconds;
        let folded = self.years.fract() * 365.0 * DAY_MILLIS
            + self.quarters.fract() * 91.0 * DAY_MILLIS
            + self.months.fract() * 30.0 * DAY_MILLIS
            + self.weeks.fract() * 7.0 * DAY_MILLIS
            + self.days.fract() * DAY_MILLIS;
        (clock + folded).round() as i64
    }
}

fn whole(count: f64) -> i64 {
    count.trunc() as i64
}
