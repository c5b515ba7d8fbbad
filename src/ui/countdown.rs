//! Countdown to the next X-Day

use core::{fmt, iter};

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

use crate::system::config::AnnualTarget;

/// Years to look ahead for a target that only exists in some years
const LOOKAHEAD_YEARS: i32 = 8;

/// Next time `target` comes around, at or after `now`.
///
/// A February 29th target skips to the next leap year. `None` if the date
/// never exists (February 30th).
pub fn next_occurrence(now: &NaiveDateTime, target: &AnnualTarget) -> Option<NaiveDateTime> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, target.month, target.day)?.and_hms_opt(
            target.hour,
            target.minute,
            target.second,
        )
    };

    (now.year()..=now.year() + LOOKAHEAD_YEARS)
        .filter_map(in_year)
        .find(|next| next >= now)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Unit::Day => "Day",
            Unit::Hour => "Hour",
            Unit::Minute => "Minute",
            Unit::Second => "Second",
        })
    }
}

/// One line of countdown text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// `"<N> <Unit>"`, plural when N is above one
    Count(i64, Unit),
    Caption(&'a str),
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Count(value, unit) => {
                write!(f, "{} {}", value, unit)?;
                if *value > 1 {
                    f.write_str("s")?;
                }
                Ok(())
            }
            Line::Caption(caption) => f.write_str(caption),
        }
    }
}

/// Time left, split into whole days and the hours, minutes and seconds
/// remaining after them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    pub fn from_duration(remaining: TimeDelta) -> Self {
        Self {
            days: remaining.num_days(),
            hours: remaining.num_hours() % 24,
            minutes: remaining.num_minutes() % 60,
            seconds: remaining.num_seconds() % 60,
        }
    }

    /// Countdown from `now` to the next occurrence of `target`
    pub fn until(now: &NaiveDateTime, target: &AnnualTarget) -> Option<Self> {
        let next = next_occurrence(now, target)?;
        Some(Self::from_duration(next.signed_duration_since(*now)))
    }

    /// Non-zero units from days down to seconds, then `caption`.
    pub fn lines<'a>(&self, caption: &'a str) -> impl Iterator<Item = Line<'a>> {
        [
            (self.days, Unit::Day),
            (self.hours, Unit::Hour),
            (self.minutes, Unit::Minute),
            (self.seconds, Unit::Second),
        ]
        .into_iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| Line::Count(value, unit))
        .chain(iter::once(Line::Caption(caption)))
    }
}
