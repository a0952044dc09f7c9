//! RRULE values (RFC 5545 §3.3.10): parsing, validation, serialization and expansion into
//! concrete occurrences.
//!
//! ```rust
//! use ical_stream::rrule::RecurrenceRule;
//! use ical_stream::CalendarDate;
//!
//! let rule: RecurrenceRule = "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=4".parse().unwrap();
//! assert!(rule.is_valid());
//! let start = CalendarDate::floating(2024, 1, 1, 9, 0, 0).unwrap();
//! let dates = rule.generate(&start, None, &[], &[]).unwrap();
//! let days: Vec<_> = dates.iter().map(|d| d.day()).collect();
//! assert_eq!(days, [3, 5, 8]);
//! ```

use derive_more::Display;
use itertools::Itertools;
use std::fmt;

use crate::types::CalendarDate;

mod error;
pub use error::{RRuleError, ValidationError};

mod parser;
pub use parser::ParseError;

mod validator;

mod iter;
pub use iter::RecurrenceLimits;
pub(crate) use iter::same_occurrence;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub enum Frequency {
    #[display("YEARLY")]
    Yearly,
    #[display("MONTHLY")]
    Monthly,
    #[display("WEEKLY")]
    Weekly,
    #[display("DAILY")]
    Daily,
    #[display("HOURLY")]
    Hourly,
    #[display("MINUTELY")]
    Minutely,
    #[display("SECONDLY")]
    Secondly,
}

impl Frequency {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "YEARLY" => Self::Yearly,
            "MONTHLY" => Self::Monthly,
            "WEEKLY" => Self::Weekly,
            "DAILY" => Self::Daily,
            "HOURLY" => Self::Hourly,
            "MINUTELY" => Self::Minutely,
            "SECONDLY" => Self::Secondly,
            _ => return None,
        })
    }
}

/// Day of the week, numbered from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub enum Weekday {
    #[display("SU")]
    Sunday,
    #[display("MO")]
    Monday,
    #[display("TU")]
    Tuesday,
    #[display("WE")]
    Wednesday,
    #[display("TH")]
    Thursday,
    #[display("FR")]
    Friday,
    #[display("SA")]
    Saturday,
}

impl Weekday {
    const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.to_string().eq_ignore_ascii_case(code))
    }

    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// A BYDAY entry such as `MO`, `2MO` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct WeekdayNum {
    /// Which occurrence within the month or year; `None` means every one.
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    pub fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    pub fn nth(ordinal: i32, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// A parsed RRULE. Built once, never mutated; the `with_*` methods return a new rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct RecurrenceRule {
    pub(crate) freq: Frequency,
    pub(crate) interval: u32,
    pub(crate) until: Option<CalendarDate>,
    pub(crate) count: Option<u32>,
    pub(crate) by_second: Option<Vec<i32>>,
    pub(crate) by_minute: Option<Vec<i32>>,
    pub(crate) by_hour: Option<Vec<i32>>,
    pub(crate) by_day: Option<Vec<WeekdayNum>>,
    pub(crate) by_month_day: Option<Vec<i32>>,
    pub(crate) by_year_day: Option<Vec<i32>>,
    pub(crate) by_week_no: Option<Vec<i32>>,
    pub(crate) by_month: Option<Vec<i32>>,
    pub(crate) by_set_pos: Option<Vec<i32>>,
    pub(crate) wkst: Option<Weekday>,
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            until: None,
            count: None,
            by_second: None,
            by_minute: None,
            by_hour: None,
            by_day: None,
            by_month_day: None,
            by_year_day: None,
            by_week_no: None,
            by_month: None,
            by_set_pos: None,
            wkst: None,
        }
    }

    #[must_use]
    pub fn with_interval(self, interval: u32) -> Self {
        Self { interval, ..self }
    }

    #[must_use]
    pub fn with_count(self, count: u32) -> Self {
        Self {
            count: Some(count),
            ..self
        }
    }

    #[must_use]
    pub fn with_until(self, until: CalendarDate) -> Self {
        Self {
            until: Some(until),
            ..self
        }
    }

    #[must_use]
    pub fn with_by_day(self, by_day: Vec<WeekdayNum>) -> Self {
        Self {
            by_day: Some(by_day),
            ..self
        }
    }

    #[must_use]
    pub fn with_by_month_day(self, by_month_day: Vec<i32>) -> Self {
        Self {
            by_month_day: Some(by_month_day),
            ..self
        }
    }

    #[must_use]
    pub fn with_by_month(self, by_month: Vec<i32>) -> Self {
        Self {
            by_month: Some(by_month),
            ..self
        }
    }

    #[must_use]
    pub fn with_by_set_pos(self, by_set_pos: Vec<i32>) -> Self {
        Self {
            by_set_pos: Some(by_set_pos),
            ..self
        }
    }

    #[must_use]
    pub fn with_by_hour(self, by_hour: Vec<i32>) -> Self {
        Self {
            by_hour: Some(by_hour),
            ..self
        }
    }

    #[must_use]
    pub fn with_wkst(self, wkst: Weekday) -> Self {
        Self {
            wkst: Some(wkst),
            ..self
        }
    }

    #[inline]
    pub fn freq(&self) -> Frequency {
        self.freq
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    #[inline]
    pub fn until(&self) -> Option<&CalendarDate> {
        self.until.as_ref()
    }

    #[inline]
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn by_second(&self) -> Option<&[i32]> {
        self.by_second.as_deref()
    }

    pub fn by_minute(&self) -> Option<&[i32]> {
        self.by_minute.as_deref()
    }

    pub fn by_hour(&self) -> Option<&[i32]> {
        self.by_hour.as_deref()
    }

    pub fn by_day(&self) -> Option<&[WeekdayNum]> {
        self.by_day.as_deref()
    }

    pub fn by_month_day(&self) -> Option<&[i32]> {
        self.by_month_day.as_deref()
    }

    pub fn by_year_day(&self) -> Option<&[i32]> {
        self.by_year_day.as_deref()
    }

    pub fn by_week_no(&self) -> Option<&[i32]> {
        self.by_week_no.as_deref()
    }

    pub fn by_month(&self) -> Option<&[i32]> {
        self.by_month.as_deref()
    }

    pub fn by_set_pos(&self) -> Option<&[i32]> {
        self.by_set_pos.as_deref()
    }

    /// Week start, Monday unless given.
    pub fn wkst(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }

    /// The RRULE content line, CRLF-terminated.
    pub fn to_ical(&self) -> String {
        format!("RRULE:{self}\r\n")
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(values: &[T]) -> String {
            values.iter().join(",")
        }

        let mut parts = vec![format!("FREQ={}", self.freq)];
        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = &self.until {
            parts.push(format!("UNTIL={}", until.format_value()));
        }
        let numeric = [
            ("BYSECOND", &self.by_second),
            ("BYMINUTE", &self.by_minute),
            ("BYHOUR", &self.by_hour),
        ];
        for (name, values) in numeric {
            if let Some(values) = values {
                parts.push(format!("{name}={}", list(values)));
            }
        }
        if let Some(by_day) = &self.by_day {
            parts.push(format!("BYDAY={}", list(by_day)));
        }
        let numeric = [
            ("BYMONTHDAY", &self.by_month_day),
            ("BYYEARDAY", &self.by_year_day),
            ("BYWEEKNO", &self.by_week_no),
            ("BYMONTH", &self.by_month),
            ("BYSETPOS", &self.by_set_pos),
        ];
        for (name, values) in numeric {
            if let Some(values) = values {
                parts.push(format!("{name}={}", list(values)));
            }
        }
        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }
        f.write_str(&parts.join(";"))
    }
}
