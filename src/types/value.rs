use chrono::Duration;
use itertools::Itertools;

use super::{CalendarDate, DateContext, UtcOffset, ValueType, format_duration, parse_duration};
use crate::parser::ParserError;
use crate::rrule::RecurrenceRule;

/// A typed property value that can be written back into a content line.
pub trait Value {
    /// The `VALUE` parameter this value is written with, if it has a fixed one.
    fn value_type(&self) -> Option<&'static str>;

    fn value(&self) -> String;

    /// Zoned date-times are written in UTC, so their TZID parameter goes away.
    fn drops_tzid(&self) -> bool {
        false
    }
}

impl Value for String {
    fn value_type(&self) -> Option<&'static str> {
        None
    }

    fn value(&self) -> String {
        self.clone()
    }
}

impl Value for CalendarDate {
    fn value_type(&self) -> Option<&'static str> {
        Some(if self.is_date_only() {
            "DATE"
        } else {
            "DATE-TIME"
        })
    }

    fn value(&self) -> String {
        self.format_value()
    }

    fn drops_tzid(&self) -> bool {
        !self.is_date_only() && !self.is_floating()
    }
}

impl Value for Duration {
    fn value_type(&self) -> Option<&'static str> {
        Some("DURATION")
    }

    fn value(&self) -> String {
        format_duration(self)
    }
}

impl Value for RecurrenceRule {
    fn value_type(&self) -> Option<&'static str> {
        Some("RECUR")
    }

    fn value(&self) -> String {
        self.to_string()
    }
}

impl Value for UtcOffset {
    fn value_type(&self) -> Option<&'static str> {
        Some("UTC-OFFSET")
    }

    fn value(&self) -> String {
        self.to_string()
    }
}

impl Value for i64 {
    fn value_type(&self) -> Option<&'static str> {
        Some("INTEGER")
    }

    fn value(&self) -> String {
        self.to_string()
    }
}

impl<T: Value> Value for Vec<T> {
    fn value_type(&self) -> Option<&'static str> {
        self.first().and_then(Value::value_type)
    }

    fn value(&self) -> String {
        self.iter().map(Value::value).join(",")
    }

    fn drops_tzid(&self) -> bool {
        self.iter().any(Value::drops_tzid)
    }
}

/// Where a PERIOD ends: an explicit date-time or a duration after its start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodEnd {
    DateTime(CalendarDate),
    Duration(Duration),
}

/// A PERIOD value, `start/end` or `start/duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: CalendarDate,
    pub end: PeriodEnd,
}

impl Period {
    pub fn parse(value: &str, tzid: Option<&str>, ctx: &DateContext) -> Result<Self, ParserError> {
        let Some((start, end)) = value.trim().split_once('/') else {
            return Err(ParserError::InvalidPropertyValue(value.to_owned()));
        };
        let start = CalendarDate::parse(start, tzid, Some(ValueType::DateTime), ctx)?;
        if start.is_date_only() {
            return Err(ParserError::InvalidPropertyValue(value.to_owned()));
        }
        let end = if end.trim_start_matches(['+', '-']).starts_with('P') {
            PeriodEnd::Duration(parse_duration(end)?)
        } else {
            let end = CalendarDate::parse(end, tzid, Some(ValueType::DateTime), ctx)?;
            if end.is_date_only() || end.compare(&start).is_lt() {
                return Err(ParserError::InvalidPropertyValue(value.to_owned()));
            }
            PeriodEnd::DateTime(end)
        };
        Ok(Self { start, end })
    }
}

/// An RDATE entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOrPeriod {
    Date(CalendarDate),
    Period(Period),
}

impl DateOrPeriod {
    /// The date an entry recurs on; periods recur on their start.
    pub fn start(&self) -> &CalendarDate {
        match self {
            Self::Date(date) => date,
            Self::Period(period) => &period.start,
        }
    }
}

impl Value for DateOrPeriod {
    fn value_type(&self) -> Option<&'static str> {
        match self {
            Self::Date(date) => date.value_type(),
            Self::Period(period) => period.value_type(),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Date(date) => date.value(),
            Self::Period(period) => period.value(),
        }
    }

    fn drops_tzid(&self) -> bool {
        self.start().drops_tzid()
    }
}

impl Value for Period {
    fn value_type(&self) -> Option<&'static str> {
        Some("PERIOD")
    }

    fn value(&self) -> String {
        match &self.end {
            PeriodEnd::DateTime(end) => format!("{}/{}", self.start, end),
            PeriodEnd::Duration(duration) => {
                format!("{}/{}", self.start, format_duration(duration))
            }
        }
    }

    fn drops_tzid(&self) -> bool {
        self.start.drops_tzid()
    }
}
