use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use derive_more::Display;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::{CalDateTimeError, calendar, convert, from_utc, localize, resolve_tzid};
use crate::parser::{ContentLine, ParseMode};

lazy_static! {
    static ref RE_DATE_TIME: Regex =
        Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})(Z)?)?$").unwrap();
}

/// The `VALUE` parameter of date-valued properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValueType {
    #[display("DATE")]
    Date,
    #[display("DATE-TIME")]
    DateTime,
}

impl ValueType {
    pub fn from_param(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("DATE") {
            Some(Self::Date)
        } else if value.eq_ignore_ascii_case("DATE-TIME") {
            Some(Self::DateTime)
        } else {
            None
        }
    }
}

/// What a date value is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct DateContext<'a> {
    pub mode: ParseMode,
    /// UTC and zoned values are converted into this zone.
    pub local_timezone: Tz,
    /// Zones defined by the document being parsed.
    pub timezones: Option<&'a HashMap<String, Tz>>,
}

impl Default for DateContext<'_> {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            local_timezone: chrono_tz::UTC,
            timezones: None,
        }
    }
}

impl<'a> DateContext<'a> {
    pub fn new(mode: ParseMode, local_timezone: Tz) -> Self {
        Self {
            mode,
            local_timezone,
            timezones: None,
        }
    }

    pub fn with_timezones(mut self, timezones: &'a HashMap<String, Tz>) -> Self {
        self.timezones = Some(timezones);
        self
    }
}

/// A DATE or DATE-TIME value.
///
/// Zoned values are normalized into the local zone of the [`DateContext`] they were parsed
/// with, so `tzid` always names a zone that resolves. A date-time without zone is floating.
/// Fields are only reachable through getters; a value is rebuilt rather than mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    date_only: bool,
    floating: bool,
    tzid: Option<String>,
}

fn check_date(year: i32, month: u32, day: u32) -> Result<(), CalDateTimeError> {
    if !(1..=12).contains(&month) || day == 0 || day > calendar::days_in_month(year, month) {
        return Err(CalDateTimeError::InvalidDate(format!(
            "{year:04}{month:02}{day:02}"
        )));
    }
    Ok(())
}

fn check_time(hour: u32, minute: u32, second: u32) -> Result<(), CalDateTimeError> {
    if hour > 23 || minute > 59 || second > 59 {
        return Err(CalDateTimeError::InvalidTime(format!(
            "{hour:02}{minute:02}{second:02}"
        )));
    }
    Ok(())
}

impl CalendarDate {
    pub fn date(year: i32, month: u32, day: u32) -> Result<Self, CalDateTimeError> {
        check_date(year, month, day)?;
        Ok(Self::from_parts(year, month, day, 0, 0, 0, true, false, None))
    }

    pub fn floating(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, CalDateTimeError> {
        check_date(year, month, day)?;
        check_time(hour, minute, second)?;
        Ok(Self::from_parts(
            year, month, day, hour, minute, second, false, true, None,
        ))
    }

    /// Wall-clock time in `tz`.
    pub fn zoned(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        tz: Tz,
    ) -> Result<Self, CalDateTimeError> {
        check_date(year, month, day)?;
        check_time(hour, minute, second)?;
        Ok(Self::from_parts(
            year,
            month,
            day,
            hour,
            minute,
            second,
            false,
            false,
            Some(tz.name().to_owned()),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        date_only: bool,
        floating: bool,
        tzid: Option<String>,
    ) -> Self {
        if date_only {
            return Self {
                year,
                month,
                day,
                hour: 0,
                minute: 0,
                second: 0,
                date_only,
                floating: false,
                tzid: None,
            };
        }
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            date_only,
            floating: floating && tzid.is_none(),
            tzid,
        }
    }

    fn from_naive(naive: NaiveDateTime, tzid: Option<String>, floating: bool) -> Self {
        use chrono::{Datelike, Timelike};
        Self::from_parts(
            naive.year(),
            naive.month(),
            naive.day(),
            naive.hour(),
            naive.minute(),
            naive.second(),
            false,
            floating,
            tzid,
        )
    }

    /// Parse a DATE or DATE-TIME value.
    ///
    /// `Z` values are UTC instants and `tzid` names the zone of a wall-clock time; both are
    /// converted into `ctx.local_timezone`. A TZID that does not resolve is an error in
    /// strict mode and leaves a floating time otherwise.
    pub fn parse(
        value: &str,
        tzid: Option<&str>,
        value_type: Option<ValueType>,
        ctx: &DateContext,
    ) -> Result<Self, CalDateTimeError> {
        let value = value.trim();
        let captures = RE_DATE_TIME
            .captures(value)
            .ok_or_else(|| CalDateTimeError::ParseError(value.to_owned()))?;
        let number = |index: usize| -> Result<u32, CalDateTimeError> {
            captures
                .get(index)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| CalDateTimeError::ParseError(value.to_owned()))
        };
        let year = number(1)? as i32;
        let (month, day) = (number(2)?, number(3)?);
        let has_time = captures.get(4).is_some();

        if ctx.mode.is_strict() {
            match value_type {
                Some(expected @ ValueType::Date) if has_time => {
                    return Err(CalDateTimeError::ValueTypeMismatch {
                        value: value.to_owned(),
                        expected,
                    });
                }
                Some(expected @ ValueType::DateTime) if !has_time => {
                    return Err(CalDateTimeError::ValueTypeMismatch {
                        value: value.to_owned(),
                        expected,
                    });
                }
                _ => {}
            }
        }

        check_date(year, month, day)?;
        if !has_time {
            return Ok(Self::from_parts(year, month, day, 0, 0, 0, true, false, None));
        }
        let (hour, minute, second) = (number(4)?, number(5)?, number(6)?);
        check_time(hour, minute, second)?;
        let floating = Self::from_parts(year, month, day, hour, minute, second, false, true, None);

        let local = ctx.local_timezone;
        if captures.get(7).is_some() {
            let utc = floating.naive().ok_or_else(|| unrepresentable(value))?;
            return Ok(Self::from_naive(
                from_utc(utc, local),
                Some(local.name().to_owned()),
                false,
            ));
        }

        let Some(tzid) = tzid else {
            return Ok(floating);
        };
        match resolve_tzid(tzid, ctx.timezones) {
            Some(tz) => {
                let naive = floating.naive().ok_or_else(|| unrepresentable(value))?;
                let converted = convert(naive, tz, local).ok_or_else(|| unrepresentable(value))?;
                Ok(Self::from_naive(
                    converted,
                    Some(local.name().to_owned()),
                    false,
                ))
            }
            None if ctx.mode.is_strict() => Err(CalDateTimeError::UnknownTimezone(tzid.to_owned())),
            None => {
                tracing::debug!(tzid, value, "unknown timezone, keeping floating time");
                Ok(floating)
            }
        }
    }

    /// Parse the value of a date-valued property, honouring its TZID and VALUE parameters.
    pub fn from_content_line(
        line: &ContentLine,
        ctx: &DateContext,
    ) -> Result<Self, CalDateTimeError> {
        let value_type = line
            .params
            .get_value_type()
            .and_then(ValueType::from_param);
        Self::parse(&line.value, line.params.get_tzid(), value_type, ctx)
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[inline]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u32 {
        self.second
    }

    #[inline]
    pub fn is_date_only(&self) -> bool {
        self.date_only
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    #[inline]
    pub fn tzid(&self) -> Option<&str> {
        self.tzid.as_deref()
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.tzid.as_deref().and_then(|tzid| resolve_tzid(tzid, None))
    }

    /// 0 = Sunday.
    pub fn day_of_week(&self) -> u32 {
        calendar::day_of_week(self.year, self.month, self.day)
    }

    pub fn day_of_year(&self) -> u32 {
        calendar::day_of_year(self.year, self.month, self.day)
    }

    pub fn days_in_month(&self) -> u32 {
        calendar::days_in_month(self.year, self.month)
    }

    pub fn week_of_year(&self) -> u32 {
        calendar::week_of_year(self.year, self.month, self.day)
    }

    /// The wall-clock time as a chrono value. `None` for days that exist only under the
    /// simplified leap-year rule, such as 2100-02-29.
    pub fn naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Shift by `duration`. Date-only values move by whole days; zoned values keep their
    /// zone and move in wall-clock time.
    pub fn add_duration(&self, duration: chrono::Duration) -> Option<Self> {
        if self.date_only {
            let days = duration.num_days();
            let (year, month, day) = calendar::add_days(self.year, self.month, self.day, days);
            return Some(Self::from_parts(year, month, day, 0, 0, 0, true, false, None));
        }
        let naive = self.naive()?.checked_add_signed(duration)?;
        Some(Self::from_naive(naive, self.tzid.clone(), self.floating))
    }

    /// Same instant as wall-clock time in `tz`. Floating and date-only values are returned
    /// unchanged.
    pub fn in_timezone(&self, tz: Tz) -> Result<Self, CalDateTimeError> {
        let Some(from) = self.timezone() else {
            return Ok(self.clone());
        };
        let converted = self
            .naive()
            .and_then(|naive| convert(naive, from, tz))
            .ok_or_else(|| unrepresentable(&self.format_value()))?;
        Ok(Self::from_naive(converted, Some(tz.name().to_owned()), false))
    }

    /// Order by calendar day first. On the same day a date-only value sorts before any
    /// date-time, whichever side it is on; two date-times then compare by time of day.
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.year, self.month, self.day)
            .cmp(&(other.year, other.month, other.day))
            .then_with(|| match (self.date_only, other.date_only) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => (self.hour, self.minute, self.second).cmp(&(
                    other.hour,
                    other.minute,
                    other.second,
                )),
            })
    }

    /// The value part of the iCalendar representation.
    pub fn format_value(&self) -> String {
        if self.date_only {
            return format!("{:04}{:02}{:02}", self.year, self.month, self.day);
        }
        let utc = self
            .timezone()
            .zip(self.naive())
            .and_then(|(tz, naive)| localize(tz, naive))
            .map(|dt| dt.naive_utc());
        match utc {
            Some(utc) => format!("{}Z", utc.format("%Y%m%dT%H%M%S")),
            None => format!(
                "{:04}{:02}{:02}T{:02}{:02}{:02}",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            ),
        }
    }

    /// A complete CRLF-terminated content line.
    pub fn to_ical(&self, name: &str) -> String {
        if self.date_only {
            format!("{name};VALUE=DATE:{}\r\n", self.format_value())
        } else {
            format!("{name}:{}\r\n", self.format_value())
        }
    }
}

fn unrepresentable(value: &str) -> CalDateTimeError {
    CalDateTimeError::Unrepresentable(value.to_owned())
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_value())
    }
}
