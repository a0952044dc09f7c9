use lazy_static::lazy_static;
use regex::Regex;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::{Frequency, RRuleError, RecurrenceRule, Weekday, WeekdayNum};
use crate::types::{CalDateTimeError, CalendarDate, DateContext};

lazy_static! {
    static ref RE_WEEKDAY_NUM: Regex =
        Regex::new(r"(?i)^([+-]?\d{1,2})?(SU|MO|TU|WE|TH|FR|SA)$").unwrap();
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("FREQ is missing")]
    MissingFrequency,
    #[error("Invalid FREQ: {0}")]
    InvalidFrequency(String),
    #[error("{0} may only appear once")]
    DuplicatePart(String),
    #[error("Rule part is not of the form NAME=VALUE: {0}")]
    MalformedPart(String),
    #[error("Unknown rule part: {0}")]
    UnknownPart(String),
    #[error("Invalid {part} value: {value}")]
    InvalidValue { part: String, value: String },
    #[error("{part} value {value} is outside of {range}")]
    OutOfRange {
        part: String,
        value: i32,
        range: String,
    },
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),
    #[error("Invalid UNTIL: {0}")]
    InvalidUntil(#[from] CalDateTimeError),
}

/// A numeric BYxxx list, `signed` allowing the negated range as well.
fn parse_numbers(
    part: &str,
    value: &str,
    range: RangeInclusive<i32>,
    signed: bool,
) -> Result<Vec<i32>, ParseError> {
    value
        .split(',')
        .map(|item| {
            let number = item
                .trim()
                .trim_start_matches('+')
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidValue {
                    part: part.to_owned(),
                    value: item.to_owned(),
                })?;
            let in_range = range.contains(&number) || (signed && range.contains(&-number));
            if !in_range {
                return Err(ParseError::OutOfRange {
                    part: part.to_owned(),
                    value: number,
                    range: if signed {
                        format!("±{}..{}", range.start(), range.end())
                    } else {
                        format!("{}..{}", range.start(), range.end())
                    },
                });
            }
            Ok(number)
        })
        .collect()
}

fn parse_weekday_num(value: &str) -> Result<WeekdayNum, ParseError> {
    let invalid = || ParseError::InvalidWeekday(value.to_owned());
    let captures = RE_WEEKDAY_NUM.captures(value.trim()).ok_or_else(invalid)?;
    let weekday = captures
        .get(2)
        .and_then(|code| Weekday::from_code(code.as_str()))
        .ok_or_else(invalid)?;
    let ordinal = match captures.get(1) {
        Some(ordinal) => {
            let ordinal = ordinal
                .as_str()
                .trim_start_matches('+')
                .parse::<i32>()
                .map_err(|_| invalid())?;
            if ordinal == 0 || !(-53..=53).contains(&ordinal) {
                return Err(ParseError::OutOfRange {
                    part: "BYDAY".to_owned(),
                    value: ordinal,
                    range: "±1..53".to_owned(),
                });
            }
            Some(ordinal)
        }
        None => None,
    };
    Ok(WeekdayNum { ordinal, weekday })
}

fn parse_unsigned(part: &str, value: &str) -> Result<u32, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue {
        part: part.to_owned(),
        value: value.to_owned(),
    })
}

fn set_once<T>(slot: &mut Option<T>, part: &str, value: T) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicatePart(part.to_owned()));
    }
    *slot = Some(value);
    Ok(())
}

impl RecurrenceRule {
    /// Parse an RRULE value such as `FREQ=MONTHLY;BYDAY=-1FR;COUNT=3`.
    ///
    /// Numeric ranges are checked here; combinations of parts are checked by
    /// [`RecurrenceRule::validate`]. Unknown parts are an error in strict mode and skipped
    /// otherwise.
    pub fn parse(value: &str, ctx: &DateContext) -> Result<Self, RRuleError> {
        Ok(parse_rule(value, ctx)?)
    }
}

fn parse_rule(value: &str, ctx: &DateContext) -> Result<RecurrenceRule, ParseError> {
    let mut freq = None;
    let mut interval = None;
    let mut until = None;
    let mut count = None;
    let mut rule = RecurrenceRule::new(Frequency::Yearly);

    for part in value.trim().split(';').filter(|part| !part.trim().is_empty()) {
        let Some((name, value)) = part.split_once('=') else {
            return Err(ParseError::MalformedPart(part.to_owned()));
        };
        let name = name.trim().to_ascii_uppercase();
        let value = value.trim();
        match name.as_str() {
            "FREQ" => {
                let parsed = Frequency::from_name(value)
                    .ok_or_else(|| ParseError::InvalidFrequency(value.to_owned()))?;
                set_once(&mut freq, &name, parsed)?;
            }
            "INTERVAL" => set_once(&mut interval, &name, parse_unsigned(&name, value)?)?,
            "COUNT" => set_once(&mut count, &name, parse_unsigned(&name, value)?)?,
            "UNTIL" => set_once(&mut until, &name, CalendarDate::parse(value, None, None, ctx)?)?,
            "BYSECOND" => set_once(
                &mut rule.by_second,
                &name,
                parse_numbers(&name, value, 0..=59, false)?,
            )?,
            "BYMINUTE" => set_once(
                &mut rule.by_minute,
                &name,
                parse_numbers(&name, value, 0..=59, false)?,
            )?,
            "BYHOUR" => set_once(
                &mut rule.by_hour,
                &name,
                parse_numbers(&name, value, 0..=23, false)?,
            )?,
            "BYDAY" => set_once(
                &mut rule.by_day,
                &name,
                value
                    .split(',')
                    .map(parse_weekday_num)
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
            "BYMONTHDAY" => set_once(
                &mut rule.by_month_day,
                &name,
                parse_numbers(&name, value, 1..=31, true)?,
            )?,
            "BYYEARDAY" => set_once(
                &mut rule.by_year_day,
                &name,
                parse_numbers(&name, value, 1..=366, true)?,
            )?,
            "BYWEEKNO" => set_once(
                &mut rule.by_week_no,
                &name,
                parse_numbers(&name, value, 1..=53, true)?,
            )?,
            "BYMONTH" => set_once(
                &mut rule.by_month,
                &name,
                parse_numbers(&name, value, 1..=12, false)?,
            )?,
            "BYSETPOS" => set_once(
                &mut rule.by_set_pos,
                &name,
                parse_numbers(&name, value, 1..=366, true)?,
            )?,
            "WKST" => {
                let wkst = Weekday::from_code(value)
                    .ok_or_else(|| ParseError::InvalidWeekday(value.to_owned()))?;
                set_once(&mut rule.wkst, &name, wkst)?;
            }
            _ if ctx.mode.is_strict() => return Err(ParseError::UnknownPart(name)),
            _ => tracing::debug!(part = name, "skipping unknown RRULE part"),
        }
    }

    rule.freq = freq.ok_or(ParseError::MissingFrequency)?;
    rule.interval = interval.unwrap_or(1);
    rule.until = until;
    rule.count = count;
    Ok(rule)
}

impl FromStr for RecurrenceRule {
    type Err = RRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &DateContext::default())
    }
}
