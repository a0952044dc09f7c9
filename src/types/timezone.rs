use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::str::FromStr;

use super::CalDateTimeError;

/// Windows zone names that show up in TZID parameters of Microsoft products.
static PROPRIETARY_TZIDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "W. Europe Standard Time" => "Europe/Berlin",
    "Central Europe Standard Time" => "Europe/Budapest",
    "Central European Standard Time" => "Europe/Warsaw",
    "Romance Standard Time" => "Europe/Paris",
    "GMT Standard Time" => "Europe/London",
    "FLE Standard Time" => "Europe/Helsinki",
    "GTB Standard Time" => "Europe/Bucharest",
    "Russian Standard Time" => "Europe/Moscow",
    "Eastern Standard Time" => "America/New_York",
    "Central Standard Time" => "America/Chicago",
    "Mountain Standard Time" => "America/Denver",
    "US Mountain Standard Time" => "America/Phoenix",
    "Pacific Standard Time" => "America/Los_Angeles",
    "Alaskan Standard Time" => "America/Anchorage",
    "Hawaiian Standard Time" => "Pacific/Honolulu",
    "E. South America Standard Time" => "America/Sao_Paulo",
    "India Standard Time" => "Asia/Kolkata",
    "China Standard Time" => "Asia/Shanghai",
    "Tokyo Standard Time" => "Asia/Tokyo",
    "Korea Standard Time" => "Asia/Seoul",
    "Singapore Standard Time" => "Asia/Singapore",
    "AUS Eastern Standard Time" => "Australia/Sydney",
    "New Zealand Standard Time" => "Pacific/Auckland",
    "UTC" => "UTC",
};

pub fn get_proprietary_tzid(tzid: &str) -> Option<Tz> {
    PROPRIETARY_TZIDS
        .get(tzid)
        .and_then(|name| Tz::from_str(name).ok())
}

/// Resolve a TZID parameter value.
///
/// Zones defined by VTIMEZONE components of the current document win, then the IANA
/// database, then the table of proprietary names.
pub fn resolve_tzid(tzid: &str, timezones: Option<&HashMap<String, Tz>>) -> Option<Tz> {
    if let Some(tz) = timezones.and_then(|timezones| timezones.get(tzid)) {
        return Some(*tz);
    }
    // RFC 5545 globally unique identifiers carry a leading solidus
    let name = tzid.trim().trim_start_matches('/');
    Tz::from_str(name)
        .ok()
        .or_else(|| get_proprietary_tzid(name))
}

/// Attach a zone to a wall-clock time.
///
/// Ambiguous times take the earlier offset, times inside a gap are read with the offset in
/// effect before the gap.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }
    let before = tz
        .from_local_datetime(&(naive - Duration::hours(3)))
        .earliest()?;
    let offset = before.offset().fix().local_minus_utc();
    Some(tz.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset)))))
}

/// Wall-clock time in `to` for a wall-clock time in `from`.
pub fn convert(naive: NaiveDateTime, from: Tz, to: Tz) -> Option<NaiveDateTime> {
    localize(from, naive).map(|dt| dt.with_timezone(&to).naive_local())
}

#[inline]
pub fn from_utc(naive: NaiveDateTime, to: Tz) -> NaiveDateTime {
    to.from_utc_datetime(&naive).naive_local()
}

/// Parse a UTC-OFFSET value (`+HHMM` or `+HHMMSS`) into seconds east of UTC.
pub fn parse_utc_offset(value: &str) -> Result<i32, CalDateTimeError> {
    let err = || CalDateTimeError::InvalidUtcOffset(value.to_owned());
    let value = value.trim();
    let (sign, digits) = match value.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(err()),
    };
    if !matches!(digits.len(), 4 | 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let field = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|part| part.parse::<i32>().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (field(0..2), field(2..4), field(4..6));
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(err());
    }
    // "-0000" is not allowed
    if sign < 0 && hours == 0 && minutes == 0 && seconds == 0 {
        return Err(err());
    }
    Ok(sign * (hours * 3600 + minutes * 60 + seconds))
}

/// A UTC-OFFSET value, in seconds east of UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Into)]
pub struct UtcOffset(i32);

impl UtcOffset {
    #[inline]
    pub fn seconds(self) -> i32 {
        self.0
    }
}

impl FromStr for UtcOffset {
    type Err = CalDateTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_utc_offset(value).map(Self)
    }
}

impl std::fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let total = self.0.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
        write!(f, "{sign}{hours:02}{minutes:02}")?;
        if seconds != 0 {
            write!(f, "{seconds:02}")?;
        }
        Ok(())
    }
}
