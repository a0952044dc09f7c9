//! Calendar arithmetic shared by the date model and the recurrence engine.
//!
//! Leap years follow the simplified `year % 4 == 0` rule throughout (1900 and 2100 count
//! as leap years). Day numbers and weekdays are derived from the same rule so that stepping
//! day by day never produces two consecutive days with the same weekday.

pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days in one four-year cycle under the simplified leap rule.
const DAYS_PER_CYCLE: i64 = 4 * 365 + 1;
/// Day number of 1968-01-01, the start of the cycle containing the epoch.
const CYCLE_ANCHOR: i64 = -731;

#[inline]
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_IN_MONTH[month as usize - 1],
        _ => 0,
    }
}

#[inline]
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// 1-based ordinal day.
pub fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    (1..month).map(|m| days_in_month(year, m)).sum::<u32>() + day
}

/// Days since 1970-01-01.
pub fn day_number(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year);
    let leaps = (y - 1).div_euclid(4) - 1969i64.div_euclid(4);
    (y - 1970) * 365 + leaps + i64::from(day_of_year(year, month, day)) - 1
}

/// Inverse of [`day_number`].
pub fn from_day_number(days: i64) -> (i32, u32, u32) {
    let offset = days - CYCLE_ANCHOR;
    let mut year = 1968 + 4 * offset.div_euclid(DAYS_PER_CYCLE);
    let mut rest = offset.rem_euclid(DAYS_PER_CYCLE);
    // first year of every cycle is the leap year
    if rest >= 366 {
        rest -= 366;
        year += 1;
        year += rest / 365;
        rest %= 365;
    }
    let year = year as i32;
    let mut ordinal = rest as u32 + 1;
    let mut month = 1;
    while ordinal > days_in_month(year, month) {
        ordinal -= days_in_month(year, month);
        month += 1;
    }
    (year, month, ordinal)
}

/// 0 = Sunday.
pub fn day_of_week(year: i32, month: u32, day: u32) -> u32 {
    weekday_of_day_number(day_number(year, month, day))
}

#[inline]
pub(crate) fn weekday_of_day_number(days: i64) -> u32 {
    // 1970-01-01 was a Thursday
    (days + 4).rem_euclid(7) as u32
}

pub fn add_days(year: i32, month: u32, day: u32, days: i64) -> (i32, u32, u32) {
    from_day_number(day_number(year, month, day) + days)
}

/// Week number with Sunday-started weeks where week 1 holds the year's first Thursday.
///
/// Days before week 1 belong to the last week of the previous year. A computed week above
/// 52 rolls over to week 1 when the next January 1st falls on Monday to Wednesday.
pub fn week_of_year(year: i32, month: u32, day: u32) -> u32 {
    let jan1 = i64::from(day_of_week(year, 1, 1));
    let mut adjusted = i64::from(day_of_year(year, month, day)) + jan1;
    if jan1 > 4 {
        adjusted -= 7;
    }
    if adjusted <= 0 {
        return week_of_year(year - 1, 12, 31);
    }
    let week = ((adjusted - 1) / 7 + 1) as u32;
    if week > 52 && (1..=3).contains(&day_of_week(year + 1, 1, 1)) {
        return 1;
    }
    week
}
