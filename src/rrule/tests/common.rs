use crate::rrule::{RecurrenceLimits, RecurrenceRule};
use crate::types::CalendarDate;

pub fn floating(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CalendarDate {
    CalendarDate::floating(y, m, d, h, mi, s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    CalendarDate::date(y, m, d).unwrap()
}

pub fn rule(value: &str) -> RecurrenceRule {
    value.parse().unwrap()
}

pub fn format(dates: &[CalendarDate]) -> Vec<String> {
    dates.iter().map(CalendarDate::format_value).collect()
}

/// Expand `value` from `start` and compare the formatted occurrences.
pub fn check(value: &str, start: CalendarDate, expected: &[&str]) {
    let dates = rule(value).generate(&start, None, &[], &[]).unwrap();
    similar_asserts::assert_eq!(format(&dates), expected);
}

/// Like [`check`] for open-ended rules, stopping after `max` candidates.
pub fn check_first(value: &str, start: CalendarDate, max: usize, expected: &[&str]) {
    let limits = RecurrenceLimits {
        max_candidates: max,
        ..Default::default()
    };
    let dates = rule(value)
        .generate_with_limits(&start, None, &[], &[], &limits)
        .unwrap();
    similar_asserts::assert_eq!(format(&dates), expected);
}
