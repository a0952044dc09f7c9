use chrono::Datelike;

use super::RecurrenceLimits;
use crate::types::CalendarDate;

/// First year no candidate may reach.
pub(crate) fn horizon_year(limits: &RecurrenceLimits) -> i32 {
    chrono::Utc::now()
        .year()
        .saturating_add(limits.horizon_years)
}

/// All-day recurrences match on the calendar day, timed ones on the full date and time.
///
/// In a timed recurrence a date-only value matches nothing.
pub(crate) fn same_occurrence(a: &CalendarDate, b: &CalendarDate, all_day: bool) -> bool {
    let day = (a.year(), a.month(), a.day()) == (b.year(), b.month(), b.day());
    if all_day {
        day
    } else {
        day
            && a.is_date_only() == b.is_date_only()
            && (a.hour(), a.minute(), a.second()) == (b.hour(), b.minute(), b.second())
    }
}

pub(crate) fn past_until(candidate: &CalendarDate, until: &CalendarDate) -> bool {
    if candidate.is_date_only() || until.is_date_only() {
        (candidate.year(), candidate.month(), candidate.day())
            > (until.year(), until.month(), until.day())
    } else {
        candidate.compare(until).is_gt()
    }
}
