//! Occurrence generation.
//!
//! Each FREQ period (a year, a month, a week starting on WKST, a day, or a single
//! hour/minute/second) yields the set of days that pass every BYxxx day filter combined with
//! the time-of-day set of BYHOUR/BYMINUTE/BYSECOND. BYSETPOS then picks from the sorted
//! period set. Parts missing from the rule default to the seed's value the way
//! RFC 5545 §3.3.10 describes, so `FREQ=MONTHLY` keeps the day of month of DTSTART.

use chrono_tz::Tz;
use std::cmp::Ordering;

use super::{Frequency, RRuleError, RecurrenceRule};
use crate::types::CalendarDate;
use crate::types::calendar::{
    day_number, day_of_year, days_in_month, days_in_year, from_day_number, weekday_of_day_number,
};

mod checks;
use checks::{horizon_year, past_until};
pub(crate) use checks::same_occurrence;

/// Periods in a row without any candidate before expansion gives up.
const MAX_EMPTY_PERIODS: u32 = 1_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Hard bounds for rules without COUNT or UNTIL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceLimits {
    /// Candidates after the seed, excluded ones included.
    pub max_candidates: usize,
    /// Candidates must fall before the current year plus this many years.
    pub horizon_years: i32,
}

impl Default for RecurrenceLimits {
    fn default() -> Self {
        Self {
            max_candidates: 10_000,
            horizon_years: 100,
        }
    }
}

/// A wall-clock point: day number since 1970-01-01 and second of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Instant {
    day: i64,
    second: i64,
}

impl Instant {
    fn of(date: &CalendarDate) -> Self {
        Self {
            day: day_number(date.year(), date.month(), date.day()),
            second: i64::from(date.hour() * 3600 + date.minute() * 60 + date.second()),
        }
    }

    fn to_date(self, seed: &CalendarDate) -> CalendarDate {
        let (year, month, day) = from_day_number(self.day);
        let second = self.second as u32;
        CalendarDate::from_parts(
            year,
            month,
            day,
            second / 3600,
            second / 60 % 60,
            second % 60,
            seed.is_date_only(),
            seed.is_floating(),
            seed.tzid().map(str::to_owned),
        )
    }
}

fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    values.sort();
    values.dedup();
    values
}

fn unsigned(values: &[i32]) -> Vec<u32> {
    sorted(values.iter().map(|v| v.unsigned_abs()).collect())
}

/// Does `value` (1-based) or its negative index within `len` appear in `list`?
fn matches_signed(list: &[i32], value: u32, len: u32) -> bool {
    let positive = value as i32;
    let negative = positive - len as i32 - 1;
    list.contains(&positive) || list.contains(&negative)
}

/// Candidates of one FREQ period, produced on demand.
enum Candidates {
    /// Every combination of a matching day and a time of day, in order. `next` is the flat
    /// index of the next one.
    Walk {
        days: Vec<i64>,
        times: Vec<i64>,
        next: usize,
    },
    /// Picked by BYSETPOS.
    Picked(std::vec::IntoIter<Instant>),
}

impl Default for Candidates {
    fn default() -> Self {
        Self::Picked(Vec::new().into_iter())
    }
}

impl Candidates {
    fn is_exhausted(&self) -> bool {
        match self {
            Self::Walk { days, times, next } => *next >= days.len() * times.len(),
            Self::Picked(picked) => picked.len() == 0,
        }
    }
}

impl Iterator for Candidates {
    type Item = Instant;

    fn next(&mut self) -> Option<Instant> {
        match self {
            Self::Walk { days, times, next } => {
                let width = times.len().max(1);
                let day = *days.get(*next / width)?;
                let second = *times.get(*next % width)?;
                *next += 1;
                Some(Instant { day, second })
            }
            Self::Picked(picked) => picked.next(),
        }
    }
}

struct Expansion<'a> {
    rule: &'a RecurrenceRule,
    seed: Instant,
    by_month: Vec<u32>,
    by_month_day: Vec<i32>,
    by_year_day: Vec<i32>,
    by_week_no: Vec<i32>,
    weekdays: Vec<u32>,
    nth_weekdays: Vec<(i32, u32)>,
    has_by_day: bool,
    hours: Vec<u32>,
    minutes: Vec<u32>,
    seconds: Vec<u32>,
    wkst: u32,
    date_only: bool,
    // yearly and monthly periods
    year: i32,
    month: u32,
    // all other periods
    cursor: Instant,
    pending: Candidates,
    horizon_year: i32,
    empty_periods: u32,
    done: bool,
}

impl<'a> Expansion<'a> {
    fn new(rule: &'a RecurrenceRule, seed: &CalendarDate, horizon_year: i32) -> Self {
        let freq = rule.freq;
        let instant = Instant::of(seed);
        let seed_weekday = weekday_of_day_number(instant.day);

        let mut by_month = rule.by_month.as_deref().map(unsigned).unwrap_or_default();
        let mut by_month_day = rule.by_month_day.clone().unwrap_or_default();
        let mut weekdays = Vec::new();
        let mut nth_weekdays = Vec::new();
        let nth_applies = matches!(freq, Frequency::Monthly | Frequency::Yearly);
        for entry in rule.by_day.iter().flatten() {
            match entry.ordinal {
                Some(ordinal) if nth_applies => nth_weekdays.push((ordinal, entry.weekday.index())),
                _ => weekdays.push(entry.weekday.index()),
            }
        }

        let no_day_rules = rule.by_week_no.is_none()
            && rule.by_year_day.is_none()
            && rule.by_month_day.is_none()
            && rule.by_day.is_none();
        if no_day_rules {
            match freq {
                Frequency::Yearly => {
                    if by_month.is_empty() {
                        by_month = vec![seed.month()];
                    }
                    by_month_day = vec![seed.day() as i32];
                }
                Frequency::Monthly => by_month_day = vec![seed.day() as i32],
                Frequency::Weekly => weekdays = vec![seed_weekday],
                _ => {}
            }
        }

        let time_part = |list: &Option<Vec<i32>>, finer: Frequency, seed_value: u32| {
            if seed.is_date_only() {
                return vec![0];
            }
            match list {
                Some(values) => unsigned(values),
                None if freq < finer => vec![seed_value],
                None => Vec::new(),
            }
        };
        let hours = time_part(&rule.by_hour, Frequency::Hourly, seed.hour());
        let minutes = time_part(&rule.by_minute, Frequency::Minutely, seed.minute());
        let seconds = time_part(&rule.by_second, Frequency::Secondly, seed.second());

        let wkst = rule.wkst().index();
        let cursor = match freq {
            Frequency::Weekly => Instant {
                day: instant.day - i64::from((seed_weekday + 7 - wkst) % 7),
                second: 0,
            },
            _ => instant,
        };

        Self {
            rule,
            seed: instant,
            by_month,
            by_month_day,
            by_year_day: rule.by_year_day.clone().unwrap_or_default(),
            by_week_no: rule.by_week_no.clone().unwrap_or_default(),
            has_by_day: !weekdays.is_empty() || !nth_weekdays.is_empty(),
            weekdays: sorted(weekdays),
            nth_weekdays,
            hours,
            minutes,
            seconds,
            wkst,
            date_only: seed.is_date_only(),
            year: seed.year(),
            month: seed.month(),
            cursor,
            pending: Candidates::default(),
            horizon_year,
            empty_periods: 0,
            done: false,
        }
    }

    fn freq(&self) -> Frequency {
        self.rule.freq
    }

    fn period_year(&self) -> i32 {
        match self.freq() {
            Frequency::Yearly | Frequency::Monthly => self.year,
            _ => from_day_number(self.cursor.day).0,
        }
    }

    fn period_days(&self) -> std::ops::Range<i64> {
        match self.freq() {
            Frequency::Yearly => {
                let first = day_number(self.year, 1, 1);
                first..first + i64::from(days_in_year(self.year))
            }
            Frequency::Monthly => {
                let first = day_number(self.year, self.month, 1);
                first..first + i64::from(days_in_month(self.year, self.month))
            }
            Frequency::Weekly => self.cursor.day..self.cursor.day + 7,
            _ => self.cursor.day..self.cursor.day + 1,
        }
    }

    /// Day number where week 1 of `year` starts.
    fn week_one(&self, year: i32) -> i64 {
        let jan1 = day_number(year, 1, 1);
        let offset = i64::from((self.wkst + 7 - weekday_of_day_number(jan1)) % 7);
        if offset >= 4 { jan1 + offset - 7 } else { jan1 + offset }
    }

    fn week_no_matches(&self, day: i64) -> bool {
        let year = from_day_number(day).0;
        let week_year = if day < self.week_one(year) {
            year - 1
        } else if day >= self.week_one(year + 1) {
            year + 1
        } else {
            year
        };
        let start = self.week_one(week_year);
        let weeks = (self.week_one(week_year + 1) - start) / 7;
        let week = (day - start) / 7 + 1;
        matches_signed(&self.by_week_no, week as u32, weeks as u32)
    }

    fn nth_matches(&self, day: i64, year: i32, month: u32, weekday: u32) -> bool {
        let by_month_scope = self.freq() == Frequency::Monthly || !self.by_month.is_empty();
        let (first, last) = if by_month_scope {
            let first = day_number(year, month, 1);
            (first, first + i64::from(days_in_month(year, month)) - 1)
        } else {
            let first = day_number(year, 1, 1);
            (first, first + i64::from(days_in_year(year)) - 1)
        };
        let forward = ((day - first) / 7 + 1) as i32;
        let backward = -(((last - day) / 7 + 1) as i32);
        self.nth_weekdays
            .iter()
            .any(|&(ordinal, wd)| wd == weekday && (ordinal == forward || ordinal == backward))
    }

    fn day_matches(&self, day: i64) -> bool {
        let (year, month, dom) = from_day_number(day);
        if !self.by_month.is_empty() && !self.by_month.contains(&month) {
            return false;
        }
        if !self.by_week_no.is_empty() && !self.week_no_matches(day) {
            return false;
        }
        if !self.by_year_day.is_empty()
            && !matches_signed(
                &self.by_year_day,
                day_of_year(year, month, dom),
                days_in_year(year),
            )
        {
            return false;
        }
        if !self.by_month_day.is_empty()
            && !matches_signed(&self.by_month_day, dom, days_in_month(year, month))
        {
            return false;
        }
        if self.has_by_day {
            let weekday = weekday_of_day_number(day);
            if !self.weekdays.contains(&weekday) && !self.nth_matches(day, year, month, weekday) {
                return false;
            }
        }
        true
    }

    /// Seconds of day for the current period.
    fn period_times(&self) -> Vec<i64> {
        if self.date_only {
            return vec![0];
        }
        let freq = self.freq();
        let current = self.cursor.second as u32;
        // the period fixes every unit at least as coarse as its frequency
        let part = |list: &[u32], unit: Frequency, value: u32| -> Vec<u32> {
            if freq >= unit {
                if list.is_empty() || list.contains(&value) {
                    vec![value]
                } else {
                    Vec::new()
                }
            } else {
                list.to_vec()
            }
        };
        let hours = part(&self.hours, Frequency::Hourly, current / 3600);
        let minutes = part(&self.minutes, Frequency::Minutely, current / 60 % 60);
        let seconds = part(&self.seconds, Frequency::Secondly, current % 60);

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for h in &hours {
            for m in &minutes {
                for s in &seconds {
                    times.push(i64::from(h * 3600 + m * 60 + s));
                }
            }
        }
        times
    }

    /// Candidates of the current period that don't lie before the seed.
    ///
    /// Only BYSETPOS needs the size of the whole period, and it gets it from the number of
    /// matching days times the number of times of day without listing every candidate.
    fn period(&self) -> Candidates {
        let times = self.period_times();
        let days: Vec<i64> = if times.is_empty() {
            Vec::new()
        } else {
            self.period_days()
                .filter(|day| self.day_matches(*day))
                .collect()
        };
        let seed = self.seed;

        if let Some(positions) = self.rule.by_set_pos.as_deref() {
            let len = (days.len() * times.len()) as i64;
            let picked = positions
                .iter()
                .filter_map(|&pos| {
                    let index = if pos > 0 {
                        i64::from(pos) - 1
                    } else {
                        len + i64::from(pos)
                    };
                    (0..len).contains(&index).then(|| {
                        let index = index as usize;
                        Instant {
                            day: days[index / times.len()],
                            second: times[index % times.len()],
                        }
                    })
                })
                .filter(|candidate| *candidate >= seed)
                .collect();
            return Candidates::Picked(sorted(picked).into_iter());
        }

        let first_day = days.partition_point(|&day| day < seed.day);
        let mut next = first_day * times.len();
        if days.get(first_day) == Some(&seed.day) {
            next += times.partition_point(|&second| second < seed.second);
        }
        Candidates::Walk { days, times, next }
    }

    fn advance(&mut self) {
        let interval = i64::from(self.rule.interval);
        match self.freq() {
            Frequency::Yearly => {
                self.year = self.year.saturating_add(self.rule.interval as i32);
            }
            Frequency::Monthly => {
                let total = i64::from(self.year) * 12 + i64::from(self.month - 1) + interval;
                self.year = total.div_euclid(12).min(i64::from(i32::MAX)) as i32;
                self.month = total.rem_euclid(12) as u32 + 1;
            }
            Frequency::Weekly => self.cursor.day += 7 * interval,
            Frequency::Daily => self.cursor.day += interval,
            freq => {
                let unit = match freq {
                    Frequency::Hourly => 3600,
                    Frequency::Minutely => 60,
                    _ => 1,
                };
                let step = unit * interval;
                let mut steps = 1;
                if !self.day_matches(self.cursor.day) {
                    // jump to the first step on a later day
                    let left = SECONDS_PER_DAY - self.cursor.second;
                    steps = (left + step - 1) / step;
                }
                let second = self.cursor.second + steps * step;
                self.cursor.day += second.div_euclid(SECONDS_PER_DAY);
                self.cursor.second = second.rem_euclid(SECONDS_PER_DAY);
            }
        }
    }
}

impl Iterator for Expansion<'_> {
    type Item = Instant;

    fn next(&mut self) -> Option<Instant> {
        loop {
            if let Some(next) = self.pending.next() {
                return Some(next);
            }
            if self.done {
                return None;
            }
            if self.period_year() >= self.horizon_year {
                tracing::debug!(year = self.period_year(), "recurrence reached the year horizon");
                self.done = true;
                return None;
            }

            self.pending = self.period();
            if self.pending.is_exhausted() {
                self.empty_periods += 1;
                if self.empty_periods >= MAX_EMPTY_PERIODS {
                    tracing::debug!("recurrence produced no candidates, giving up");
                    self.done = true;
                }
            } else {
                self.empty_periods = 0;
            }
            self.advance();
        }
    }
}

/// Bring a date into the zone occurrences are reported in.
fn normalize(date: &CalendarDate, target: Option<Tz>) -> Result<CalendarDate, RRuleError> {
    match target {
        Some(tz) if !date.is_date_only() => Ok(date.in_timezone(tz)?),
        _ => Ok(date.clone()),
    }
}

impl RecurrenceRule {
    /// Expand the rule from `start`.
    ///
    /// The result never holds `start` itself or anything matching `exdates`, holds every
    /// entry of `rdates` that is not excluded, and is strictly ascending. COUNT includes the
    /// seed. With `zone`, a zoned `start` is expanded in that zone's wall-clock time and
    /// every occurrence is converted back into the zone of `start`.
    pub fn generate(
        &self,
        start: &CalendarDate,
        zone: Option<Tz>,
        exdates: &[CalendarDate],
        rdates: &[CalendarDate],
    ) -> Result<Vec<CalendarDate>, RRuleError> {
        self.generate_with_limits(start, zone, exdates, rdates, &RecurrenceLimits::default())
    }

    pub fn generate_with_limits(
        &self,
        start: &CalendarDate,
        zone: Option<Tz>,
        exdates: &[CalendarDate],
        rdates: &[CalendarDate],
        limits: &RecurrenceLimits,
    ) -> Result<Vec<CalendarDate>, RRuleError> {
        self.validate()?;

        let all_day = start.is_date_only();
        let target = start.timezone();
        let expansion_zone = zone.filter(|_| !start.is_date_only() && target.is_some());
        let seed = match expansion_zone {
            Some(tz) => start.in_timezone(tz)?,
            None => start.clone(),
        };
        let until = self
            .until
            .as_ref()
            .map(|until| normalize(until, target))
            .transpose()?;
        let exdates = exdates
            .iter()
            .map(|date| normalize(date, target))
            .collect::<Result<Vec<_>, _>>()?;

        let mut occurrences = Vec::new();
        // the seed is the first instance
        let mut produced = 1u32;
        let mut candidates = 0usize;
        for instant in Expansion::new(self, &seed, horizon_year(limits)) {
            let mut candidate = instant.to_date(&seed);
            if expansion_zone.is_some() {
                if let Some(tz) = target {
                    candidate = match candidate.in_timezone(tz) {
                        Ok(candidate) => candidate,
                        Err(err) => {
                            tracing::debug!(%err, "skipping candidate");
                            continue;
                        }
                    };
                }
            }
            if same_occurrence(&candidate, start, all_day) {
                continue;
            }
            if until.as_ref().is_some_and(|until| past_until(&candidate, until)) {
                break;
            }
            if self.count.is_some_and(|count| produced >= count) {
                break;
            }
            if candidates >= limits.max_candidates {
                tracing::debug!(candidates, "recurrence reached the candidate limit");
                break;
            }
            candidates += 1;
            produced += 1;
            if exdates
                .iter()
                .any(|exdate| same_occurrence(&candidate, exdate, all_day))
            {
                continue;
            }
            occurrences.push(candidate);
        }

        for rdate in rdates {
            let rdate = normalize(rdate, target)?;
            let excluded = same_occurrence(&rdate, start, all_day)
                || exdates
                    .iter()
                    .any(|exdate| same_occurrence(&rdate, exdate, all_day));
            let present = occurrences
                .iter()
                .any(|date| date.compare(&rdate) == Ordering::Equal);
            if !excluded && !present {
                occurrences.push(rdate);
            }
        }
        occurrences.sort_by(CalendarDate::compare);
        occurrences.dedup_by(|a, b| a.compare(b) == Ordering::Equal);
        Ok(occurrences)
    }
}
