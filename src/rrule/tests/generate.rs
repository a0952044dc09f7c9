use super::common::{date, floating, format, rule};
use crate::rrule::{RecurrenceLimits, RecurrenceRule};
use crate::types::{CalendarDate, DateContext};
use chrono::Datelike;
use rstest::rstest;
use std::cmp::Ordering;

fn strictly_ascending(dates: &[CalendarDate]) -> bool {
    dates
        .windows(2)
        .all(|pair| pair[0].compare(&pair[1]) == Ordering::Less)
}

#[test]
fn exdates_are_skipped_but_counted() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let exdates = [floating(2024, 1, 3, 10, 0, 0)];
    let dates = rule("FREQ=DAILY;COUNT=5")
        .generate(&start, None, &exdates, &[])
        .unwrap();
    similar_asserts::assert_eq!(
        format(&dates),
        ["20240102T100000", "20240104T100000", "20240105T100000"]
    );
}

#[test]
fn exdate_needs_matching_time_for_timed_rules() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let exdates = [floating(2024, 1, 2, 11, 0, 0)];
    let dates = rule("FREQ=DAILY;COUNT=3")
        .generate(&start, None, &exdates, &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240102T100000", "20240103T100000"]);
}

#[test]
fn all_day_exdates_match_by_date() {
    let exdates = [date(2024, 1, 2)];
    let dates = rule("FREQ=DAILY;COUNT=3")
        .generate(&date(2024, 1, 1), None, &exdates, &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240103"]);
}

#[test]
fn rdates_are_merged_and_sorted() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let rdates = [
        floating(2024, 1, 10, 8, 0, 0),
        floating(2024, 1, 2, 10, 0, 0),
        floating(2023, 12, 31, 9, 0, 0),
    ];
    let dates = rule("FREQ=DAILY;COUNT=3")
        .generate(&start, None, &[], &rdates)
        .unwrap();
    similar_asserts::assert_eq!(
        format(&dates),
        [
            "20231231T090000",
            "20240102T100000",
            "20240103T100000",
            "20240110T080000"
        ]
    );
    assert!(strictly_ascending(&dates));
}

#[test]
fn exclusions_win_over_rdates() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let excluded = floating(2024, 2, 1, 10, 0, 0);
    let dates = rule("FREQ=DAILY;COUNT=2")
        .generate(
            &start,
            None,
            std::slice::from_ref(&excluded),
            &[excluded.clone(), start.clone()],
        )
        .unwrap();
    assert_eq!(format(&dates), ["20240102T100000"]);
}

#[test]
fn open_ended_daily_stops_at_candidate_limit() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let dates = rule("FREQ=DAILY")
        .generate(&start, None, &[], &[])
        .unwrap();
    assert_eq!(dates.len(), 10_000);
    assert!(strictly_ascending(&dates));
    assert!(!dates.contains(&start));
}

#[test]
fn open_ended_yearly_stops_at_horizon() {
    let limits = RecurrenceLimits {
        horizon_years: 5,
        ..Default::default()
    };
    let horizon = chrono::Utc::now().year() + 5;
    let dates = rule("FREQ=YEARLY")
        .generate_with_limits(&date(2020, 6, 1), None, &[], &[], &limits)
        .unwrap();
    assert_eq!(dates.len() as i32, horizon - 2021);
    assert!(dates.iter().all(|date| date.year() < horizon));
}

#[test]
fn impossible_rule_terminates() {
    let dates = rule("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30")
        .generate(&date(2024, 1, 1), None, &[], &[])
        .unwrap();
    assert!(dates.is_empty());
}

#[test]
fn until_date_only_includes_last_day() {
    let dates = rule("FREQ=DAILY;UNTIL=20240103")
        .generate(&floating(2024, 1, 1, 23, 0, 0), None, &[], &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240102T230000", "20240103T230000"]);
}

#[test]
fn expansion_zone_keeps_wall_clock_across_dst() {
    // 09:00 Europe/Berlin, stored in UTC
    let start = CalendarDate::zoned(2024, 3, 30, 8, 0, 0, chrono_tz::UTC).unwrap();
    let rule = rule("FREQ=DAILY;COUNT=3");

    let zoned = rule
        .generate(&start, Some(chrono_tz::Europe::Berlin), &[], &[])
        .unwrap();
    assert_eq!(format(&zoned), ["20240331T070000Z", "20240401T070000Z"]);
    assert!(zoned.iter().all(|date| date.tzid() == Some("UTC")));

    let plain = rule.generate(&start, None, &[], &[]).unwrap();
    assert_eq!(format(&plain), ["20240331T080000Z", "20240401T080000Z"]);
}

#[test]
fn floating_start_ignores_expansion_zone() {
    let start = floating(2024, 3, 30, 9, 0, 0);
    let dates = rule("FREQ=DAILY;COUNT=2")
        .generate(&start, Some(chrono_tz::Europe::Berlin), &[], &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240331T090000"]);
}

#[test]
fn invalid_rule_is_rejected() {
    assert!(
        rule("FREQ=DAILY;BYMONTHDAY=15")
            .generate(&date(2024, 1, 1), None, &[], &[])
            .is_err()
    );
}

#[rstest]
#[case("FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10")]
#[case("FREQ=MONTHLY;INTERVAL=2;BYDAY=1SU,-1SU;UNTIL=20240101T120000Z")]
#[case("FREQ=YEARLY;BYWEEKNO=-1,20;BYDAY=MO;WKST=SU")]
#[case("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2;BYHOUR=9;BYMINUTE=0,30;BYSECOND=0")]
#[case("FREQ=YEARLY;BYYEARDAY=1,-1;BYMONTH=1,12;UNTIL=20301231")]
fn serialization_roundtrip(#[case] value: &str) {
    let rule = rule(value);
    let serialized = rule.to_string();
    let parsed = RecurrenceRule::parse(&serialized, &DateContext::default()).unwrap();
    assert_eq!(parsed, rule, "{serialized}");
}

#[test]
fn canonical_serialization() {
    let rule = rule("byday=-1fr;count=3;freq=monthly;interval=1;wkst=su");
    insta::assert_snapshot!(rule.to_string(), @"FREQ=MONTHLY;COUNT=3;BYDAY=-1FR;WKST=SU");
    assert_eq!(rule.to_ical(), format!("RRULE:{rule}\r\n"));
}

#[test]
fn built_rule_matches_parsed_rule() {
    use crate::rrule::{Frequency, Weekday, WeekdayNum};

    let built = RecurrenceRule::new(Frequency::Yearly)
        .with_interval(2)
        .with_count(4)
        .with_by_month(vec![11])
        .with_by_month_day(vec![2, 3, 4, 5, 6, 7, 8])
        .with_by_day(vec![WeekdayNum::every(Weekday::Tuesday)])
        .with_by_hour(vec![9])
        .with_by_set_pos(vec![1])
        .with_wkst(Weekday::Sunday);
    let parsed = rule(
        "FREQ=YEARLY;INTERVAL=2;COUNT=4;BYMONTH=11;BYMONTHDAY=2,3,4,5,6,7,8;BYDAY=TU;BYHOUR=9;BYSETPOS=1;WKST=SU",
    );
    assert_eq!(built, parsed);
    assert!(built.is_valid());

    // US election day, every other year
    let dates = built
        .generate(&floating(1996, 11, 5, 9, 0, 0), None, &[], &[])
        .unwrap();
    assert_eq!(
        format(&dates),
        ["20001107T090000", "20041102T090000", "20081104T090000"]
    );
}

fn every_second_of_the_month_days(extra: &str) -> RecurrenceRule {
    use itertools::Itertools;

    let list = |range: std::ops::Range<i32>| range.map(|v| v.to_string()).join(",");
    rule(&format!(
        "FREQ=YEARLY;BYMONTHDAY={};BYHOUR={};BYMINUTE={};BYSECOND={}{extra}",
        list(1..32),
        list(0..24),
        list(0..60),
        list(0..60),
    ))
}

#[test]
fn dense_period_stops_at_count() {
    let dates = every_second_of_the_month_days(";COUNT=3")
        .generate(&floating(2024, 1, 1, 0, 0, 0), None, &[], &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240101T000001", "20240101T000002"]);
}

#[test]
fn dense_period_stops_at_candidate_limit() {
    let limits = RecurrenceLimits {
        max_candidates: 5,
        ..Default::default()
    };
    let dates = every_second_of_the_month_days("")
        .generate_with_limits(&floating(2024, 6, 15, 12, 0, 0), None, &[], &[], &limits)
        .unwrap();
    assert_eq!(
        format(&dates),
        [
            "20240615T120001",
            "20240615T120002",
            "20240615T120003",
            "20240615T120004",
            "20240615T120005",
        ]
    );
}

#[test]
fn dense_period_with_set_pos() {
    let dates = every_second_of_the_month_days(";BYSETPOS=1,-1;COUNT=3")
        .generate(&floating(2024, 1, 1, 0, 0, 0), None, &[], &[])
        .unwrap();
    assert_eq!(format(&dates), ["20241231T235959", "20250101T000000"]);
}

#[test]
fn date_only_exdate_leaves_timed_occurrences() {
    let start = floating(2024, 1, 1, 10, 0, 0);
    let exdates = [date(2024, 1, 2)];
    let dates = rule("FREQ=DAILY;COUNT=3")
        .generate(&start, None, &exdates, &[])
        .unwrap();
    assert_eq!(format(&dates), ["20240102T100000", "20240103T100000"]);
}
