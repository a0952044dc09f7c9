//! The recurrence examples of RFC 5545 §3.8.5.3, expressed as floating times.
//! Occurrences never include DTSTART itself.

use super::common::{check, check_first, date, floating, format, rule};

#[test]
fn daily_for_10_occurrences() {
    check(
        "FREQ=DAILY;COUNT=10",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970903T090000",
            "19970904T090000",
            "19970905T090000",
            "19970906T090000",
            "19970907T090000",
            "19970908T090000",
            "19970909T090000",
            "19970910T090000",
            "19970911T090000",
        ],
    );
}

#[test]
fn daily_until_december_24() {
    let dates = rule("FREQ=DAILY;UNTIL=19971224T000000Z")
        .generate(&floating(1997, 9, 2, 9, 0, 0), None, &[], &[])
        .unwrap();
    let dates = format(&dates);
    assert_eq!(dates.len(), 112);
    assert_eq!(dates.first().unwrap(), "19970903T090000");
    assert_eq!(dates.last().unwrap(), "19971223T090000");
}

#[test]
fn every_10_days_5_occurrences() {
    check(
        "FREQ=DAILY;INTERVAL=10;COUNT=5",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970912T090000",
            "19970922T090000",
            "19971002T090000",
            "19971012T090000",
        ],
    );
}

#[test]
fn every_day_in_january_for_3_years() {
    let start = floating(1998, 1, 1, 9, 0, 0);
    for value in [
        "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
        "FREQ=DAILY;UNTIL=20000131T140000Z;BYMONTH=1",
    ] {
        let dates = format(&rule(value).generate(&start, None, &[], &[]).unwrap());
        assert_eq!(dates.len(), 92, "{value}");
        assert_eq!(dates.first().unwrap(), "19980102T090000");
        assert_eq!(dates.last().unwrap(), "20000131T090000");
        assert!(dates.iter().all(|date| &date[4..6] == "01"));
    }
}

#[test]
fn weekly_for_10_occurrences() {
    check(
        "FREQ=WEEKLY;COUNT=10",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970909T090000",
            "19970916T090000",
            "19970923T090000",
            "19970930T090000",
            "19971007T090000",
            "19971014T090000",
            "19971021T090000",
            "19971028T090000",
            "19971104T090000",
        ],
    );
}

#[test]
fn weekly_on_tuesday_and_thursday_for_five_weeks() {
    let expected = [
        "19970904T090000",
        "19970909T090000",
        "19970911T090000",
        "19970916T090000",
        "19970918T090000",
        "19970923T090000",
        "19970925T090000",
        "19970930T090000",
        "19971002T090000",
    ];
    let start = floating(1997, 9, 2, 9, 0, 0);
    check(
        "FREQ=WEEKLY;UNTIL=19971007T000000Z;WKST=SU;BYDAY=TU,TH",
        start.clone(),
        &expected,
    );
    check("FREQ=WEEKLY;COUNT=10;WKST=SU;BYDAY=TU,TH", start, &expected);
}

#[test]
fn every_other_week_monday_wednesday_friday() {
    check(
        "FREQ=WEEKLY;INTERVAL=2;UNTIL=19971224T000000Z;WKST=SU;BYDAY=MO,WE,FR",
        floating(1997, 9, 1, 9, 0, 0),
        &[
            "19970903T090000",
            "19970905T090000",
            "19970915T090000",
            "19970917T090000",
            "19970919T090000",
            "19970929T090000",
            "19971001T090000",
            "19971003T090000",
            "19971013T090000",
            "19971015T090000",
            "19971017T090000",
            "19971027T090000",
            "19971029T090000",
            "19971031T090000",
            "19971110T090000",
            "19971112T090000",
            "19971114T090000",
            "19971124T090000",
            "19971126T090000",
            "19971128T090000",
            "19971208T090000",
            "19971210T090000",
            "19971212T090000",
            "19971222T090000",
        ],
    );
}

#[test]
fn every_other_week_tuesday_thursday_for_8_occurrences() {
    check(
        "FREQ=WEEKLY;INTERVAL=2;COUNT=8;WKST=SU;BYDAY=TU,TH",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970904T090000",
            "19970916T090000",
            "19970918T090000",
            "19970930T090000",
            "19971002T090000",
            "19971014T090000",
            "19971016T090000",
        ],
    );
}

#[test]
fn monthly_on_first_friday() {
    check(
        "FREQ=MONTHLY;COUNT=10;BYDAY=1FR",
        floating(1997, 9, 5, 9, 0, 0),
        &[
            "19971003T090000",
            "19971107T090000",
            "19971205T090000",
            "19980102T090000",
            "19980206T090000",
            "19980306T090000",
            "19980403T090000",
            "19980501T090000",
            "19980605T090000",
        ],
    );
}

#[test]
fn every_other_month_first_and_last_sunday() {
    check(
        "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU",
        floating(1997, 9, 7, 9, 0, 0),
        &[
            "19970928T090000",
            "19971102T090000",
            "19971130T090000",
            "19980104T090000",
            "19980125T090000",
            "19980301T090000",
            "19980329T090000",
            "19980503T090000",
            "19980531T090000",
        ],
    );
}

#[test]
fn monthly_second_to_last_monday() {
    check(
        "FREQ=MONTHLY;COUNT=6;BYDAY=-2MO",
        floating(1997, 9, 22, 9, 0, 0),
        &[
            "19971020T090000",
            "19971117T090000",
            "19971222T090000",
            "19980119T090000",
            "19980216T090000",
        ],
    );
}

#[test]
fn monthly_third_to_last_day() {
    check_first(
        "FREQ=MONTHLY;BYMONTHDAY=-3",
        floating(1997, 9, 28, 9, 0, 0),
        5,
        &[
            "19971029T090000",
            "19971128T090000",
            "19971229T090000",
            "19980129T090000",
            "19980226T090000",
        ],
    );
}

#[test]
fn monthly_on_2nd_and_15th() {
    check(
        "FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970915T090000",
            "19971002T090000",
            "19971015T090000",
            "19971102T090000",
            "19971115T090000",
            "19971202T090000",
            "19971215T090000",
            "19980102T090000",
            "19980115T090000",
        ],
    );
}

#[test]
fn monthly_skips_missing_days() {
    check(
        "FREQ=MONTHLY;BYMONTHDAY=15,30;COUNT=5",
        floating(2007, 1, 15, 9, 0, 0),
        &[
            "20070130T090000",
            "20070215T090000",
            "20070315T090000",
            "20070330T090000",
        ],
    );
}

#[test]
fn yearly_in_june_and_july() {
    check(
        "FREQ=YEARLY;COUNT=10;BYMONTH=6,7",
        floating(1997, 6, 10, 9, 0, 0),
        &[
            "19970710T090000",
            "19980610T090000",
            "19980710T090000",
            "19990610T090000",
            "19990710T090000",
            "20000610T090000",
            "20000710T090000",
            "20010610T090000",
            "20010710T090000",
        ],
    );
}

#[test]
fn every_third_year_on_year_days() {
    check(
        "FREQ=YEARLY;INTERVAL=3;COUNT=10;BYYEARDAY=1,100,200",
        floating(1997, 1, 1, 9, 0, 0),
        &[
            "19970410T090000",
            "19970719T090000",
            "20000101T090000",
            "20000409T090000",
            "20000718T090000",
            "20030101T090000",
            "20030410T090000",
            "20030719T090000",
            "20060101T090000",
        ],
    );
}

#[test]
fn monday_of_week_20() {
    check_first(
        "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
        floating(1997, 5, 12, 9, 0, 0),
        2,
        &["19980511T090000", "19990517T090000"],
    );
}

#[test]
fn every_thursday_in_march() {
    check_first(
        "FREQ=YEARLY;BYMONTH=3;BYDAY=TH",
        floating(1997, 3, 13, 9, 0, 0),
        10,
        &[
            "19970320T090000",
            "19970327T090000",
            "19980305T090000",
            "19980312T090000",
            "19980319T090000",
            "19980326T090000",
            "19990304T090000",
            "19990311T090000",
            "19990318T090000",
            "19990325T090000",
        ],
    );
}

#[test]
fn friday_the_13th() {
    check_first(
        "FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13",
        floating(1997, 9, 2, 9, 0, 0),
        5,
        &[
            "19980213T090000",
            "19980313T090000",
            "19981113T090000",
            "19990813T090000",
            "20001013T090000",
        ],
    );
}

#[test]
fn first_saturday_after_first_sunday() {
    check_first(
        "FREQ=MONTHLY;BYDAY=SA;BYMONTHDAY=7,8,9,10,11,12,13",
        floating(1997, 9, 13, 9, 0, 0),
        5,
        &[
            "19971011T090000",
            "19971108T090000",
            "19971213T090000",
            "19980110T090000",
            "19980207T090000",
        ],
    );
}

#[test]
fn us_presidential_election_day() {
    check_first(
        "FREQ=YEARLY;INTERVAL=4;BYMONTH=11;BYDAY=TU;BYMONTHDAY=2,3,4,5,6,7,8",
        floating(1996, 11, 5, 9, 0, 0),
        2,
        &["20001107T090000", "20041102T090000"],
    );
}

#[test]
fn third_tuesday_wednesday_or_thursday() {
    check(
        "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3",
        floating(1997, 9, 4, 9, 0, 0),
        &["19971007T090000", "19971106T090000"],
    );
}

#[test]
fn second_to_last_weekday() {
    check_first(
        "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2",
        floating(1997, 9, 29, 9, 0, 0),
        3,
        &["19971030T090000", "19971127T090000", "19971230T090000"],
    );
}

#[test]
fn every_3_hours_until_5pm() {
    check(
        "FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T170000Z",
        floating(1997, 9, 2, 9, 0, 0),
        &["19970902T120000", "19970902T150000"],
    );
}

#[test]
fn every_15_minutes_for_6_occurrences() {
    check(
        "FREQ=MINUTELY;INTERVAL=15;COUNT=6",
        floating(1997, 9, 2, 9, 0, 0),
        &[
            "19970902T091500",
            "19970902T093000",
            "19970902T094500",
            "19970902T100000",
            "19970902T101500",
        ],
    );
}

#[test]
fn every_20_minutes_during_office_hours() {
    let mut expected = Vec::new();
    for hour in 9..=16 {
        for minute in [0, 20, 40] {
            expected.push(format!("19970902T{hour:02}{minute:02}00"));
        }
    }
    expected.remove(0);
    expected.push("19970903T090000".to_owned());
    expected.push("19970903T092000".to_owned());
    let expected = expected.iter().map(String::as_str).collect::<Vec<_>>();

    let start = floating(1997, 9, 2, 9, 0, 0);
    check_first(
        "FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16;BYMINUTE=0,20,40",
        start.clone(),
        25,
        &expected,
    );
    check_first(
        "FREQ=MINUTELY;INTERVAL=20;BYHOUR=9,10,11,12,13,14,15,16",
        start,
        25,
        &expected,
    );
}

#[test]
fn week_start_changes_the_result() {
    let start = floating(1997, 8, 5, 9, 0, 0);
    check(
        "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=MO",
        start.clone(),
        &["19970810T090000", "19970819T090000", "19970824T090000"],
    );
    check(
        "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU",
        start,
        &["19970817T090000", "19970819T090000", "19970831T090000"],
    );
}

#[test]
fn yearly_leap_day_all_day() {
    check(
        "FREQ=YEARLY;COUNT=3",
        date(2024, 2, 29),
        &["20280229", "20320229"],
    );
}
