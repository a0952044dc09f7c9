use ical_stream::{
    CollectingSink, ComponentParser, Emitter, LineReader, ParseReport, ParserOptions,
};
use std::borrow::Cow;

// Simple function for sorting properties and components
// to allow for order-invariant comparison of Emitter outputs
pub fn lines_normalise_prop_order<'a>(
    line_iter: &mut impl Iterator<Item = Cow<'a, str>>,
    header: Option<Cow<'a, str>>,
) -> Vec<Cow<'a, str>> {
    let mut props = vec![];
    let mut comps = vec![];
    let mut end = None;
    while let Some(line) = line_iter.next() {
        if line.to_uppercase().starts_with("BEGIN:") {
            comps.push(lines_normalise_prop_order(line_iter, Some(line)));
        } else if line.to_uppercase().starts_with("END:") {
            end = Some(line);
            break;
        } else {
            props.push(line);
        }
    }
    assert_eq!(header.is_some(), end.is_some());
    props.sort();

    [
        header.map(|hdr| vec![hdr]).unwrap_or_default(),
        props,
        comps.into_iter().flatten().collect(),
        end.map(|end| vec![end]).unwrap_or_default(),
    ]
    .concat()
}

pub fn str_normalise_prop_order(input: &str) -> String {
    let mut lines = LineReader::from_slice(input.as_bytes())
        .map(|line| Cow::Owned(line.unwrap().into_inner()));
    let sorted = lines_normalise_prop_order(&mut lines, None);
    sorted.join("\r\n") + "\r\n"
}

pub fn parse(input: &str, options: ParserOptions) -> (ParseReport, CollectingSink) {
    let mut sink = CollectingSink::default();
    let mut parser = ComponentParser::with_options(options);
    parser.add_sink(&mut sink);
    let report = parser.parse_slice(input.as_bytes());
    drop(parser);
    (report, sink)
}

/// Components in the order the fixtures list them.
pub fn generate(report: &ParseReport, sink: &CollectingSink) -> String {
    let body = [
        sink.timezones.generate(),
        sink.events.generate(),
        sink.todos.generate(),
        sink.journals.generate(),
        sink.freebusys.generate(),
        sink.availabilities.generate(),
        sink.locations.generate(),
        sink.resources.generate(),
        sink.participants.generate(),
    ]
    .concat();
    report.calendar.generate_calendar(&body)
}

pub mod sort_lines {
    use crate::lines_normalise_prop_order;
    use ical_stream::LineReader;
    use itertools::Itertools;
    use std::borrow::Cow;

    #[test]
    fn test_sort_output_lines() {
        let lines = vec![
            "a",
            "c",
            "b",
            "begin:event",
            "d",
            "a",
            "begin:alarm",
            "g",
            "f",
            "end:alarm",
            "end:event",
            "begin:event",
            "p",
            "a",
            "end:event",
            "d",
        ];
        let input = lines.join("\r\n") + "\r\n";
        let mut lines = LineReader::from_slice(input.as_bytes())
            .map(|line| Cow::Owned(line.unwrap().into_inner()));
        let sorted = lines_normalise_prop_order(&mut lines, None);
        assert_eq!(
            sorted.iter().collect_vec(),
            vec![
                "a",
                "b",
                "c",
                "d",
                "begin:event",
                "a",
                "d",
                "begin:alarm",
                "f",
                "g",
                "end:alarm",
                "end:event",
                "begin:event",
                "a",
                "p",
                "end:event",
            ]
        );
    }
}

pub mod property {
    use ical_stream::ContentLineParser;
    use rstest::rstest;

    #[rstest]
    #[case(include_str!("./resources/ical_events.ics"), 64)]
    #[case(include_str!("./resources/ical_todos.ics"), 40)]
    fn tokenize_fixture(#[case] input: &str, #[case] count: usize) {
        let lines = ContentLineParser::from_slice(input.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(lines.len(), count);
        assert!(lines.iter().all(|line| line.name == line.name.to_uppercase()));
    }

    #[test]
    fn folded_value() {
        let input = include_str!("./resources/ical_events.ics");
        let description = ContentLineParser::from_slice(input.as_bytes())
            .map(Result::unwrap)
            .find(|line| line.name == "DESCRIPTION")
            .unwrap();
        assert_eq!(
            description.value,
            "Daily standup. Keep it short and mention blockers first, then everything else."
        );
    }
}

pub mod calendar {
    use crate::{generate, parse, str_normalise_prop_order};
    use ical_stream::{
        ParseMode, ParserOptions, Properties, Recurring, property::Trigger,
    };
    use rstest::rstest;

    fn dates(dates: Vec<ical_stream::CalendarDate>) -> Vec<String> {
        dates.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn events() {
        let (report, sink) = parse(
            include_str!("./resources/ical_events.ics"),
            ParserOptions::strict(),
        );
        assert!(report.success, "{:?}", report.errors);
        assert_eq!(report.component_count, 4);
        assert_eq!(sink.method.as_deref(), Some("PUBLISH"));
        assert_eq!(report.calendar.extensions.len(), 1);

        let timezone = &sink.timezones[0];
        assert_eq!(timezone.get_tzid(), "Europe/Berlin");
        assert_eq!(timezone.transitions.len(), 2);

        let standup = &sink.events[0];
        assert_eq!(standup.get_summary(), Some("Standup"));
        assert_eq!(standup.alarms.len(), 1);
        similar_asserts::assert_eq!(
            dates(standup.occurrences().unwrap()),
            [
                "20240112T083000Z",
                "20240113T100000Z",
                "20240115T083000Z",
                "20240117T083000Z",
                "20240119T083000Z",
            ]
        );

        let holiday = &sink.events[1];
        assert!(holiday.get_dtstart().is_date_only());
        assert_eq!(holiday.get_end().unwrap().to_string(), "20241226");

        let launch = &sink.events[2];
        assert_eq!(launch.alarms.len(), 2);
        assert!(matches!(launch.alarms[0].trigger.0, Trigger::Absolute(_)));
        assert!(launch.alarms[1].trigger.is_related_to_end());
    }

    #[test]
    fn local_timezone() {
        let options = ParserOptions::strict().with_local_timezone(chrono_tz::Asia::Tokyo);
        let (report, sink) = parse(include_str!("./resources/ical_events.ics"), options);
        assert!(report.success, "{:?}", report.errors);
        let start = sink.events[0].get_dtstart();
        assert_eq!(start.tzid(), Some("Asia/Tokyo"));
        assert_eq!((start.hour(), start.minute()), (17, 30));
        // serialization always goes back to UTC
        assert_eq!(start.to_string(), "20240108T083000Z");
    }

    #[test]
    fn todos_journals_freebusy() {
        let (report, sink) = parse(
            include_str!("./resources/ical_todos.ics"),
            ParserOptions::strict(),
        );
        assert!(report.success, "{:?}", report.errors);
        assert_eq!(report.component_count, 4);

        assert_eq!(sink.todos[0].get_alarms().len(), 1);
        assert_eq!(
            sink.todos[0].get_last_occurence().unwrap().to_string(),
            "20240106T170000Z"
        );
        similar_asserts::assert_eq!(
            dates(sink.todos[1].occurrences().unwrap()),
            ["20240201", "20240301", "20240401"]
        );
        assert_eq!(sink.journals[0].get_uid(), Some("journal-1@example.com"));
        assert_eq!(sink.freebusys[0].get_periods().len(), 3);
    }

    #[test]
    fn rfc9073_components() {
        let (report, sink) = parse(
            include_str!("./resources/rfc9073.ics"),
            ParserOptions::strict(),
        );
        assert!(report.success, "{:?}", report.errors);
        assert_eq!(report.component_count, 4);

        let event = &sink.events[0];
        assert_eq!(event.participants[0].get_uid(), "speaker-1");
        assert_eq!(event.locations[0].get_name(), Some("Hall A"));
        assert_eq!(event.resources[0].get_resource_type(), Some("PROJECTOR"));

        let availability = &sink.availabilities[0];
        assert_eq!(availability.get_busy_type(), "BUSY");
        assert_eq!(availability.available[0].occurrences().unwrap().len(), 2);
        assert_eq!(sink.locations[0].get_uid(), "hall-b");
        assert_eq!(sink.participants[0].participant_type.as_deref(), Some("ATTENDEE"));
    }

    #[rstest]
    #[case(ParseMode::Rfc2445Compat, 0, &["20240102T100000Z", "20240104T100000Z", "20240106T100000Z", "20240107T100000Z"][..])]
    #[case(ParseMode::Loose, 0, &["20240102T100000Z", "20240103T100000Z", "20240104T100000Z", "20240105T100000Z", "20240106T100000Z", "20240107T100000Z"][..])]
    #[case(ParseMode::Strict, 1, &["20240102T100000Z", "20240103T100000Z", "20240104T100000Z", "20240105T100000Z", "20240106T100000Z", "20240107T100000Z"][..])]
    fn exrule_by_mode(#[case] mode: ParseMode, #[case] errors: usize, #[case] expected: &[&str]) {
        let (report, sink) = parse(
            include_str!("./resources/rfc2445_exrule.ics"),
            ParserOptions::default().with_mode(mode),
        );
        assert_eq!(report.errors.len(), errors, "{:?}", report.errors);
        similar_asserts::assert_eq!(dates(sink.events[0].occurrences().unwrap()), expected);
    }

    #[test]
    fn invalid_parameter() {
        let input = include_str!("./resources/invalid_parameter.ics");

        let (report, sink) = parse(input, ParserOptions::strict());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line_number(), 8);
        assert_eq!(report.errors[0].offending_text(), "CATEGORIES;INVALID=VALUE:Work,Home");
        assert!(sink.events[0].get_property("CATEGORIES").is_none());

        let (report, sink) = parse(input, ParserOptions::default());
        assert!(report.success);
        let event = &sink.events[0];
        assert_eq!(event.get_property("CATEGORIES").unwrap().value, "Work,Home");
        assert_eq!(event.get_property("X-CUSTOM-PROP").unwrap().value, "kept");
    }

    #[rstest]
    #[case(include_str!("./resources/ical_events.ics"))]
    #[case(include_str!("./resources/ical_todos.ics"))]
    #[case(include_str!("./resources/rfc9073.ics"))]
    fn roundtrip(#[case] input: &str) {
        let (report, sink) = parse(input, ParserOptions::strict());
        assert!(report.success, "{:?}", report.errors);
        let output = generate(&report, &sink);
        similar_asserts::assert_eq!(
            str_normalise_prop_order(&output),
            str_normalise_prop_order(input)
        );
    }

    #[test]
    fn from_reader() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/ical_todos.ics");
        let file = std::io::BufReader::new(std::fs::File::open(path).unwrap());
        let mut parser = ical_stream::ComponentParser::with_options(ParserOptions::strict());
        let report = parser.parse_reader(file);
        assert!(report.success, "{:?}", report.errors);
        assert_eq!(report.component_count, 4);
    }
}

pub mod recurrence {
    use ical_stream::{CalendarDate, RecurrenceRule};
    use rstest::rstest;

    #[rstest]
    #[case("FREQ=DAILY;BYMONTHDAY=15", false)]
    #[case("FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10", true)]
    #[case("FREQ=MONTHLY;BYYEARDAY=100", false)]
    #[case("FREQ=YEARLY;COUNT=2;UNTIL=20250101T000000Z", false)]
    fn validity(#[case] rule: &str, #[case] valid: bool) {
        let parsed = rule.parse::<RecurrenceRule>();
        assert_eq!(parsed.is_ok_and(|rule| rule.is_valid()), valid);
    }

    #[test]
    fn unbounded_rule_terminates() {
        let rule: RecurrenceRule = "FREQ=DAILY".parse().unwrap();
        let start = CalendarDate::floating(2024, 1, 1, 12, 0, 0).unwrap();
        let dates = rule.generate(&start, None, &[], &[]).unwrap();
        assert!(!dates.is_empty());
        assert!(dates.len() <= 10_000);
        assert!(dates.windows(2).all(|w| w[0].compare(&w[1]).is_lt()));
        assert!(!dates.contains(&start));
    }
}
