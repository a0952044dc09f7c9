use criterion::{Criterion, criterion_group, criterion_main};
use ical_stream::{
    CollectingSink, ComponentParser, Emitter, LineReader, ParseReport, ParserOptions,
    RecurrenceRule,
    parser::{ContentLine, Line},
    types::{CalendarDate, DateContext},
};

const EVENTS: &str = include_str!("../tests/resources/ical_events.ics");

fn parse_events() -> (ParseReport, CollectingSink) {
    let mut sink = CollectingSink::default();
    let mut parser = ComponentParser::with_options(ParserOptions::strict());
    parser.add_sink(&mut sink);
    let report = parser.parse_slice(EVENTS.as_bytes());
    drop(parser);
    (report, sink)
}

fn benchmark(c: &mut Criterion) {
    let ctx = DateContext::default();
    let mut group = c.benchmark_group("parse_type");
    group.bench_function("parse CalendarDate date", |b| {
        b.iter(|| {
            CalendarDate::parse("19700329", None, None, &ctx).unwrap();
        })
    });
    group.bench_function("parse CalendarDate UTC", |b| {
        b.iter(|| {
            CalendarDate::parse("19700329T020000Z", None, None, &ctx).unwrap();
        })
    });
    group.bench_function("parse CalendarDate TZID", |b| {
        b.iter(|| {
            CalendarDate::parse("19700329T020000", Some("Europe/Berlin"), None, &ctx).unwrap();
        })
    });
    group.bench_function("ics parse ATTENDEE", |b| {
        let line = Line::new(
            r#"ATTENDEE;CN="Doe, Jane";ROLE=REQ-PARTICIPANT:mailto:jane@example.com"#,
            1,
        );
        b.iter(|| {
            ContentLine::parse(&line).unwrap();
        })
    });
    drop(group);

    let mut group = c.benchmark_group("lines");
    group.bench_function("line parse ical_events.ics", |b| {
        b.iter(|| {
            let reader = LineReader::from_slice(EVENTS.as_bytes());
            for _ in reader {}
        })
    });
    drop(group);

    let mut group = c.benchmark_group("comps_parse");
    group.bench_function("ics parse ical_events.ics", |b| b.iter(parse_events));
    drop(group);

    let mut group = c.benchmark_group("comps_serialise");
    let (_, sink) = parse_events();
    group.bench_function("ics serialise ical_events.ics", |b| {
        b.iter(|| sink.timezones.generate() + &sink.events.generate())
    });
    drop(group);

    let mut group = c.benchmark_group("rrule");
    let start = CalendarDate::floating(2024, 1, 1, 9, 0, 0).unwrap();
    let monthly: RecurrenceRule = "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1;COUNT=120"
        .parse()
        .unwrap();
    group.bench_function("expand last weekday of month", |b| {
        b.iter(|| monthly.generate(&start, None, &[], &[]).unwrap())
    });
    let daily: RecurrenceRule = "FREQ=DAILY;UNTIL=20341231T090000".parse().unwrap();
    group.bench_function("expand daily for ten years", |b| {
        b.iter(|| daily.generate(&start, None, &[], &[]).unwrap())
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
