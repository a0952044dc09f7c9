//! The BEGIN/END state machine.
//!
//! Logical lines are read once, front to back. Each top-level component is buffered from
//! its BEGIN line to its matching END line (nested components included), handed to its
//! builder, and forwarded to every sink when the result is valid.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;

use chrono_tz::Tz;

use crate::{
    component::{
        BuildContext, Component, IcalAvailability, IcalEvent, IcalFreeBusy, IcalJournal,
        IcalLocation, IcalParticipant, IcalResource, IcalTimeZone, IcalTodo,
    },
    parser::{
        ComponentMarker, ContentLine, Line, LineError, LineReader, ParseError,
        ParserError, ParserOptions, Property,
    },
    sink::{CalendarSink, ErrorListener},
};

/// Where the state machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserState {
    /// Before `BEGIN:VCALENDAR`.
    #[default]
    None,
    Calendar,
    Event,
    Todo,
    Journal,
    Timezone,
    TimezoneStandard,
    TimezoneDaylight,
    Freebusy,
    VLocation,
    VResource,
    VAvailability,
    Participant,
    /// After `END:VCALENDAR`.
    Done,
}

impl ParserState {
    /// State entered by a `BEGIN:<name>` at calendar level.
    pub fn for_component(name: &str) -> Option<Self> {
        Some(match name {
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VTIMEZONE" => Self::Timezone,
            "VFREEBUSY" => Self::Freebusy,
            "VLOCATION" => Self::VLocation,
            "VRESOURCE" => Self::VResource,
            "VAVAILABILITY" => Self::VAvailability,
            "PARTICIPANT" => Self::Participant,
            _ => return None,
        })
    }

    /// Whether VALARM may open inside this state.
    #[inline]
    fn takes_alarms(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal)
    }
}

/// Calendar-level properties of the last parsed VCALENDAR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarProperties {
    pub version: Option<String>,
    pub prodid: Option<String>,
    pub method: Option<String>,
    pub calscale: Option<String>,
    pub name: Option<String>,
    pub calendar_address: Option<String>,
    /// `X-` properties, in document order.
    pub extensions: Vec<ContentLine>,
    /// Everything else that was accepted at calendar level.
    pub other: Vec<ContentLine>,
}

/// Outcome of one [`ComponentParser::parse`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// `true` when no error was recorded.
    pub success: bool,
    pub errors: Vec<ParseError>,
    /// Components forwarded to the sinks.
    pub component_count: usize,
    pub calendar: CalendarProperties,
}

/// Streaming iCalendar parser.
///
/// # Examples
///
/// ```rust
/// use ical_stream::{ComponentParser, ParserOptions, sink::CollectingSink};
///
/// let input = b"BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//y//EN\r\n\
///     BEGIN:VEVENT\r\nUID:1\r\nDTSTART:20240101T100000Z\r\nEND:VEVENT\r\n\
///     END:VCALENDAR\r\n";
/// let mut sink = CollectingSink::default();
/// let mut parser = ComponentParser::with_options(ParserOptions::strict());
/// parser.add_sink(&mut sink);
/// let report = parser.parse_slice(input);
/// assert!(report.success);
/// assert_eq!(report.component_count, 1);
/// drop(parser);
/// assert_eq!(sink.events[0].get_uid(), Some("1"));
/// ```
#[derive(Default)]
pub struct ComponentParser<'s> {
    options: ParserOptions,
    sinks: Vec<Box<dyn CalendarSink + 's>>,
    listeners: Vec<Box<dyn ErrorListener + 's>>,
    errors: Vec<ParseError>,
}

impl<'s> ComponentParser<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[inline]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Sinks are called in registration order.
    pub fn add_sink(&mut self, sink: impl CalendarSink + 's) {
        self.sinks.push(Box::new(sink));
    }

    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 's) {
        self.listeners.push(Box::new(listener));
    }

    /// Errors of the last run.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse<'a, I>(&mut self, mut lines: LineReader<'a, I>) -> ParseReport
    where
        I: Iterator<Item = Cow<'a, [u8]>>,
    {
        let mut ctx = ParseContext::new(&self.options, &mut self.sinks, &mut self.listeners);
        ctx.parse_document(&mut lines);
        let report = ctx.finish();
        self.errors.clone_from(&report.errors);
        report
    }

    pub fn parse_slice(&mut self, slice: &[u8]) -> ParseReport {
        self.parse(LineReader::from_slice(slice))
    }

    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> ParseReport {
        self.parse(LineReader::from_reader(reader))
    }
}

/// Returned by a nested read when the stream ended first.
struct EndOfStream;

/// State of one `parse()` run.
struct ParseContext<'p, 's> {
    options: &'p ParserOptions,
    sinks: &'p mut Vec<Box<dyn CalendarSink + 's>>,
    listeners: &'p mut Vec<Box<dyn ErrorListener + 's>>,
    state: ParserState,
    /// Zones of the valid VTIMEZONE components seen so far, by TZID.
    timezones: HashMap<String, Tz>,
    calendar: CalendarProperties,
    errors: Vec<ParseError>,
    component_count: usize,
    /// Number of the last line read.
    line_number: usize,
}

impl<'p, 's> ParseContext<'p, 's> {
    fn new(
        options: &'p ParserOptions,
        sinks: &'p mut Vec<Box<dyn CalendarSink + 's>>,
        listeners: &'p mut Vec<Box<dyn ErrorListener + 's>>,
    ) -> Self {
        Self {
            options,
            sinks,
            listeners,
            state: ParserState::None,
            timezones: HashMap::new(),
            calendar: CalendarProperties::default(),
            errors: vec![],
            component_count: 0,
            line_number: 0,
        }
    }

    #[inline]
    fn is_strict(&self) -> bool {
        self.options.mode.is_strict()
    }

    fn notify(&mut self, error: ParseError) {
        for listener in self.listeners.iter_mut() {
            listener.on_error(&error);
        }
        self.errors.push(error);
    }

    fn fail(&mut self, line_number: usize, err: &ParserError, text: &str) {
        tracing::warn!(line_number, state = ?self.state, "{err}");
        self.notify(ParseError::from_failure(line_number, err, text));
    }

    fn strict_fail(&mut self, line_number: usize, err: &ParserError, text: &str) {
        if self.is_strict() {
            self.fail(line_number, err, text);
        } else {
            tracing::debug!(line_number, state = ?self.state, "ignoring: {err}");
        }
    }

    /// Next decodable logical line. Undecodable lines are reported and skipped.
    fn next_line<I>(&mut self, lines: &mut I) -> Option<Line>
    where
        I: Iterator<Item = Result<Line, LineError>>,
    {
        loop {
            match lines.next()? {
                Ok(line) => {
                    self.line_number = line.number();
                    tracing::trace!(line_number = line.number(), state = ?self.state, "{}", line);
                    return Some(line);
                }
                Err(err @ LineError::InvalidUtf8(number)) => {
                    self.line_number = number;
                    self.fail(number, &err.into(), "");
                }
            }
        }
    }

    fn parse_document<I>(&mut self, lines: &mut I)
    where
        I: Iterator<Item = Result<Line, LineError>>,
    {
        while let Some(line) = self.next_line(lines) {
            if line.is_blank() {
                continue;
            }
            match self.state {
                ParserState::None => match line.component_marker() {
                    Some(ComponentMarker::Begin(name)) if name == "VCALENDAR" => {
                        self.state = ParserState::Calendar;
                        if self.parse_calendar(&line, lines).is_err() {
                            break;
                        }
                    }
                    _ => self.strict_fail(
                        line.number(),
                        &ParserError::DataOutsideCalendar,
                        line.as_str(),
                    ),
                },
                _ => {
                    self.strict_fail(line.number(), &ParserError::TrailingData, line.as_str());
                }
            }
        }

        if self.is_strict() {
            let last_line = self.line_number;
            if self.calendar.version.is_none() {
                self.fail(last_line, &ParserError::MissingProperty("VERSION"), "");
            }
            if self.calendar.prodid.is_none() {
                self.fail(last_line, &ParserError::MissingProperty("PRODID"), "");
            }
        }
    }

    fn parse_calendar<I>(&mut self, begin: &Line, lines: &mut I) -> Result<(), EndOfStream>
    where
        I: Iterator<Item = Result<Line, LineError>>,
    {
        while let Some(line) = self.next_line(lines) {
            if line.is_blank() {
                continue;
            }
            match line.component_marker() {
                Some(ComponentMarker::Begin(name)) => match ParserState::for_component(&name) {
                    Some(state) => {
                        self.state = state;
                        let result = self.parse_component(line, lines);
                        self.state = ParserState::Calendar;
                        if result.is_err() {
                            break;
                        }
                    }
                    None => {
                        self.strict_fail(
                            line.number(),
                            &ParserError::InvalidComponent(name.clone()),
                            line.as_str(),
                        );
                        if self.skip_component(&name, &line, lines).is_err() {
                            break;
                        }
                    }
                },
                Some(ComponentMarker::End(name)) if name == "VCALENDAR" => {
                    self.state = ParserState::Done;
                    return Ok(());
                }
                Some(ComponentMarker::End(found)) => {
                    let err = ParserError::MismatchedEnd {
                        expected: "VCALENDAR".to_owned(),
                        found,
                    };
                    self.strict_fail(line.number(), &err, line.as_str());
                }
                None => self.parse_calendar_property(&line),
            }
        }

        self.fail(
            begin.number(),
            &ParserError::UnterminatedComponent("VCALENDAR".to_owned()),
            begin.as_str(),
        );
        Err(EndOfStream)
    }

    fn parse_calendar_property(&mut self, line: &Line) {
        let date_ctx = BuildContext::new(self.options).date_context();
        let parsed = ContentLine::parse(line)
            .map_err(ParserError::from)
            .and_then(|content_line| {
                Property::parse(&content_line, &date_ctx).map(|_| content_line)
            });
        let content_line = match parsed {
            Ok(content_line) => content_line,
            Err(err) => {
                self.fail(line.number(), &err, line.as_str());
                return;
            }
        };

        let name = content_line.name.as_str();
        let slot = match name {
            "VERSION" => &mut self.calendar.version,
            "PRODID" => &mut self.calendar.prodid,
            "METHOD" => &mut self.calendar.method,
            "CALSCALE" => &mut self.calendar.calscale,
            "NAME" => &mut self.calendar.name,
            "CALENDAR-ADDRESS" => &mut self.calendar.calendar_address,
            _ if content_line.is_extension() => {
                self.calendar.extensions.push(content_line);
                return;
            }
            _ => {
                self.calendar.other.push(content_line);
                return;
            }
        };
        // the first occurrence wins
        if slot.is_some() {
            let err = ParserError::RepeatedProperty(content_line.name.clone());
            self.strict_fail(line.number(), &err, line.as_str());
            return;
        }
        *slot = Some(content_line.value.clone());

        let value = content_line.value.as_str();
        match content_line.name.as_str() {
            "VERSION" if value != "2.0" => {
                self.strict_fail(line.number(), &ParserError::InvalidVersion, line.as_str());
            }
            "CALSCALE" if !value.eq_ignore_ascii_case("GREGORIAN") => {
                self.strict_fail(line.number(), &ParserError::InvalidCalscale, line.as_str());
            }
            "METHOD" => {
                for sink in self.sinks.iter_mut() {
                    sink.set_method(value);
                }
            }
            _ => {}
        }
    }

    /// Buffer one top-level component up to its END line, then build and dispatch it.
    fn parse_component<I>(&mut self, begin: Line, lines: &mut I) -> Result<(), EndOfStream>
    where
        I: Iterator<Item = Result<Line, LineError>>,
    {
        let kind = self.state;
        let start_line = begin.number();
        let Some(ComponentMarker::Begin(name)) = begin.component_marker() else {
            return Ok(());
        };
        let mut buffer = vec![begin];
        // nested components still open, innermost last
        let mut open: Vec<String> = vec![];

        while let Some(line) = self.next_line(lines) {
            match line.component_marker() {
                Some(ComponentMarker::Begin(sub)) => {
                    if open.is_empty() {
                        match sub.as_str() {
                            "STANDARD" if kind == ParserState::Timezone => {
                                self.state = ParserState::TimezoneStandard;
                            }
                            "DAYLIGHT" if kind == ParserState::Timezone => {
                                self.state = ParserState::TimezoneDaylight;
                            }
                            "VALARM" if kind.takes_alarms() => {
                                tracing::trace!(line_number = line.number(), "entering VALARM");
                            }
                            _ => {}
                        }
                    }
                    open.push(sub);
                    buffer.push(line);
                }
                Some(ComponentMarker::End(end)) => {
                    if open.last() == Some(&end) {
                        open.pop();
                        buffer.push(line);
                    } else if open.contains(&end) {
                        self.close_nested(&mut open, Some(&end), &line, &mut buffer);
                        buffer.push(line);
                    } else if end == name {
                        self.close_nested(&mut open, None, &line, &mut buffer);
                        buffer.push(line);
                        self.dispatch(kind, start_line, buffer);
                        return Ok(());
                    } else {
                        let err = ParserError::MismatchedEnd {
                            expected: open.last().unwrap_or(&name).clone(),
                            found: end,
                        };
                        self.strict_fail(line.number(), &err, line.as_str());
                    }
                    if open.is_empty() {
                        self.state = kind;
                    }
                }
                None => buffer.push(line),
            }
        }

        tracing::debug!(line_number = start_line, "discarding unterminated {name}");
        self.fail(
            start_line,
            &ParserError::UnterminatedComponent(name),
            buffer[0].as_str(),
        );
        Err(EndOfStream)
    }

    /// Close the nested components an END line skips over, down to `until` (which is left
    /// open) or all of them.
    fn close_nested(
        &mut self,
        open: &mut Vec<String>,
        until: Option<&String>,
        line: &Line,
        buffer: &mut Vec<Line>,
    ) {
        while open.last().is_some_and(|last| Some(last) != until) {
            let Some(unclosed) = open.pop() else {
                break;
            };
            self.strict_fail(
                line.number(),
                &ParserError::UnterminatedComponent(unclosed.clone()),
                line.as_str(),
            );
            buffer.push(Line::new(format!("END:{unclosed}"), line.number()));
        }
        if until.is_some() {
            open.pop();
        }
    }

    /// Skip an unknown component, nested ones included.
    fn skip_component<I>(
        &mut self,
        name: &str,
        begin: &Line,
        lines: &mut I,
    ) -> Result<(), EndOfStream>
    where
        I: Iterator<Item = Result<Line, LineError>>,
    {
        let mut depth = 1usize;
        while let Some(line) = self.next_line(lines) {
            match line.component_marker() {
                Some(ComponentMarker::Begin(_)) => depth += 1,
                Some(ComponentMarker::End(_)) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                None => {}
            }
        }
        self.fail(
            begin.number(),
            &ParserError::UnterminatedComponent(name.to_owned()),
            begin.as_str(),
        );
        Err(EndOfStream)
    }

    fn build<C: Component>(&mut self, start_line: usize, lines: Vec<Line>) -> Option<C> {
        let built = {
            let ctx = BuildContext::new(self.options).with_timezones(&self.timezones);
            C::build(&ctx, start_line, lines)
        };
        for error in built.errors {
            self.notify(error);
        }
        match built.component {
            Some(component) => {
                tracing::debug!(line_number = start_line, "built {}", component.get_comp_name());
                self.component_count += 1;
                Some(component)
            }
            None => {
                tracing::debug!(line_number = start_line, "discarded invalid {}", C::NAMES[0]);
                None
            }
        }
    }

    fn dispatch(&mut self, kind: ParserState, start_line: usize, lines: Vec<Line>) {
        macro_rules! forward {
            ($component:ty, $store:ident) => {
                if let Some(component) = self.build::<$component>(start_line, lines) {
                    for sink in self.sinks.iter_mut() {
                        sink.$store(&component);
                    }
                }
            };
        }

        match kind {
            ParserState::Event => forward!(IcalEvent, store_event),
            ParserState::Todo => forward!(IcalTodo, store_todo),
            ParserState::Journal => forward!(IcalJournal, store_journal),
            ParserState::Freebusy => forward!(IcalFreeBusy, store_freebusy),
            ParserState::VLocation => forward!(IcalLocation, store_vlocation),
            ParserState::VResource => forward!(IcalResource, store_vresource),
            ParserState::VAvailability => forward!(IcalAvailability, store_vavailability),
            ParserState::Participant => forward!(IcalParticipant, store_participant),
            ParserState::Timezone => {
                if let Some(timezone) = self.build::<IcalTimeZone>(start_line, lines) {
                    match Option::<Tz>::from(&timezone) {
                        Some(tz) => {
                            self.timezones.insert(timezone.get_tzid().to_owned(), tz);
                        }
                        None => tracing::debug!(
                            tzid = timezone.get_tzid(),
                            "VTIMEZONE does not map to a known zone"
                        ),
                    }
                    for sink in self.sinks.iter_mut() {
                        sink.store_timezone(&timezone);
                    }
                }
            }
            ParserState::None
            | ParserState::Calendar
            | ParserState::TimezoneStandard
            | ParserState::TimezoneDaylight
            | ParserState::Done => {}
        }
    }

    fn finish(self) -> ParseReport {
        ParseReport {
            success: self.errors.is_empty(),
            errors: self.errors,
            component_count: self.component_count,
            calendar: self.calendar,
        }
    }
}
