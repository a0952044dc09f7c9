pub mod ical;
pub use ical::component::*;

mod recurrence;
pub use recurrence::{RecurrenceSet, Recurring};

use chrono_tz::Tz;
use std::collections::HashMap;

use crate::parser::{
    ComponentMarker, ContentLine, ICalProperty, Line, ParseError, ParseMode, ParserError,
    ParserOptions, Property,
};
use crate::property::GetProperty;
use crate::types::DateContext;

/// Read access to the properties of a component, built or not.
pub trait Properties {
    fn get_properties(&self) -> &[ContentLine];

    fn get_property<'c>(&'c self, name: &str) -> Option<&'c ContentLine> {
        self.get_properties().iter().find(|p| p.name == name)
    }

    fn get_named_properties<'c>(&'c self, name: &'c str) -> impl Iterator<Item = &'c ContentLine> {
        self.get_properties().iter().filter(move |p| p.name == name)
    }
}

/// A typed iCalendar component, built once from the buffered lines between its BEGIN and
/// END markers.
pub trait Component: Properties + Sized {
    const NAMES: &[&str];

    fn get_comp_name(&self) -> &'static str {
        Self::NAMES[0]
    }

    /// Physical line number of the BEGIN marker.
    fn start_line(&self) -> usize;

    /// `lines` runs from the BEGIN line to the END line, nested components included.
    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self>;
}

/// What a component builder has to go on besides the lines.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub options: &'a ParserOptions,
    /// Zones of the VTIMEZONE components seen so far.
    pub timezones: Option<&'a HashMap<String, Tz>>,
}

impl<'a> BuildContext<'a> {
    pub fn new(options: &'a ParserOptions) -> Self {
        Self {
            options,
            timezones: None,
        }
    }

    pub fn with_timezones(mut self, timezones: &'a HashMap<String, Tz>) -> Self {
        self.timezones = Some(timezones);
        self
    }

    #[inline]
    pub fn mode(&self) -> ParseMode {
        self.options.mode
    }

    pub fn date_context(&self) -> DateContext<'a> {
        DateContext {
            mode: self.options.mode,
            local_timezone: self.options.local_timezone,
            timezones: self.timezones,
        }
    }
}

/// Result of a component builder. `component` is `None` when the buffered lines don't make
/// a valid component; `errors` lists everything that was skipped or rejected on the way.
#[derive(Debug)]
pub struct Built<C> {
    pub component: Option<C>,
    pub errors: Vec<ParseError>,
}

impl<C> Built<C> {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.component.is_some()
    }
}

/// A nested component cut out of its parent's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubComponent {
    pub name: String,
    pub start_line: usize,
    pub lines: Vec<Line>,
}

/// Split a component buffer into its own property lines and its direct children.
///
/// The BEGIN/END lines of the component itself are dropped.
pub fn split_lines(lines: Vec<Line>) -> (Vec<Line>, Vec<SubComponent>) {
    let mut properties = vec![];
    let mut children: Vec<SubComponent> = vec![];
    let mut depth = 0usize;
    let mut current: Option<SubComponent> = None;
    let last = lines.len().saturating_sub(1);

    for (index, line) in lines.into_iter().enumerate() {
        if index == 0 || index == last {
            if line.component_marker().is_some() {
                continue;
            }
        }
        match (line.component_marker(), current.as_mut()) {
            (Some(ComponentMarker::Begin(name)), None) => {
                depth = 1;
                current = Some(SubComponent {
                    name,
                    start_line: line.number(),
                    lines: vec![line],
                });
            }
            (Some(ComponentMarker::Begin(_)), Some(child)) => {
                depth += 1;
                child.lines.push(line);
            }
            (Some(ComponentMarker::End(_)), Some(child)) => {
                child.lines.push(line);
                depth -= 1;
                if depth == 0 {
                    children.extend(current.take());
                }
            }
            (_, Some(child)) => child.lines.push(line),
            // stray END, already reported while buffering
            (Some(ComponentMarker::End(_)), None) => {}
            (None, None) => properties.push(line),
        }
    }
    children.extend(current);
    (properties, children)
}

/// Shared state of the component builders: the parsed property lines, the nested
/// components that still have to be built, and the errors met so far.
pub(crate) struct Builder<'c, 'a> {
    ctx: &'c BuildContext<'a>,
    name: &'static str,
    start_line: usize,
    properties: Vec<ContentLine>,
    children: Vec<SubComponent>,
    errors: Vec<ParseError>,
    valid: bool,
}

impl Properties for Builder<'_, '_> {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl<'c, 'a> Builder<'c, 'a> {
    /// Tokenize and type-check every property line. A line that fails is recorded and
    /// left out; the component itself survives.
    pub(crate) fn new(
        ctx: &'c BuildContext<'a>,
        name: &'static str,
        start_line: usize,
        lines: Vec<Line>,
    ) -> Self {
        let (property_lines, children) = split_lines(lines);
        let mut builder = Self {
            ctx,
            name,
            start_line,
            properties: Vec::with_capacity(property_lines.len()),
            children,
            errors: vec![],
            valid: true,
        };

        let date_ctx = ctx.date_context();
        for line in property_lines {
            if line.is_blank() {
                continue;
            }
            let parsed = ContentLine::parse(&line)
                .map_err(ParserError::from)
                .and_then(|content_line| {
                    Property::parse(&content_line, &date_ctx).map(|_| content_line)
                });
            match parsed {
                Ok(content_line) => builder.properties.push(content_line),
                Err(err) => builder.report(line.number(), &err, line.as_str()),
            }
        }
        builder
    }

    #[inline]
    pub(crate) fn mode(&self) -> ParseMode {
        self.ctx.mode()
    }

    #[inline]
    pub(crate) fn date_context(&self) -> DateContext<'a> {
        self.ctx.date_context()
    }

    #[inline]
    pub(crate) fn context(&self) -> &'c BuildContext<'a> {
        self.ctx
    }

    #[inline]
    pub(crate) fn start_line(&self) -> usize {
        self.start_line
    }

    pub(crate) fn report(&mut self, line_number: usize, err: &ParserError, text: &str) {
        tracing::warn!(line_number, component = self.name, "{err}");
        self.errors
            .push(ParseError::from_failure(line_number, err, text));
    }

    /// Mark the component as invalid. The reason is only reported in strict mode.
    pub(crate) fn invalidate(&mut self, err: ParserError) {
        tracing::debug!(
            line_number = self.start_line,
            component = self.name,
            "discarding component: {err}"
        );
        self.valid = false;
        if self.mode().is_strict() {
            let text = format!("BEGIN:{}", self.name);
            self.report(self.start_line, &err, &text);
        }
    }

    /// Exactly one instance, in every mode.
    pub(crate) fn required<T: ICalProperty>(&mut self) -> Option<T> {
        match self.safe_get_required::<T>(&self.date_context()) {
            Ok(prop) => Some(prop),
            Err(err) => {
                self.invalidate(err);
                None
            }
        }
    }

    /// Required in strict mode, optional otherwise.
    pub(crate) fn strict_required<T: ICalProperty>(&mut self) -> Option<T> {
        if self.mode().is_strict() {
            self.required()
        } else {
            self.optional()
        }
    }

    /// At most one instance. Loose mode takes the first of several.
    pub(crate) fn optional<T: ICalProperty>(&mut self) -> Option<T> {
        let ctx = self.date_context();
        match self.safe_get_optional::<T>(&ctx) {
            Ok(prop) => prop,
            Err(err @ ParserError::RepeatedProperty(_)) if self.mode().is_strict() => {
                self.invalidate(err);
                None
            }
            Err(ParserError::RepeatedProperty(_)) => {
                self.all::<T>().into_iter().next()
            }
            Err(err) => {
                let text = T::NAME.to_owned();
                self.report(self.start_line, &err, &text);
                None
            }
        }
    }

    pub(crate) fn all<T: ICalProperty>(&mut self) -> Vec<T> {
        let ctx = self.date_context();
        match self.safe_get_all::<T>(&ctx) {
            Ok(props) => props,
            Err(err) => {
                let text = T::NAME.to_owned();
                self.report(self.start_line, &err, &text);
                vec![]
            }
        }
    }

    /// Two properties that must not appear together.
    pub(crate) fn conflict<A, B>(&mut self, a: &Option<A>, b: &Option<B>, reason: &'static str) {
        if a.is_some() && b.is_some() && self.mode().is_strict() {
            self.invalidate(ParserError::PropertyConflict(reason));
        }
    }

    /// Build the nested components named `names`. Invalid ones are dropped, their errors
    /// are kept.
    pub(crate) fn children<C: Component>(&mut self, names: &[&str]) -> Vec<C> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|child| names.contains(&child.name.as_str()));
        self.children = rest;

        let mut out = vec![];
        for child in matching {
            let built = C::build(self.ctx, child.start_line, child.lines);
            self.errors.extend(built.errors);
            out.extend(built.component);
        }
        out
    }

    /// Nested components nobody asked for.
    fn drop_unknown_children(&mut self) {
        for child in std::mem::take(&mut self.children) {
            tracing::debug!(
                line_number = child.start_line,
                parent = self.name,
                "dropping nested {}",
                child.name
            );
            if self.mode().is_strict() {
                let err = ParserError::InvalidComponent(child.name.clone());
                let text = format!("BEGIN:{}", child.name);
                self.report(child.start_line, &err, &text);
            }
        }
    }

    #[inline]
    pub(crate) fn is_valid(&self) -> bool {
        self.valid
    }

    /// Give up on the component.
    pub(crate) fn discard<C>(mut self) -> Built<C> {
        self.drop_unknown_children();
        Built {
            component: None,
            errors: self.errors,
        }
    }

    /// Finish the component from its property lines, unless something made it invalid.
    pub(crate) fn finish<C>(mut self, make: impl FnOnce(Vec<ContentLine>) -> C) -> Built<C> {
        self.drop_unknown_children();
        let component = self.valid.then(|| make(self.properties));
        Built {
            component,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::split_lines;
    use crate::parser::Line;

    fn lines(input: &[&str]) -> Vec<Line> {
        input
            .iter()
            .enumerate()
            .map(|(index, line)| Line::new(*line, index + 1))
            .collect()
    }

    #[test]
    fn split_nested_components() {
        let (properties, children) = split_lines(lines(&[
            "BEGIN:VEVENT",
            "UID:1",
            "BEGIN:VALARM",
            "ACTION:DISPLAY",
            "END:VALARM",
            "SUMMARY:Test",
            "BEGIN:VLOCATION",
            "BEGIN:X-INNER",
            "END:X-INNER",
            "END:VLOCATION",
            "END:VEVENT",
        ]));
        let properties: Vec<_> = properties.iter().map(Line::as_str).collect();
        assert_eq!(properties, ["UID:1", "SUMMARY:Test"]);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "VALARM");
        assert_eq!(children[0].start_line, 3);
        assert_eq!(children[0].lines.len(), 3);
        assert_eq!(children[1].name, "VLOCATION");
        assert_eq!(children[1].lines.len(), 4);
    }
}
