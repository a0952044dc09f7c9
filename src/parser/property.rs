//! Turn a tokenized content line into a typed property value.
//!
//! The value kind of a property is looked up once per line in a static table keyed by the
//! upper-cased property name. Anything the table doesn't know is an extension: `X-` names
//! are always kept as text, other unknown names are an error in strict mode and kept as
//! text otherwise.

use chrono::Duration;

use crate::{
    parser::{ContentLine, ParseMode, ParserError},
    rrule::{RRuleError, RecurrenceRule},
    types::{CalendarDate, DateContext, DateOrPeriod, Period, UtcOffset, Value, parse_duration},
};

/// How the value of a property is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    /// DATE or DATE-TIME, DATE-TIME unless `VALUE=DATE`.
    DateTime,
    DateTimeList,
    /// RDATE: a date list, or periods with `VALUE=PERIOD`.
    DateOrPeriodList,
    PeriodList,
    Recur,
    Integer,
    Duration,
    /// A duration, or a date-time with `VALUE=DATE-TIME`.
    Trigger,
    UtcOffset,
    Uri,
    CalAddress,
    Geo,
}

static PROPERTY_KINDS: phf::Map<&'static str, ValueKind> = phf::phf_map! {
    // RFC 5545 §3.7 calendar properties
    "CALSCALE" => ValueKind::Text,
    "METHOD" => ValueKind::Text,
    "PRODID" => ValueKind::Text,
    "VERSION" => ValueKind::Text,
    // §3.8.1 descriptive
    "ATTACH" => ValueKind::Uri,
    "CATEGORIES" => ValueKind::Text,
    "CLASS" => ValueKind::Text,
    "COMMENT" => ValueKind::Text,
    "DESCRIPTION" => ValueKind::Text,
    "GEO" => ValueKind::Geo,
    "LOCATION" => ValueKind::Text,
    "PERCENT-COMPLETE" => ValueKind::Integer,
    "PRIORITY" => ValueKind::Integer,
    "RESOURCES" => ValueKind::Text,
    "STATUS" => ValueKind::Text,
    "SUMMARY" => ValueKind::Text,
    // §3.8.2 date and time
    "COMPLETED" => ValueKind::DateTime,
    "DTEND" => ValueKind::DateTime,
    "DUE" => ValueKind::DateTime,
    "DTSTART" => ValueKind::DateTime,
    "DURATION" => ValueKind::Duration,
    "FREEBUSY" => ValueKind::PeriodList,
    "TRANSP" => ValueKind::Text,
    // §3.8.3 time zone
    "TZID" => ValueKind::Text,
    "TZNAME" => ValueKind::Text,
    "TZOFFSETFROM" => ValueKind::UtcOffset,
    "TZOFFSETTO" => ValueKind::UtcOffset,
    "TZURL" => ValueKind::Uri,
    // §3.8.4 relationship
    "ATTENDEE" => ValueKind::CalAddress,
    "CONTACT" => ValueKind::Text,
    "ORGANIZER" => ValueKind::CalAddress,
    "RECURRENCE-ID" => ValueKind::DateTime,
    "RELATED-TO" => ValueKind::Text,
    "URL" => ValueKind::Uri,
    "UID" => ValueKind::Text,
    // §3.8.5 recurrence
    "EXDATE" => ValueKind::DateTimeList,
    "RDATE" => ValueKind::DateOrPeriodList,
    "RRULE" => ValueKind::Recur,
    "EXRULE" => ValueKind::Recur,
    // §3.8.6 alarm
    "ACTION" => ValueKind::Text,
    "REPEAT" => ValueKind::Integer,
    "TRIGGER" => ValueKind::Trigger,
    // §3.8.7 change management
    "CREATED" => ValueKind::DateTime,
    "DTSTAMP" => ValueKind::DateTime,
    "LAST-MODIFIED" => ValueKind::DateTime,
    "SEQUENCE" => ValueKind::Integer,
    "REQUEST-STATUS" => ValueKind::Text,
    // RFC 7986
    "NAME" => ValueKind::Text,
    "REFRESH-INTERVAL" => ValueKind::Duration,
    "SOURCE" => ValueKind::Uri,
    "COLOR" => ValueKind::Text,
    "IMAGE" => ValueKind::Uri,
    "CONFERENCE" => ValueKind::Uri,
    // RFC 7953
    "BUSYTYPE" => ValueKind::Text,
    // RFC 9073
    "PARTICIPANT-TYPE" => ValueKind::Text,
    "RESOURCE-TYPE" => ValueKind::Text,
    "CALENDAR-ADDRESS" => ValueKind::CalAddress,
    "LOCATION-TYPE" => ValueKind::Text,
    "STRUCTURED-DATA" => ValueKind::Text,
    "STYLED-DESCRIPTION" => ValueKind::Text,
};

static KNOWN_PARAMETERS: phf::Set<&'static str> = phf::phf_set! {
    // RFC 5545 §3.2
    "ALTREP", "CN", "CUTYPE", "DELEGATED-FROM", "DELEGATED-TO", "DIR", "ENCODING",
    "FMTTYPE", "FBTYPE", "LANGUAGE", "MEMBER", "PARTSTAT", "RANGE", "RELATED", "RELTYPE",
    "ROLE", "RSVP", "SENT-BY", "TZID", "VALUE",
    // RFC 7986
    "DISPLAY", "EMAIL", "FEATURE", "LABEL",
    // RFC 9073
    "ORDER", "SCHEMA", "DERIVED",
};

/// Parameter names defined by RFC 5545, 7986 and 9073.
#[inline]
pub fn is_known_parameter(name: &str) -> bool {
    KNOWN_PARAMETERS.contains(name)
}

impl ValueKind {
    pub fn of(name: &str) -> Option<Self> {
        PROPERTY_KINDS.get(name).copied()
    }
}

pub trait ParseProp: Sized {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError>;
}

impl ParseProp for String {
    fn parse_prop(prop: &ContentLine, _ctx: &DateContext) -> Result<Self, ParserError> {
        Ok(prop.value.to_owned())
    }
}

impl ParseProp for CalendarDate {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        Ok(CalendarDate::from_content_line(prop, ctx)?)
    }
}

impl ParseProp for Period {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        Period::parse(&prop.value, prop.params.get_tzid(), ctx)
    }
}

impl ParseProp for DateOrPeriod {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        if value_param_is(prop, "PERIOD") {
            Ok(Self::Period(ParseProp::parse_prop(prop, ctx)?))
        } else {
            Ok(Self::Date(ParseProp::parse_prop(prop, ctx)?))
        }
    }
}

impl ParseProp for Duration {
    fn parse_prop(prop: &ContentLine, _ctx: &DateContext) -> Result<Self, ParserError> {
        Ok(parse_duration(&prop.value)?)
    }
}

impl ParseProp for RecurrenceRule {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        Ok(RecurrenceRule::parse(&prop.value, ctx)?)
    }
}

impl ParseProp for UtcOffset {
    fn parse_prop(prop: &ContentLine, _ctx: &DateContext) -> Result<Self, ParserError> {
        Ok(prop.value.parse()?)
    }
}

impl ParseProp for i64 {
    fn parse_prop(prop: &ContentLine, _ctx: &DateContext) -> Result<Self, ParserError> {
        prop.value
            .parse()
            .map_err(|_| ParserError::InvalidPropertyValue(prop.value.to_owned()))
    }
}

impl<T: ParseProp> ParseProp for Vec<T> {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        let mut out = vec![];
        for value in prop.value.trim_end_matches(',').split(',') {
            let content_line = ContentLine {
                name: prop.name.to_owned(),
                params: prop.params.to_owned(),
                value: value.to_owned(),
            };
            out.push(T::parse_prop(&content_line, ctx)?);
        }
        Ok(out)
    }
}

pub trait ICalProperty: Sized {
    const NAME: &'static str;
    const DEFAULT_TYPE: &'static str;

    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError>;
}

macro_rules! property {
    ($name:literal, $default_type:literal, $prop:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
        pub struct $prop(pub $inner, pub crate::parser::ContentLineParams);

        impl crate::parser::ICalProperty for $prop {
            const NAME: &'static str = $name;
            const DEFAULT_TYPE: &'static str = $default_type;

            #[inline]
            fn parse_prop(
                prop: &crate::parser::ContentLine,
                ctx: &crate::types::DateContext,
            ) -> Result<Self, crate::parser::ParserError> {
                Ok(Self(
                    crate::parser::ParseProp::parse_prop(prop, ctx)?,
                    prop.params.clone(),
                ))
            }
        }

        impl From<$prop> for crate::parser::ContentLine {
            fn from(prop: $prop) -> Self {
                let $prop(inner, mut params) = prop;
                if crate::types::Value::drops_tzid(&inner) {
                    params.remove("TZID");
                }
                let value_type = crate::types::Value::value_type(&inner).unwrap_or($default_type);
                if value_type != $default_type {
                    params.replace_param("VALUE".to_owned(), value_type.to_owned());
                }
                crate::parser::ContentLine {
                    name: $name.to_owned(),
                    params,
                    value: crate::types::Value::value(&inner),
                }
            }
        }
    };
}

pub(crate) use property;

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Date(CalendarDate),
    DateList(Vec<CalendarDate>),
    Periods(Vec<Period>),
    Recur(RecurrenceRule),
    Integer(i64),
    Duration(Duration),
    UtcOffset(UtcOffset),
    Uri(String),
}

impl Value for PropertyValue {
    fn value_type(&self) -> Option<&'static str> {
        match self {
            Self::Text(_) => None,
            Self::Uri(_) => Some("URI"),
            Self::Date(date) => date.value_type(),
            Self::DateList(dates) => dates.value_type(),
            Self::Periods(periods) => periods.value_type(),
            Self::Recur(rule) => rule.value_type(),
            Self::Integer(number) => number.value_type(),
            Self::Duration(duration) => duration.value_type(),
            Self::UtcOffset(offset) => offset.value_type(),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Text(text) | Self::Uri(text) => text.clone(),
            Self::Date(date) => date.value(),
            Self::DateList(dates) => dates.value(),
            Self::Periods(periods) => periods.value(),
            Self::Recur(rule) => rule.value(),
            Self::Integer(number) => number.value(),
            Self::Duration(duration) => duration.value(),
            Self::UtcOffset(offset) => offset.value(),
        }
    }

    fn drops_tzid(&self) -> bool {
        match self {
            Self::Date(date) => date.drops_tzid(),
            Self::DateList(dates) => dates.drops_tzid(),
            Self::Periods(periods) => periods.drops_tzid(),
            _ => false,
        }
    }
}

/// A content line together with its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub line: ContentLine,
    pub value: PropertyValue,
}

impl Property {
    #[inline]
    pub fn name(&self) -> &str {
        &self.line.name
    }

    /// Read the value of `line` according to its property kind.
    ///
    /// In strict mode unknown parameters, repeated parameters, unknown properties and the
    /// deprecated EXRULE are rejected. Loose mode keeps unknown properties and EXRULE as
    /// plain text; RFC 2445 compatibility mode reads EXRULE as a rule.
    pub fn parse(line: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        let strict = ctx.mode.is_strict();
        if strict {
            check_params(line)?;
        }

        let kind = match ValueKind::of(&line.name) {
            _ if line.name == "EXRULE" => match ctx.mode {
                ParseMode::Strict => {
                    return Err(ParserError::DeprecatedProperty(line.name.clone()));
                }
                ParseMode::Loose => ValueKind::Text,
                ParseMode::Rfc2445Compat => ValueKind::Recur,
            },
            Some(kind) => kind,
            None if line.is_extension() => ValueKind::Text,
            None if strict => return Err(ParserError::UnknownProperty(line.name.clone())),
            None => {
                tracing::debug!(name = %line.name, "keeping unknown property as text");
                ValueKind::Text
            }
        };

        Ok(Self {
            value: parse_value(kind, line, ctx)?,
            line: line.clone(),
        })
    }
}

fn check_params(line: &ContentLine) -> Result<(), ParserError> {
    if let Some(parameter) = line.params.duplicates.first() {
        return Err(ParserError::DuplicateParameter {
            property: line.name.clone(),
            parameter: parameter.clone(),
        });
    }
    if let Some((parameter, _)) = line
        .params
        .iter()
        .find(|(name, _)| !name.starts_with("X-") && !is_known_parameter(name))
    {
        return Err(ParserError::UnknownParameter {
            property: line.name.clone(),
            parameter: parameter.to_owned(),
        });
    }
    Ok(())
}

fn value_param_is(line: &ContentLine, expected: &str) -> bool {
    line.params
        .get_value_type()
        .is_some_and(|value| value.eq_ignore_ascii_case(expected))
}

fn parse_value(
    kind: ValueKind,
    line: &ContentLine,
    ctx: &DateContext,
) -> Result<PropertyValue, ParserError> {
    Ok(match kind {
        ValueKind::Text | ValueKind::CalAddress => PropertyValue::Text(line.value.clone()),
        ValueKind::Uri => PropertyValue::Uri(line.value.clone()),
        ValueKind::Geo => {
            let valid = line.value.split_once(';').is_some_and(|(lat, lon)| {
                lat.trim().parse::<f64>().is_ok_and(|lat| (-90.0..=90.0).contains(&lat))
                    && lon
                        .trim()
                        .parse::<f64>()
                        .is_ok_and(|lon| (-180.0..=180.0).contains(&lon))
            });
            if !valid {
                return Err(ParserError::InvalidPropertyValue(line.value.clone()));
            }
            PropertyValue::Text(line.value.clone())
        }
        ValueKind::DateTime => PropertyValue::Date(ParseProp::parse_prop(line, ctx)?),
        ValueKind::DateTimeList => PropertyValue::DateList(ParseProp::parse_prop(line, ctx)?),
        ValueKind::DateOrPeriodList if value_param_is(line, "PERIOD") => {
            PropertyValue::Periods(ParseProp::parse_prop(line, ctx)?)
        }
        ValueKind::DateOrPeriodList => PropertyValue::DateList(ParseProp::parse_prop(line, ctx)?),
        ValueKind::PeriodList => PropertyValue::Periods(ParseProp::parse_prop(line, ctx)?),
        ValueKind::Recur => {
            let rule: RecurrenceRule = ParseProp::parse_prop(line, ctx)?;
            rule.validate().map_err(RRuleError::from)?;
            PropertyValue::Recur(rule)
        }
        ValueKind::Integer => PropertyValue::Integer(ParseProp::parse_prop(line, ctx)?),
        ValueKind::Duration => PropertyValue::Duration(ParseProp::parse_prop(line, ctx)?),
        ValueKind::Trigger if value_param_is(line, "DATE-TIME") => {
            PropertyValue::Date(ParseProp::parse_prop(line, ctx)?)
        }
        ValueKind::Trigger => PropertyValue::Duration(ParseProp::parse_prop(line, ctx)?),
        ValueKind::UtcOffset => PropertyValue::UtcOffset(ParseProp::parse_prop(line, ctx)?),
    })
}
