use std::fmt;

use crate::{
    parser::{ContentLineError, LineError},
    rrule::RRuleError,
    types::{CalDateTimeError, InvalidDuration},
};

/// A typed failure while reading one property, component or document.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("invalid component: {0}")]
    InvalidComponent(String),
    #[error("component {0} is not terminated")]
    UnterminatedComponent(String),
    #[error("expected END:{expected}, found END:{found}")]
    MismatchedEnd { expected: String, found: String },
    #[error("content outside of VCALENDAR")]
    DataOutsideCalendar,
    #[error("content after END:VCALENDAR")]
    TrailingData,
    #[error("content line error: {0}")]
    ContentLineError(#[from] ContentLineError),
    #[error(transparent)]
    LineError(#[from] LineError),
    #[error("missing property: {0}")]
    MissingProperty(&'static str),
    #[error("property conflict: {0}")]
    PropertyConflict(&'static str),
    #[error("property {0} may only appear once")]
    RepeatedProperty(String),
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("unknown parameter {parameter} on {property}")]
    UnknownParameter { property: String, parameter: String },
    #[error("parameter {parameter} repeated on {property}")]
    DuplicateParameter { property: String, parameter: String },
    #[error("deprecated property: {0}")]
    DeprecatedProperty(String),
    #[error(transparent)]
    InvalidDuration(#[from] InvalidDuration),
    #[error("invalid property value: {0}")]
    InvalidPropertyValue(String),
    #[error("invalid property value type for: {0}")]
    InvalidPropertyType(String),
    #[error(transparent)]
    RRule(#[from] RRuleError),
    #[error(transparent)]
    DateTime(#[from] CalDateTimeError),
    #[error("RECURRENCE-ID must have the same value type and timezone kind as DTSTART")]
    DtstartNotMatchingRecurId,
    #[error("Invalid CALSCALE: Only GREGORIAN supported")]
    InvalidCalscale,
    #[error("Invalid VERSION: MUST be 2.0")]
    InvalidVersion,
}

/// A recorded, recoverable problem. Sent to every error listener and kept in the
/// ordered list returned by `ComponentParser::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    line_number: usize,
    message: String,
    offending_text: String,
}

impl ParseError {
    pub fn new(
        line_number: usize,
        message: impl Into<String>,
        offending_text: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            message: message.into(),
            offending_text: offending_text.into(),
        }
    }

    pub fn from_failure(
        line_number: usize,
        failure: &ParserError,
        offending_text: impl Into<String>,
    ) -> Self {
        Self::new(line_number, failure.to_string(), offending_text)
    }

    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn offending_text(&self) -> &str {
        &self.offending_text
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.message)?;
        if !self.offending_text.is_empty() {
            write!(f, " ({:?})", self.offending_text)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
