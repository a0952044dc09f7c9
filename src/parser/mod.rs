mod error;
pub use error::{ParseError, ParserError};

mod line;
pub use line::{BytesLines, ComponentMarker, Line, LineError, LineReader, ReaderLines};

mod content_line;
pub use content_line::{ContentLine, ContentLineError, ContentLineParams, ContentLineParser};

mod property;
pub(crate) use property::property;
pub use property::{ICalProperty, ParseProp, Property, PropertyValue, ValueKind, is_known_parameter};

mod component;
pub use component::{CalendarProperties, ComponentParser, ParseReport, ParserState};

use crate::rrule::RecurrenceLimits;

/// How strictly RFC violations are treated. The discriminants are fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParseMode {
    /// Report every RFC violation.
    Strict = 1,
    /// Skip what can't be read and keep going.
    #[default]
    Loose = 2,
    /// Loose, plus deprecated RFC 2445 syntax such as EXRULE.
    Rfc2445Compat = 3,
}

impl ParseMode {
    #[inline]
    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}

impl TryFrom<u8> for ParseMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Strict),
            2 => Ok(Self::Loose),
            3 => Ok(Self::Rfc2445Compat),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub mode: ParseMode,
    /// UTC and zoned date-times are converted into this zone while parsing.
    pub local_timezone: chrono_tz::Tz,
    pub recurrence: RecurrenceLimits,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            local_timezone: chrono_tz::UTC,
            recurrence: RecurrenceLimits::default(),
        }
    }
}

impl ParserOptions {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_local_timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.local_timezone = tz;
        self
    }
}
