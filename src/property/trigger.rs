use chrono::Duration;

use crate::{
    parser::{ContentLine, ParseProp, ParserError, property},
    types::{CalendarDate, DateContext, Value},
};

/// When an alarm fires: relative to the start or end of its parent, or at a fixed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Relative(Duration),
    Absolute(CalendarDate),
}

impl ParseProp for Trigger {
    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        let absolute = prop
            .params
            .get_value_type()
            .is_some_and(|value| value.eq_ignore_ascii_case("DATE-TIME"));
        Ok(if absolute {
            Self::Absolute(ParseProp::parse_prop(prop, ctx)?)
        } else {
            Self::Relative(ParseProp::parse_prop(prop, ctx)?)
        })
    }
}

impl Value for Trigger {
    fn value_type(&self) -> Option<&'static str> {
        match self {
            Self::Relative(_) => None,
            Self::Absolute(_) => Some("DATE-TIME"),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Relative(duration) => duration.value(),
            Self::Absolute(date) => date.value(),
        }
    }

    fn drops_tzid(&self) -> bool {
        matches!(self, Self::Absolute(date) if date.drops_tzid())
    }
}

property!("TRIGGER", "DURATION", IcalTRIGGERProperty, Trigger);

impl IcalTRIGGERProperty {
    /// Relative triggers count from the end of the parent with `RELATED=END`.
    pub fn is_related_to_end(&self) -> bool {
        self.1
            .get_param("RELATED")
            .is_some_and(|related| related.eq_ignore_ascii_case("END"))
    }
}
