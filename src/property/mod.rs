//! Typed accessors for the properties the component builders rely on.
//!
//! Every type wraps the parsed value together with the parameters of the line it came from
//! and converts back into a [`ContentLine`].

use crate::{
    component::Properties,
    parser::{ContentLine, ICalProperty, ParserError, property},
    rrule::RecurrenceRule,
    types::{CalendarDate, DateContext, DateOrPeriod, Period, UtcOffset},
};

mod recurid;
pub use recurid::*;
mod trigger;
pub use trigger::*;

pub trait GetProperty: Properties {
    fn safe_get_all<T: ICalProperty>(&self, ctx: &DateContext) -> Result<Vec<T>, ParserError> {
        self.get_named_properties(T::NAME)
            .map(|prop| ICalProperty::parse_prop(prop, ctx))
            .collect::<Result<Vec<_>, _>>()
    }

    fn safe_get_optional<T: ICalProperty>(
        &self,
        ctx: &DateContext,
    ) -> Result<Option<T>, ParserError> {
        let mut props = self.get_named_properties(T::NAME);
        let Some(prop) = props.next() else {
            return Ok(None);
        };
        if props.next().is_some() {
            return Err(ParserError::RepeatedProperty(T::NAME.to_owned()));
        }
        ICalProperty::parse_prop(prop, ctx).map(Some)
    }

    fn safe_get_required<T: ICalProperty>(&self, ctx: &DateContext) -> Result<T, ParserError> {
        self.safe_get_optional(ctx)?
            .ok_or(ParserError::MissingProperty(T::NAME))
    }

    fn has_prop<T: ICalProperty>(&self) -> bool {
        self.get_property(T::NAME).is_some()
    }
}

impl<C: Properties> GetProperty for C {}

property!("UID", "TEXT", IcalUIDProperty, String);

impl From<String> for IcalUIDProperty {
    fn from(value: String) -> Self {
        Self(value, Default::default())
    }
}

property!("SUMMARY", "TEXT", IcalSUMMARYProperty, String);
property!("PRODID", "TEXT", IcalPRODIDProperty, String);
property!("METHOD", "TEXT", IcalMETHODProperty, String);
property!("VERSION", "TEXT", IcalVERSIONProperty, String);
property!("CALSCALE", "TEXT", IcalCALSCALEProperty, String);
property!("TZID", "TEXT", IcalTZIDProperty, String);
property!("ACTION", "TEXT", IcalACTIONProperty, String);
property!("PARTICIPANT-TYPE", "TEXT", IcalPARTICIPANTTYPEProperty, String);

property!("DTSTART", "DATE-TIME", IcalDTSTARTProperty, CalendarDate);
property!("DTEND", "DATE-TIME", IcalDTENDProperty, CalendarDate);
property!("DUE", "DATE-TIME", IcalDUEProperty, CalendarDate);
property!("DTSTAMP", "DATE-TIME", IcalDTSTAMPProperty, CalendarDate);
property!("DURATION", "DURATION", IcalDURATIONProperty, chrono::Duration);
property!("REPEAT", "INTEGER", IcalREPEATProperty, i64);

property!("RRULE", "RECUR", IcalRRULEProperty, RecurrenceRule);
property!("EXRULE", "RECUR", IcalEXRULEProperty, RecurrenceRule);
property!("EXDATE", "DATE-TIME", IcalEXDATEProperty, Vec<CalendarDate>);
property!("RDATE", "DATE-TIME", IcalRDATEProperty, Vec<DateOrPeriod>);
property!("FREEBUSY", "PERIOD", IcalFREEBUSYProperty, Vec<Period>);

property!("TZOFFSETFROM", "UTC-OFFSET", IcalTZOFFSETFROMProperty, UtcOffset);
property!("TZOFFSETTO", "UTC-OFFSET", IcalTZOFFSETTOProperty, UtcOffset);
