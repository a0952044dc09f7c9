//! Receivers for what the parser extracts.
//!
//! A [`CalendarSink`] gets one call per valid top-level component, an [`ErrorListener`]
//! one call per recorded [`ParseError`]. Both are invoked synchronously, in registration
//! order, from inside [`ComponentParser::parse`](crate::ComponentParser::parse).

use crate::component::{
    IcalAvailability, IcalEvent, IcalFreeBusy, IcalJournal, IcalLocation, IcalParticipant,
    IcalResource, IcalTimeZone, IcalTodo,
};
use crate::parser::ParseError;

/// Every method defaults to doing nothing, so a sink only implements what it cares about.
#[allow(unused_variables)]
pub trait CalendarSink {
    fn store_timezone(&mut self, timezone: &IcalTimeZone) {}
    fn store_event(&mut self, event: &IcalEvent) {}
    fn store_todo(&mut self, todo: &IcalTodo) {}
    fn store_journal(&mut self, journal: &IcalJournal) {}
    fn store_freebusy(&mut self, freebusy: &IcalFreeBusy) {}
    fn store_vlocation(&mut self, location: &IcalLocation) {}
    fn store_vresource(&mut self, resource: &IcalResource) {}
    fn store_vavailability(&mut self, availability: &IcalAvailability) {}
    fn store_participant(&mut self, participant: &IcalParticipant) {}
    /// The calendar-level METHOD property.
    fn set_method(&mut self, method: &str) {}
}

impl<S: CalendarSink + ?Sized> CalendarSink for &mut S {
    fn store_timezone(&mut self, timezone: &IcalTimeZone) {
        (**self).store_timezone(timezone);
    }
    fn store_event(&mut self, event: &IcalEvent) {
        (**self).store_event(event);
    }
    fn store_todo(&mut self, todo: &IcalTodo) {
        (**self).store_todo(todo);
    }
    fn store_journal(&mut self, journal: &IcalJournal) {
        (**self).store_journal(journal);
    }
    fn store_freebusy(&mut self, freebusy: &IcalFreeBusy) {
        (**self).store_freebusy(freebusy);
    }
    fn store_vlocation(&mut self, location: &IcalLocation) {
        (**self).store_vlocation(location);
    }
    fn store_vresource(&mut self, resource: &IcalResource) {
        (**self).store_vresource(resource);
    }
    fn store_vavailability(&mut self, availability: &IcalAvailability) {
        (**self).store_vavailability(availability);
    }
    fn store_participant(&mut self, participant: &IcalParticipant) {
        (**self).store_participant(participant);
    }
    fn set_method(&mut self, method: &str) {
        (**self).set_method(method);
    }
}

/// Collects every component it is handed.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub method: Option<String>,
    pub timezones: Vec<IcalTimeZone>,
    pub events: Vec<IcalEvent>,
    pub todos: Vec<IcalTodo>,
    pub journals: Vec<IcalJournal>,
    pub freebusys: Vec<IcalFreeBusy>,
    pub locations: Vec<IcalLocation>,
    pub resources: Vec<IcalResource>,
    pub availabilities: Vec<IcalAvailability>,
    pub participants: Vec<IcalParticipant>,
}

impl CollectingSink {
    pub fn component_count(&self) -> usize {
        self.timezones.len()
            + self.events.len()
            + self.todos.len()
            + self.journals.len()
            + self.freebusys.len()
            + self.locations.len()
            + self.resources.len()
            + self.availabilities.len()
            + self.participants.len()
    }
}

impl CalendarSink for CollectingSink {
    fn store_timezone(&mut self, timezone: &IcalTimeZone) {
        self.timezones.push(timezone.clone());
    }
    fn store_event(&mut self, event: &IcalEvent) {
        self.events.push(event.clone());
    }
    fn store_todo(&mut self, todo: &IcalTodo) {
        self.todos.push(todo.clone());
    }
    fn store_journal(&mut self, journal: &IcalJournal) {
        self.journals.push(journal.clone());
    }
    fn store_freebusy(&mut self, freebusy: &IcalFreeBusy) {
        self.freebusys.push(freebusy.clone());
    }
    fn store_vlocation(&mut self, location: &IcalLocation) {
        self.locations.push(location.clone());
    }
    fn store_vresource(&mut self, resource: &IcalResource) {
        self.resources.push(resource.clone());
    }
    fn store_vavailability(&mut self, availability: &IcalAvailability) {
        self.availabilities.push(availability.clone());
    }
    fn store_participant(&mut self, participant: &IcalParticipant) {
        self.participants.push(participant.clone());
    }
    fn set_method(&mut self, method: &str) {
        self.method = Some(method.to_owned());
    }
}

pub trait ErrorListener {
    fn on_error(&mut self, error: &ParseError);
}

impl<F: FnMut(&ParseError)> ErrorListener for F {
    fn on_error(&mut self, error: &ParseError) {
        self(error)
    }
}
