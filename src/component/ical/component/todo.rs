use std::collections::HashSet;

use crate::{
    component::{
        BuildContext, Built, Builder, Component, IcalAlarm, IcalLocation, IcalParticipant,
        IcalResource, Properties, RecurrenceSet, Recurring,
    },
    parser::{ContentLine, Line, ParserError},
    property::{
        IcalDTSTAMPProperty, IcalDTSTARTProperty, IcalDUEProperty, IcalDURATIONProperty,
        IcalRECURIDProperty, IcalUIDProperty,
    },
    types::CalendarDate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalTodo {
    start_line: usize,
    uid: Option<String>,
    pub dtstamp: Option<IcalDTSTAMPProperty>,
    pub dtstart: Option<IcalDTSTARTProperty>,
    pub due: Option<IcalDUEProperty>,
    pub duration: Option<IcalDURATIONProperty>,
    pub recurid: Option<IcalRECURIDProperty>,
    pub properties: Vec<ContentLine>,
    pub alarms: Vec<IcalAlarm>,
    pub participants: Vec<IcalParticipant>,
    pub locations: Vec<IcalLocation>,
    pub resources: Vec<IcalResource>,
    recurrence: Option<RecurrenceSet>,
}

impl IcalTodo {
    pub fn get_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn get_alarms(&self) -> &[IcalAlarm] {
        &self.alarms
    }

    /// DUE, or DTSTART plus DURATION. Unknown for recurring to-dos.
    pub fn get_last_occurence(&self) -> Option<CalendarDate> {
        if self.is_recurring() {
            return None;
        }
        if let Some(due) = &self.due {
            return Some(due.0.clone());
        }
        if let Some(dtstart) = &self.dtstart
            && let Some(duration) = &self.duration
        {
            return dtstart.0.add_duration(duration.0);
        }
        None
    }

    pub fn get_tzids(&self) -> HashSet<&str> {
        self.properties
            .iter()
            .filter_map(|prop| prop.params.get_tzid())
            .chain(self.alarms.iter().flat_map(|alarm| {
                alarm
                    .get_properties()
                    .iter()
                    .filter_map(|prop| prop.params.get_tzid())
            }))
            .collect()
    }
}

impl Properties for IcalTodo {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Recurring for IcalTodo {
    fn recurrence(&self) -> Option<&RecurrenceSet> {
        self.recurrence.as_ref()
    }
}

impl Component for IcalTodo {
    const NAMES: &[&str] = &["VTODO"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        // REQUIRED, but ONLY ONCE (strict mode)
        let uid = builder
            .strict_required::<IcalUIDProperty>()
            .map(|IcalUIDProperty(uid, _)| uid);
        let dtstamp = builder.optional::<IcalDTSTAMPProperty>();

        // OPTIONAL, but ONLY ONCE
        let dtstart = builder.optional::<IcalDTSTARTProperty>();
        let recurid = builder.optional::<IcalRECURIDProperty>();
        if let (Some(recurid), Some(dtstart)) = (&recurid, &dtstart)
            && let Err(err) = recurid.validate_dtstart(&dtstart.0)
        {
            builder.invalidate(err);
        }

        // OPTIONAL, but MUTUALLY EXCLUSIVE
        let due = builder.optional::<IcalDUEProperty>();
        let duration = builder.optional::<IcalDURATIONProperty>();
        builder.conflict(&due, &duration, "both DUE and DURATION are defined");
        if duration.is_some() && dtstart.is_none() && builder.mode().is_strict() {
            builder.invalidate(ParserError::PropertyConflict("DURATION requires DTSTART"));
        }

        let alarms = builder.children::<IcalAlarm>(IcalAlarm::NAMES);
        let participants = builder.children::<IcalParticipant>(IcalParticipant::NAMES);
        let locations = builder.children::<IcalLocation>(IcalLocation::NAMES);
        let resources = builder.children::<IcalResource>(IcalResource::NAMES);

        let recurrence = dtstart
            .as_ref()
            .map(|dtstart| RecurrenceSet::collect(&mut builder, dtstart));
        builder.finish(|properties| IcalTodo {
            start_line,
            uid,
            dtstamp,
            dtstart,
            due,
            duration,
            recurid,
            properties,
            alarms,
            participants,
            locations,
            resources,
            recurrence,
        })
    }
}
