use std::collections::HashSet;

use crate::{
    component::{
        BuildContext, Built, Builder, Component, IcalAlarm, IcalLocation, IcalParticipant,
        IcalResource, Properties, RecurrenceSet, Recurring,
    },
    parser::{ContentLine, ICalProperty, Line},
    property::{
        IcalDTENDProperty, IcalDTSTAMPProperty, IcalDTSTARTProperty, IcalDURATIONProperty,
        IcalRECURIDProperty, IcalSUMMARYProperty, IcalUIDProperty,
    },
    types::CalendarDate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalEvent {
    start_line: usize,
    uid: Option<String>,
    pub dtstamp: Option<IcalDTSTAMPProperty>,
    pub dtstart: IcalDTSTARTProperty,
    pub dtend: Option<IcalDTENDProperty>,
    pub duration: Option<IcalDURATIONProperty>,
    pub recurid: Option<IcalRECURIDProperty>,
    pub properties: Vec<ContentLine>,
    pub alarms: Vec<IcalAlarm>,
    pub participants: Vec<IcalParticipant>,
    pub locations: Vec<IcalLocation>,
    pub resources: Vec<IcalResource>,
    recurrence: RecurrenceSet,
}

impl IcalEvent {
    pub fn get_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn get_summary(&self) -> Option<&str> {
        self.get_property(IcalSUMMARYProperty::NAME)
            .map(|prop| prop.value.as_str())
    }

    pub fn get_dtstart(&self) -> &CalendarDate {
        &self.dtstart.0
    }

    pub fn get_alarms(&self) -> &[IcalAlarm] {
        &self.alarms
    }

    /// DTEND, or DTSTART plus DURATION. Date-only events without either last one day.
    pub fn get_end(&self) -> Option<CalendarDate> {
        if let Some(dtend) = &self.dtend {
            return Some(dtend.0.clone());
        }
        let start = &self.dtstart.0;
        let duration = match &self.duration {
            Some(duration) => duration.0,
            None if start.is_date_only() => chrono::Duration::days(1),
            None => return None,
        };
        start.add_duration(duration)
    }

    pub fn get_tzids(&self) -> HashSet<&str> {
        self.properties
            .iter()
            .filter_map(|prop| prop.params.get_tzid())
            .collect()
    }
}

impl Properties for IcalEvent {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Recurring for IcalEvent {
    fn recurrence(&self) -> Option<&RecurrenceSet> {
        Some(&self.recurrence)
    }
}

impl Component for IcalEvent {
    const NAMES: &[&str] = &["VEVENT"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        let uid = builder
            .strict_required::<IcalUIDProperty>()
            .map(|IcalUIDProperty(uid, _)| uid);
        let dtstamp = builder.optional::<IcalDTSTAMPProperty>();
        let dtstart = builder.required::<IcalDTSTARTProperty>();

        // OPTIONAL, but MUTUALLY EXCLUSIVE
        let dtend = builder.optional::<IcalDTENDProperty>();
        let duration = builder.optional::<IcalDURATIONProperty>();
        builder.conflict(&dtend, &duration, "both DTEND and DURATION are defined");

        let recurid = builder.optional::<IcalRECURIDProperty>();
        if let (Some(recurid), Some(dtstart)) = (&recurid, &dtstart)
            && let Err(err) = recurid.validate_dtstart(&dtstart.0)
        {
            builder.invalidate(err);
        }

        let alarms = builder.children::<IcalAlarm>(IcalAlarm::NAMES);
        let participants = builder.children::<IcalParticipant>(IcalParticipant::NAMES);
        let locations = builder.children::<IcalLocation>(IcalLocation::NAMES);
        let resources = builder.children::<IcalResource>(IcalResource::NAMES);

        let Some(dtstart) = dtstart else {
            return builder.discard();
        };
        let recurrence = RecurrenceSet::collect(&mut builder, &dtstart);
        builder.finish(|properties| IcalEvent {
            start_line,
            uid,
            dtstamp,
            dtstart,
            dtend,
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
