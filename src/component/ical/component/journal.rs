use crate::{
    component::{
        BuildContext, Built, Builder, Component, IcalAlarm, IcalLocation, IcalParticipant,
        Properties, RecurrenceSet, Recurring,
    },
    parser::{ContentLine, Line},
    property::{IcalDTSTAMPProperty, IcalDTSTARTProperty, IcalRECURIDProperty, IcalUIDProperty},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalJournal {
    start_line: usize,
    uid: Option<String>,
    pub dtstamp: Option<IcalDTSTAMPProperty>,
    pub dtstart: Option<IcalDTSTARTProperty>,
    pub recurid: Option<IcalRECURIDProperty>,
    pub properties: Vec<ContentLine>,
    pub alarms: Vec<IcalAlarm>,
    pub participants: Vec<IcalParticipant>,
    pub locations: Vec<IcalLocation>,
    recurrence: Option<RecurrenceSet>,
}

impl IcalJournal {
    pub fn get_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }
}

impl Properties for IcalJournal {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Recurring for IcalJournal {
    fn recurrence(&self) -> Option<&RecurrenceSet> {
        self.recurrence.as_ref()
    }
}

impl Component for IcalJournal {
    const NAMES: &[&str] = &["VJOURNAL"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        let uid = builder
            .strict_required::<IcalUIDProperty>()
            .map(|IcalUIDProperty(uid, _)| uid);
        let dtstamp = builder.optional::<IcalDTSTAMPProperty>();
        let dtstart = builder.optional::<IcalDTSTARTProperty>();
        let recurid = builder.optional::<IcalRECURIDProperty>();
        if let (Some(recurid), Some(dtstart)) = (&recurid, &dtstart)
            && let Err(err) = recurid.validate_dtstart(&dtstart.0)
        {
            builder.invalidate(err);
        }

        let alarms = builder.children::<IcalAlarm>(IcalAlarm::NAMES);
        let participants = builder.children::<IcalParticipant>(IcalParticipant::NAMES);
        let locations = builder.children::<IcalLocation>(IcalLocation::NAMES);

        let recurrence = dtstart
            .as_ref()
            .map(|dtstart| RecurrenceSet::collect(&mut builder, dtstart));
        builder.finish(|properties| IcalJournal {
            start_line,
            uid,
            dtstamp,
            dtstart,
            recurid,
            properties,
            alarms,
            participants,
            locations,
            recurrence,
        })
    }
}
