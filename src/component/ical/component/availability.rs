//! RFC 7953 availability: VAVAILABILITY with its AVAILABLE slots.

use crate::{
    component::{BuildContext, Built, Builder, Component, Properties, RecurrenceSet, Recurring},
    parser::{ContentLine, Line},
    property::{
        IcalDTENDProperty, IcalDTSTAMPProperty, IcalDTSTARTProperty, IcalDURATIONProperty,
        IcalUIDProperty,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalAvailability {
    start_line: usize,
    uid: String,
    pub dtstamp: Option<IcalDTSTAMPProperty>,
    pub dtstart: Option<IcalDTSTARTProperty>,
    pub dtend: Option<IcalDTENDProperty>,
    pub properties: Vec<ContentLine>,
    pub available: Vec<IcalAvailable>,
}

impl IcalAvailability {
    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    /// BUSYTYPE, `BUSY-UNAVAILABLE` when absent.
    pub fn get_busy_type(&self) -> &str {
        self.get_property("BUSYTYPE")
            .map_or("BUSY-UNAVAILABLE", |prop| prop.value.as_str())
    }
}

impl Properties for IcalAvailability {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalAvailability {
    const NAMES: &[&str] = &["VAVAILABILITY"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        let uid = builder.required::<IcalUIDProperty>();
        let dtstamp = builder.optional::<IcalDTSTAMPProperty>();
        let dtstart = builder.optional::<IcalDTSTARTProperty>();
        let dtend = builder.optional::<IcalDTENDProperty>();
        let duration = builder.optional::<IcalDURATIONProperty>();
        builder.conflict(&dtend, &duration, "both DTEND and DURATION are defined");

        let available = builder.children::<IcalAvailable>(IcalAvailable::NAMES);

        let Some(IcalUIDProperty(uid, _)) = uid else {
            return builder.discard();
        };
        builder.finish(|properties| IcalAvailability {
            start_line,
            uid,
            dtstamp,
            dtstart,
            dtend,
            properties,
            available,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalAvailable {
    start_line: usize,
    uid: Option<String>,
    pub dtstart: IcalDTSTARTProperty,
    pub dtend: Option<IcalDTENDProperty>,
    pub duration: Option<IcalDURATIONProperty>,
    pub properties: Vec<ContentLine>,
    recurrence: RecurrenceSet,
}

impl IcalAvailable {
    pub fn get_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }
}

impl Properties for IcalAvailable {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Recurring for IcalAvailable {
    fn recurrence(&self) -> Option<&RecurrenceSet> {
        Some(&self.recurrence)
    }
}

impl Component for IcalAvailable {
    const NAMES: &[&str] = &["AVAILABLE"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        let uid = builder
            .strict_required::<IcalUIDProperty>()
            .map(|IcalUIDProperty(uid, _)| uid);
        let dtstart = builder.required::<IcalDTSTARTProperty>();
        let dtend = builder.optional::<IcalDTENDProperty>();
        let duration = builder.optional::<IcalDURATIONProperty>();
        builder.conflict(&dtend, &duration, "both DTEND and DURATION are defined");

        let Some(dtstart) = dtstart else {
            return builder.discard();
        };
        let recurrence = RecurrenceSet::collect(&mut builder, &dtstart);
        builder.finish(|properties| IcalAvailable {
            start_line,
            uid,
            dtstart,
            dtend,
            duration,
            properties,
            recurrence,
        })
    }
}
