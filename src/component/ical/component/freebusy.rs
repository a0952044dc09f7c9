use crate::{
    component::{BuildContext, Built, Builder, Component, Properties},
    parser::{ContentLine, Line},
    property::{
        IcalDTENDProperty, IcalDTSTAMPProperty, IcalDTSTARTProperty, IcalFREEBUSYProperty,
        IcalUIDProperty,
    },
    types::Period,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalFreeBusy {
    start_line: usize,
    uid: Option<String>,
    pub dtstamp: Option<IcalDTSTAMPProperty>,
    pub dtstart: Option<IcalDTSTARTProperty>,
    pub dtend: Option<IcalDTENDProperty>,
    /// Every FREEBUSY period, flattened in document order.
    pub periods: Vec<Period>,
    pub properties: Vec<ContentLine>,
}

impl IcalFreeBusy {
    pub fn get_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn get_periods(&self) -> &[Period] {
        &self.periods
    }
}

impl Properties for IcalFreeBusy {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalFreeBusy {
    const NAMES: &[&str] = &["VFREEBUSY"];

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
        let dtend = builder.optional::<IcalDTENDProperty>();
        let periods = builder
            .all::<IcalFREEBUSYProperty>()
            .into_iter()
            .flat_map(|prop| prop.0)
            .collect();

        builder.finish(|properties| IcalFreeBusy {
            start_line,
            uid,
            dtstamp,
            dtstart,
            dtend,
            periods,
            properties,
        })
    }
}
