//! RFC 9073 components: PARTICIPANT, VLOCATION and VRESOURCE.

use crate::{
    component::{BuildContext, Built, Builder, Component, Properties},
    parser::{ContentLine, Line},
    property::{IcalPARTICIPANTTYPEProperty, IcalUIDProperty},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalParticipant {
    start_line: usize,
    uid: String,
    pub participant_type: Option<String>,
    pub properties: Vec<ContentLine>,
    pub locations: Vec<IcalLocation>,
    pub resources: Vec<IcalResource>,
}

impl IcalParticipant {
    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    pub fn get_calendar_address(&self) -> Option<&str> {
        self.get_property("CALENDAR-ADDRESS")
            .map(|prop| prop.value.as_str())
    }
}

impl Properties for IcalParticipant {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalParticipant {
    const NAMES: &[&str] = &["PARTICIPANT"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        let uid = builder.required::<IcalUIDProperty>();
        let participant_type = builder
            .strict_required::<IcalPARTICIPANTTYPEProperty>()
            .map(|prop| prop.0);
        let locations = builder.children::<IcalLocation>(IcalLocation::NAMES);
        let resources = builder.children::<IcalResource>(IcalResource::NAMES);

        let Some(IcalUIDProperty(uid, _)) = uid else {
            return builder.discard();
        };
        builder.finish(|properties| IcalParticipant {
            start_line,
            uid,
            participant_type,
            properties,
            locations,
            resources,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalLocation {
    start_line: usize,
    uid: String,
    pub properties: Vec<ContentLine>,
}

impl IcalLocation {
    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    pub fn get_name(&self) -> Option<&str> {
        self.get_property("NAME").map(|prop| prop.value.as_str())
    }
}

impl Properties for IcalLocation {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalLocation {
    const NAMES: &[&str] = &["VLOCATION"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);
        let Some(IcalUIDProperty(uid, _)) = builder.required::<IcalUIDProperty>() else {
            return builder.discard();
        };
        builder.finish(|properties| IcalLocation {
            start_line,
            uid,
            properties,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalResource {
    start_line: usize,
    uid: String,
    pub properties: Vec<ContentLine>,
}

impl IcalResource {
    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    pub fn get_resource_type(&self) -> Option<&str> {
        self.get_property("RESOURCE-TYPE")
            .map(|prop| prop.value.as_str())
    }
}

impl Properties for IcalResource {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalResource {
    const NAMES: &[&str] = &["VRESOURCE"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);
        let Some(IcalUIDProperty(uid, _)) = builder.required::<IcalUIDProperty>() else {
            return builder.discard();
        };
        builder.finish(|properties| IcalResource {
            start_line,
            uid,
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{IcalLocation, IcalParticipant, IcalResource};
    use crate::component::{BuildContext, Component};
    use crate::parser::{Line, LineReader, ParseMode, ParserOptions};

    fn lines(input: &str) -> Vec<Line> {
        LineReader::from_slice(input.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn participant_with_location() {
        let options = ParserOptions::strict();
        let built = IcalParticipant::build(
            &BuildContext::new(&options),
            1,
            lines(
                "BEGIN:PARTICIPANT\r\n\
                 UID:p1\r\n\
                 PARTICIPANT-TYPE:SPEAKER\r\n\
                 CALENDAR-ADDRESS:mailto:speaker@example.com\r\n\
                 BEGIN:VLOCATION\r\n\
                 UID:loc1\r\n\
                 NAME:Hall A\r\n\
                 END:VLOCATION\r\n\
                 END:PARTICIPANT\r\n",
            ),
        );
        assert!(built.errors.is_empty(), "{:?}", built.errors);
        let participant = built.component.unwrap();
        assert_eq!(participant.get_uid(), "p1");
        assert_eq!(participant.participant_type.as_deref(), Some("SPEAKER"));
        assert_eq!(
            participant.get_calendar_address(),
            Some("mailto:speaker@example.com")
        );
        assert_eq!(participant.locations[0].get_name(), Some("Hall A"));
        assert_eq!(participant.locations[0].start_line(), 5);
    }

    #[test]
    fn participant_type_only_required_in_strict() {
        let input = "BEGIN:PARTICIPANT\r\nUID:p1\r\nEND:PARTICIPANT\r\n";
        let strict = ParserOptions::strict();
        assert!(!IcalParticipant::build(&BuildContext::new(&strict), 1, lines(input)).is_valid());
        let loose = ParserOptions::default().with_mode(ParseMode::Loose);
        assert!(IcalParticipant::build(&BuildContext::new(&loose), 1, lines(input)).is_valid());
    }

    #[test]
    fn location_and_resource_need_uid() {
        let options = ParserOptions::default();
        let ctx = BuildContext::new(&options);
        assert!(
            !IcalLocation::build(&ctx, 1, lines("BEGIN:VLOCATION\r\nNAME:x\r\nEND:VLOCATION\r\n"))
                .is_valid()
        );
        let resource = IcalResource::build(
            &ctx,
            1,
            lines("BEGIN:VRESOURCE\r\nUID:r1\r\nRESOURCE-TYPE:PROJECTOR\r\nEND:VRESOURCE\r\n"),
        )
        .component
        .unwrap();
        assert_eq!(resource.get_resource_type(), Some("PROJECTOR"));
    }
}
