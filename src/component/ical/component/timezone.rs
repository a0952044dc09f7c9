use chrono_tz::Tz;

use crate::{
    component::{BuildContext, Built, Builder, Component, Properties},
    parser::{ComponentMarker, ContentLine, Line, ParserError},
    property::{
        IcalDTSTARTProperty, IcalRRULEProperty, IcalTZIDProperty, IcalTZOFFSETFROMProperty,
        IcalTZOFFSETTOProperty,
    },
    rrule::RecurrenceRule,
    types::{UtcOffset, get_proprietary_tzid},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalTimeZone {
    start_line: usize,
    tzid: String,
    pub properties: Vec<ContentLine>,
    pub transitions: Vec<IcalTimeZoneTransition>,
}

impl IcalTimeZone {
    pub fn get_tzid(&self) -> &str {
        &self.tzid
    }

    /// This is a common property containing a timezone identifier from the IANA TZDB
    pub fn get_lic_location(&self) -> Option<&str> {
        self.get_property("X-LIC-LOCATION")
            .map(|prop| prop.value.as_str())
    }

    pub fn standard(&self) -> impl Iterator<Item = &IcalTimeZoneTransition> {
        self.transitions
            .iter()
            .filter(|t| t.kind == IcalTimeZoneTransitionType::Standard)
    }

    pub fn daylight(&self) -> impl Iterator<Item = &IcalTimeZoneTransition> {
        self.transitions
            .iter()
            .filter(|t| t.kind == IcalTimeZoneTransitionType::Daylight)
    }
}

impl From<&IcalTimeZone> for Option<Tz> {
    fn from(value: &IcalTimeZone) -> Self {
        // Try X-LIC-LOCATION
        if let Some(loc) = value.get_lic_location()
            && let Ok(tz) = loc.parse::<Tz>()
        {
            return Some(tz);
        };

        // Try using TZID in Olson DB
        let tzid = value.get_tzid();
        if let Ok(tz) = tzid.parse::<Tz>() {
            return Some(tz);
        }
        // Try map of proprietary timezone IDs (mostly for Microsoft products)
        get_proprietary_tzid(tzid)
    }
}

impl Properties for IcalTimeZone {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalTimeZone {
    const NAMES: &[&str] = &["VTIMEZONE"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);
        let tzid = builder.required::<IcalTZIDProperty>();
        let transitions = builder.children::<IcalTimeZoneTransition>(IcalTimeZoneTransition::NAMES);
        if transitions.is_empty() && builder.mode().is_strict() {
            builder.invalidate(ParserError::MissingProperty("STANDARD or DAYLIGHT"));
        }

        let Some(IcalTZIDProperty(tzid, _)) = tzid else {
            return builder.discard();
        };
        builder.finish(|properties| IcalTimeZone {
            start_line,
            tzid,
            properties,
            transitions,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub enum IcalTimeZoneTransitionType {
    #[default]
    Standard,
    Daylight,
}

impl IcalTimeZoneTransitionType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "STANDARD" => Some(Self::Standard),
            "DAYLIGHT" => Some(Self::Daylight),
            _ => None,
        }
    }
}

/// A STANDARD or DAYLIGHT observance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalTimeZoneTransition {
    start_line: usize,
    pub kind: IcalTimeZoneTransitionType,
    pub dtstart: IcalDTSTARTProperty,
    pub offset_from: UtcOffset,
    pub offset_to: UtcOffset,
    pub rrule: Option<RecurrenceRule>,
    pub properties: Vec<ContentLine>,
}

impl Properties for IcalTimeZoneTransition {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalTimeZoneTransition {
    const NAMES: &[&str] = &["STANDARD", "DAYLIGHT"];

    fn get_comp_name(&self) -> &'static str {
        match self.kind {
            IcalTimeZoneTransitionType::Standard => "STANDARD",
            IcalTimeZoneTransitionType::Daylight => "DAYLIGHT",
        }
    }

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let kind = match lines.first().and_then(Line::component_marker) {
            Some(ComponentMarker::Begin(name)) => IcalTimeZoneTransitionType::from_name(&name),
            _ => None,
        };
        let name = match kind {
            Some(IcalTimeZoneTransitionType::Daylight) => "DAYLIGHT",
            _ => "STANDARD",
        };
        let mut builder = Builder::new(ctx, name, start_line, lines);
        if kind.is_none() {
            builder.invalidate(ParserError::InvalidComponent(name.to_owned()));
        }

        let dtstart = builder.required::<IcalDTSTARTProperty>();
        let offset_from = builder.required::<IcalTZOFFSETFROMProperty>();
        let offset_to = builder.required::<IcalTZOFFSETTOProperty>();
        let rrule = builder.optional::<IcalRRULEProperty>();

        let (Some(kind), Some(dtstart), Some(offset_from), Some(offset_to)) =
            (kind, dtstart, offset_from, offset_to)
        else {
            return builder.discard();
        };
        builder.finish(|properties| IcalTimeZoneTransition {
            start_line,
            kind,
            dtstart,
            offset_from: offset_from.0,
            offset_to: offset_to.0,
            rrule: rrule.map(|rrule| rrule.0),
            properties,
        })
    }
}
