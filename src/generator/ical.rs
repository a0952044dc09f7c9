use crate::component::{
    IcalAlarm, IcalAvailability, IcalAvailable, IcalEvent, IcalFreeBusy, IcalJournal,
    IcalLocation, IcalParticipant, IcalResource, IcalTimeZone, IcalTimeZoneTransition, IcalTodo,
};
use crate::generator::Emitter;
use crate::parser::CalendarProperties;

macro_rules! generate_emitter {
    ($struct:ty, $($prop:ident),*) => {
        impl Emitter for $struct {
            fn generate(&self) -> String {
                let compname = crate::component::Component::get_comp_name(self);
                let mut text = format!("BEGIN:{compname}\r\n");
                text += &crate::component::Properties::get_properties(self).generate();
                $(text += &self.$prop.generate();)*
                text + "END:" + compname + "\r\n"
            }
        }
    };
}

generate_emitter!(IcalAlarm,);
generate_emitter!(IcalFreeBusy,);
generate_emitter!(IcalLocation,);
generate_emitter!(IcalResource,);
generate_emitter!(IcalParticipant, locations, resources);
generate_emitter!(IcalEvent, alarms, participants, locations, resources);
generate_emitter!(IcalTodo, alarms, participants, locations, resources);
generate_emitter!(IcalJournal, alarms, participants, locations);
generate_emitter!(IcalTimeZoneTransition,);
generate_emitter!(IcalTimeZone, transitions);
generate_emitter!(IcalAvailable,);
generate_emitter!(IcalAvailability, available);

impl CalendarProperties {
    /// Wrap already generated components into a VCALENDAR.
    pub fn generate_calendar(&self, components: &str) -> String {
        use crate::parser::ContentLine;

        let mut text = String::from("BEGIN:VCALENDAR\r\n");
        let typed = [
            ("VERSION", &self.version),
            ("PRODID", &self.prodid),
            ("CALSCALE", &self.calscale),
            ("METHOD", &self.method),
            ("NAME", &self.name),
            ("CALENDAR-ADDRESS", &self.calendar_address),
        ];
        for (name, value) in typed {
            if let Some(value) = value {
                text += &ContentLine::new(name, value.as_str()).generate();
            }
        }
        text += &self.other.generate();
        text += &self.extensions.generate();
        text += components;
        text + "END:VCALENDAR\r\n"
    }
}

#[cfg(test)]
mod tests {
    use crate::generator::Emitter;
    use crate::parser::ParserOptions;
    use crate::sink::CollectingSink;
    use crate::ComponentParser;

    const INPUT: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//ical-stream//test//EN\r\n\
        BEGIN:VTIMEZONE\r\n\
        TZID:Europe/Berlin\r\n\
        BEGIN:STANDARD\r\n\
        DTSTART:19701025T030000\r\n\
        TZOFFSETFROM:+0200\r\n\
        TZOFFSETTO:+0100\r\n\
        END:STANDARD\r\n\
        END:VTIMEZONE\r\n\
        BEGIN:VEVENT\r\n\
        UID:roundtrip@example.com\r\n\
        DTSTART;TZID=Europe/Berlin:20240101T100000\r\n\
        SUMMARY:A summary that is long enough to need folding once it is written back out\r\n\
        BEGIN:VALARM\r\n\
        ACTION:DISPLAY\r\n\
        TRIGGER:-PT15M\r\n\
        END:VALARM\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    #[test]
    fn parse_generate_parse() {
        let mut sink = CollectingSink::default();
        let mut parser = ComponentParser::with_options(ParserOptions::strict());
        parser.add_sink(&mut sink);
        let report = parser.parse_slice(INPUT.as_bytes());
        assert!(report.success, "{:?}", report.errors);
        drop(parser);

        let body = sink.timezones.generate() + &sink.events.generate();
        let output = report.calendar.generate_calendar(&body);
        assert!(output.split("\r\n").all(|line| line.len() <= 75));
        assert!(output.contains("\r\n "));

        let mut again = CollectingSink::default();
        let mut parser = ComponentParser::with_options(ParserOptions::strict());
        parser.add_sink(&mut again);
        let second = parser.parse_slice(output.as_bytes());
        assert!(second.success, "{:?}", second.errors);
        drop(parser);

        similar_asserts::assert_eq!(again.events[0].properties, sink.events[0].properties);
        similar_asserts::assert_eq!(again.timezones, sink.timezones);
        assert_eq!(second.calendar.prodid, report.calendar.prodid);
    }
}
