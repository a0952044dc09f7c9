use crate::{
    component::{BuildContext, Built, Builder, Component, Properties},
    parser::{ContentLine, Line},
    property::{IcalACTIONProperty, IcalDURATIONProperty, IcalREPEATProperty, IcalTRIGGERProperty},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalAlarm {
    start_line: usize,
    pub action: String,
    pub trigger: IcalTRIGGERProperty,
    pub repeat: Option<IcalREPEATProperty>,
    pub duration: Option<IcalDURATIONProperty>,
    pub properties: Vec<ContentLine>,
}

impl IcalAlarm {
    pub fn get_action(&self) -> &str {
        &self.action
    }
}

impl Properties for IcalAlarm {
    fn get_properties(&self) -> &[ContentLine] {
        &self.properties
    }
}

impl Component for IcalAlarm {
    const NAMES: &[&str] = &["VALARM"];

    fn start_line(&self) -> usize {
        self.start_line
    }

    fn build(ctx: &BuildContext, start_line: usize, lines: Vec<Line>) -> Built<Self> {
        let mut builder = Builder::new(ctx, Self::NAMES[0], start_line, lines);

        // REQUIRED, but ONLY ONCE
        let action = builder.required::<IcalACTIONProperty>();
        let trigger = builder.required::<IcalTRIGGERProperty>();

        // OPTIONAL, but if one occurs, so MUST the other
        let repeat = builder.optional::<IcalREPEATProperty>();
        let duration = builder.optional::<IcalDURATIONProperty>();
        if repeat.is_some() != duration.is_some() && builder.mode().is_strict() {
            builder.invalidate(crate::parser::ParserError::PropertyConflict(
                "REPEAT and DURATION must occur together",
            ));
        }

        let (Some(IcalACTIONProperty(action, _)), Some(trigger)) = (action, trigger) else {
            return builder.discard();
        };
        builder.finish(|properties| IcalAlarm {
            start_line,
            action,
            trigger,
            repeat,
            duration,
            properties,
        })
    }
}
