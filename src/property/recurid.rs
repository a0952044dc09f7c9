use crate::{
    parser::{ContentLine, ContentLineParams, ICalProperty, ParseProp, ParserError},
    types::{CalendarDate, DateContext, Value},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecurIdRange {
    #[default]
    This,
    ThisAndFuture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalRECURIDProperty(pub CalendarDate, pub ContentLineParams, pub RecurIdRange);

impl ICalProperty for IcalRECURIDProperty {
    const NAME: &'static str = "RECURRENCE-ID";
    const DEFAULT_TYPE: &'static str = "DATE-TIME";

    fn parse_prop(prop: &ContentLine, ctx: &DateContext) -> Result<Self, ParserError> {
        let dt = ParseProp::parse_prop(prop, ctx)?;
        let range = match prop.params.get_param("RANGE") {
            Some(range) if range.eq_ignore_ascii_case("THISANDFUTURE") => {
                RecurIdRange::ThisAndFuture
            }
            None => RecurIdRange::This,
            Some(range) => return Err(ParserError::InvalidPropertyValue(range.to_owned())),
        };
        Ok(Self(dt, prop.params.clone(), range))
    }
}

impl IcalRECURIDProperty {
    /// RECURRENCE-ID has to use the same value type as DTSTART, and be floating exactly when
    /// DTSTART is.
    pub fn validate_dtstart(&self, dtstart: &CalendarDate) -> Result<(), ParserError> {
        if self.0.is_date_only() != dtstart.is_date_only()
            || self.0.is_floating() != dtstart.is_floating()
        {
            return Err(ParserError::DtstartNotMatchingRecurId);
        }
        Ok(())
    }
}

impl From<IcalRECURIDProperty> for ContentLine {
    fn from(value: IcalRECURIDProperty) -> Self {
        let IcalRECURIDProperty(dt, mut params, range) = value;
        if dt.drops_tzid() {
            params.remove("TZID");
        }
        let value_type = dt.value_type().unwrap_or(IcalRECURIDProperty::DEFAULT_TYPE);
        if value_type != IcalRECURIDProperty::DEFAULT_TYPE {
            params.replace_param("VALUE".to_owned(), value_type.to_owned());
        }
        if range == RecurIdRange::ThisAndFuture {
            params.replace_param("RANGE".to_owned(), "THISANDFUTURE".to_owned());
        }
        Self {
            name: IcalRECURIDProperty::NAME.to_owned(),
            params,
            value: dt.format_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IcalRECURIDProperty, RecurIdRange};
    use crate::{
        generator::Emitter,
        parser::{ContentLine, ICalProperty, ParserError},
        types::{CalendarDate, DateContext},
    };
    use rstest::rstest;

    fn parse(input: &str) -> Result<IcalRECURIDProperty, ParserError> {
        let content_line = crate::ContentLineParser::from_slice(input.as_bytes())
            .next()
            .unwrap()
            .unwrap();
        IcalRECURIDProperty::parse_prop(&content_line, &DateContext::default())
    }

    #[rstest]
    #[case("RECURRENCE-ID;VALUE=DATE:19960401\r\n")]
    #[case("RECURRENCE-ID;RANGE=THISANDFUTURE:19960120T120000Z\r\n")]
    fn roundtrip(#[case] input: &str) {
        let roundtrip: ContentLine = parse(input).unwrap().into();
        similar_asserts::assert_eq!(roundtrip.generate(), input);
    }

    #[test]
    fn range() {
        assert_eq!(
            parse("RECURRENCE-ID;RANGE=THISANDFUTURE:19960120T120000Z")
                .unwrap()
                .2,
            RecurIdRange::ThisAndFuture
        );
        assert!(parse("RECURRENCE-ID;RANGE=THISANDPRIOR:19960120T120000Z").is_err());
    }

    #[test]
    fn must_match_dtstart() {
        let recurid = parse("RECURRENCE-ID;VALUE=DATE:19960401").unwrap();
        assert!(
            recurid
                .validate_dtstart(&CalendarDate::date(1996, 3, 1).unwrap())
                .is_ok()
        );
        assert_eq!(
            recurid.validate_dtstart(&CalendarDate::floating(1996, 3, 1, 9, 0, 0).unwrap()),
            Err(ParserError::DtstartNotMatchingRecurId)
        );
    }
}
