use chrono_tz::Tz;
use itertools::Itertools;

use super::Builder;
use crate::parser::ParseMode;
use crate::property::{
    IcalDTSTARTProperty, IcalEXDATEProperty, IcalEXRULEProperty, IcalRDATEProperty,
    IcalRRULEProperty,
};
use crate::rrule::{RRuleError, RecurrenceLimits, RecurrenceRule, same_occurrence};
use crate::types::{CalendarDate, resolve_tzid};

/// DTSTART together with the RRULE, EXRULE, EXDATE and RDATE properties of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSet {
    pub dtstart: CalendarDate,
    /// Zone named by DTSTART's TZID, which rules are expanded in.
    pub zone: Option<Tz>,
    pub rrules: Vec<RecurrenceRule>,
    /// Only filled in RFC 2445 compatibility mode.
    pub exrules: Vec<RecurrenceRule>,
    pub exdates: Vec<CalendarDate>,
    pub rdates: Vec<CalendarDate>,
    pub limits: RecurrenceLimits,
}

impl RecurrenceSet {
    pub(crate) fn collect(builder: &mut Builder, dtstart: &IcalDTSTARTProperty) -> Self {
        let timezones = builder.context().timezones;
        let zone = dtstart
            .1
            .get_tzid()
            .and_then(|tzid| resolve_tzid(tzid, timezones));
        let rrules = builder
            .all::<IcalRRULEProperty>()
            .into_iter()
            .map(|prop| prop.0)
            .collect();
        let exrules = if builder.mode() == ParseMode::Rfc2445Compat {
            builder
                .all::<IcalEXRULEProperty>()
                .into_iter()
                .map(|prop| prop.0)
                .collect()
        } else {
            vec![]
        };
        let exdates = builder
            .all::<IcalEXDATEProperty>()
            .into_iter()
            .flat_map(|prop| prop.0)
            .collect();
        let rdates = builder
            .all::<IcalRDATEProperty>()
            .into_iter()
            .flat_map(|prop| prop.0)
            .map(|entry| entry.start().clone())
            .collect();

        Self {
            dtstart: dtstart.0.clone(),
            zone,
            rrules,
            exrules,
            exdates,
            rdates,
            limits: builder.context().options.recurrence,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !self.rrules.is_empty() || !self.rdates.is_empty()
    }

    /// Every occurrence after DTSTART, ascending.
    ///
    /// Each RRULE is expanded on its own and the results merged. Dates produced by an
    /// EXRULE are removed afterwards, like EXDATEs.
    pub fn occurrences(&self) -> Result<Vec<CalendarDate>, RRuleError> {
        let mut excluded = self.exdates.clone();
        for exrule in &self.exrules {
            excluded.extend(exrule.generate_with_limits(
                &self.dtstart,
                self.zone,
                &[],
                &[],
                &self.limits,
            )?);
        }

        let all_day = self.dtstart.is_date_only();
        let mut dates = if self.rrules.is_empty() {
            self.rdates
                .iter()
                .filter(|date| {
                    !same_occurrence(date, &self.dtstart, all_day)
                        && !excluded.iter().any(|ex| same_occurrence(date, ex, all_day))
                })
                .cloned()
                .collect()
        } else {
            let mut dates = vec![];
            for rrule in &self.rrules {
                dates.extend(rrule.generate_with_limits(
                    &self.dtstart,
                    self.zone,
                    &excluded,
                    &self.rdates,
                    &self.limits,
                )?);
            }
            dates
        };

        dates.sort_by(CalendarDate::compare);
        Ok(dates
            .into_iter()
            .dedup_by(|a, b| a.compare(b).is_eq())
            .collect())
    }
}

/// Components that can carry a recurrence set.
pub trait Recurring {
    fn recurrence(&self) -> Option<&RecurrenceSet>;

    /// Occurrences after DTSTART; empty when the component has no DTSTART.
    fn occurrences(&self) -> Result<Vec<CalendarDate>, RRuleError> {
        self.recurrence()
            .map_or(Ok(vec![]), RecurrenceSet::occurrences)
    }

    fn is_recurring(&self) -> bool {
        self.recurrence().is_some_and(RecurrenceSet::is_recurring)
    }
}
