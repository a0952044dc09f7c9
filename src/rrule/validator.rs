use super::{Frequency, RecurrenceRule, ValidationError};

/// BYSETPOS bound applied on top of the ±366 accepted while parsing.
const SET_POS_RANGE: std::ops::RangeInclusive<i32> = 1..=53;

fn forbid(
    present: bool,
    by_rule: &str,
    freq: Frequency,
) -> Result<(), ValidationError> {
    if present {
        return Err(ValidationError::InvalidByRuleAndFrequency {
            by_rule: by_rule.to_owned(),
            freq,
        });
    }
    Ok(())
}

impl RecurrenceRule {
    /// Check the rule parts against each other and the frequency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "INTERVAL".into(),
                value: "0".into(),
            });
        }
        if self.count.is_some() && self.until.is_some() {
            return Err(ValidationError::CountAndUntil);
        }
        if self.count == Some(0) {
            return Err(ValidationError::InvalidFieldValue {
                field: "COUNT".into(),
                value: "0".into(),
            });
        }

        let freq = self.freq;
        match freq {
            Frequency::Weekly => {
                forbid(self.by_month_day.is_some(), "BYMONTHDAY", freq)?;
                forbid(self.by_year_day.is_some(), "BYYEARDAY", freq)?;
            }
            Frequency::Daily => {
                forbid(self.by_month_day.is_some(), "BYMONTHDAY", freq)?;
                forbid(self.by_year_day.is_some(), "BYYEARDAY", freq)?;
                forbid(self.by_day.is_some(), "BYDAY", freq)?;
            }
            Frequency::Monthly => {
                forbid(self.by_year_day.is_some(), "BYYEARDAY", freq)?;
            }
            _ => {}
        }
        if freq != Frequency::Yearly {
            forbid(self.by_week_no.is_some(), "BYWEEKNO", freq)?;
        }

        for &pos in self.by_set_pos.iter().flatten() {
            if !SET_POS_RANGE.contains(&pos.abs()) {
                return Err(ValidationError::InvalidFieldValueRange {
                    field: "BYSETPOS".into(),
                    value: pos.to_string(),
                    start_idx: format!("-{}", SET_POS_RANGE.end()),
                    end_idx: SET_POS_RANGE.end().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
