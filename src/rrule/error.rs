#![allow(clippy::module_name_repetitions)]

use crate::rrule::Frequency;
pub use crate::rrule::parser::ParseError;
use crate::types::CalDateTimeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RRuleError {
    #[error("Invalid RRULE: {0}")]
    ParserError(#[from] ParseError),
    #[error("RRULE failed validation: {0}")]
    ValidationError(#[from] ValidationError),
    /// The seed or an UNTIL/EXDATE/RDATE value could not be expanded.
    #[error("RRULE expansion failed: {0}")]
    ExpansionError(String),
}

impl From<CalDateTimeError> for RRuleError {
    fn from(err: CalDateTimeError) -> Self {
        Self::ExpansionError(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than {value}")]
    InvalidFieldValue { field: String, value: String },
    #[error("{field}={value} is outside {start_idx}..={end_idx}")]
    InvalidFieldValueRange {
        field: String,
        value: String,
        start_idx: String,
        end_idx: String,
    },
    #[error("{by_rule} is not allowed with FREQ={freq}")]
    InvalidByRuleAndFrequency { by_rule: String, freq: Frequency },
    #[error("COUNT and UNTIL are mutually exclusive")]
    CountAndUntil,
}
