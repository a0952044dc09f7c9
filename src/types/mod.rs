pub mod calendar;

mod datetime;
pub use datetime::{CalendarDate, DateContext, ValueType};

mod duration;
pub use duration::{InvalidDuration, format_duration, parse_duration};

mod timezone;
pub use timezone::{
    UtcOffset, convert, from_utc, get_proprietary_tzid, localize, parse_utc_offset, resolve_tzid,
};

mod value;
pub use value::{DateOrPeriod, Period, PeriodEnd, Value};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CalDateTimeError {
    #[error("Could not parse date-time value: {0}")]
    ParseError(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Value {value} does not match VALUE={expected}")]
    ValueTypeMismatch { value: String, expected: ValueType },
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Date-time {0} cannot be represented in the requested timezone")]
    Unrepresentable(String),
    #[error("Invalid UTC offset: {0}")]
    InvalidUtcOffset(String),
}
