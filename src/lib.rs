const PARAM_VALUE_DELIMITER: char = ',';
const VALUE_DELIMITER: char = ':';
const PARAM_DELIMITER: char = ';';
const PARAM_NAME_DELIMITER: char = '=';
const PARAM_QUOTE: char = '"';

pub mod component;
pub use component::ical::component::*;
pub use component::{Component, Properties, Recurring};

pub mod parser;
pub use parser::{
    ComponentParser, ContentLineParser, LineReader, ParseError, ParseMode, ParseReport,
    ParserError, ParserOptions,
};

pub mod sink;
pub use sink::{CalendarSink, CollectingSink, ErrorListener};

pub mod property;

pub mod generator;
pub use generator::Emitter;

pub mod rrule;
pub use rrule::RecurrenceRule;

pub mod types;
pub use types::CalendarDate;
