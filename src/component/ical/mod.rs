//! Typed iCalendar components.
//!
//! Each component is built from the buffered lines between its BEGIN and END markers, see
//! [`Component::build`](crate::component::Component::build). Nested components are split
//! out and built by their parent.
//!
//! # Examples
//!
//! ```rust
//! use ical_stream::component::{BuildContext, Component, IcalEvent};
//! use ical_stream::parser::{LineReader, ParserOptions};
//!
//! let input = b"BEGIN:VEVENT\r\nUID:1\r\nDTSTART:20240101T100000\r\nEND:VEVENT\r\n";
//! let lines = LineReader::from_slice(input).collect::<Result<Vec<_>, _>>().unwrap();
//! let options = ParserOptions::default();
//! let built = IcalEvent::build(&BuildContext::new(&options), 1, lines);
//! let event = built.component.unwrap();
//! assert_eq!(event.get_uid(), Some("1"));
//! ```

pub mod component;
