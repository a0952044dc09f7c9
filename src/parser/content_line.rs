//! Split a logical line from `LineReader` into its parts.
//!
//! A content line holds:
//! - A name formatted in uppercase.
//! - An ordered list of parameters. Keys are uppercased, values stay untouched apart from
//!   removing the surrounding double quotes. When a parameter repeats, the last occurrence
//!   wins and the name is remembered in `ContentLineParams::duplicates`.
//! - A value, trimmed of surrounding whitespace.
//!
//! The value starts after the first `:` that is not inside a double-quoted parameter value,
//! so `ALTREP="http://x/y;z"` is handled.
//!
//! #### Warning
//!   `ContentLineParser` only tokenizes. Whether a name, parameter or value is acceptable is
//!   decided by `Property::parse`.
//!
//! # Examples
//!
//! ```rust
//! let input = b"ATTENDEE;ROLE=CHAIR;CN=\"Doe; Jane\":mailto:jane@example.com\r\n";
//! let line = ical_stream::ContentLineParser::from_slice(input)
//!     .next()
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(line.name, "ATTENDEE");
//! assert_eq!(line.params.get_param("CN"), Some("Doe; Jane"));
//! assert_eq!(line.value, "mailto:jane@example.com");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::iter::Iterator;

use super::{BytesLines, Line, LineError, LineReader};
use crate::{
    PARAM_DELIMITER, PARAM_NAME_DELIMITER, PARAM_QUOTE, PARAM_VALUE_DELIMITER, VALUE_DELIMITER,
};

/// Error arising when trying to tokenize a content line
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ContentLineError {
    #[error("Line {0}: Missing property name.")]
    MissingName(usize),
    #[error("Line {0}: Invalid character in property name \"{1}\".")]
    InvalidName(usize, String),
    #[error("Line {0}: Missing a closing quote.")]
    MissingClosingQuote(usize),
    #[error("Line {0}: Missing a \"{1}\" delimiter.")]
    MissingDelimiter(usize, char),
    #[error("Line {0}: Missing a parameter key.")]
    MissingParamKey(usize),
    #[error("Line {0}: Missing value.")]
    MissingValue(usize),
    #[error(transparent)]
    LineError(#[from] LineError),
}

impl ContentLineError {
    pub fn line_number(&self) -> usize {
        match self {
            Self::MissingName(number)
            | Self::InvalidName(number, _)
            | Self::MissingClosingQuote(number)
            | Self::MissingDelimiter(number, _)
            | Self::MissingParamKey(number)
            | Self::MissingValue(number)
            | Self::LineError(LineError::InvalidUtf8(number)) => *number,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct ContentLineParams {
    params: Vec<(String, Vec<String>)>,
    /// Names that appeared more than once; the stored value is the last one.
    pub duplicates: Vec<String>,
}

impl ContentLineParams {
    #[inline]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.get_values(name)
            .and_then(|values| values.iter().map(String::as_str).next())
    }

    #[inline]
    pub fn get_values(&self, name: &str) -> Option<&[String]> {
        self.params
            .iter()
            .find(|(key, _)| name == key)
            .map(|(_, values)| values.as_slice())
    }

    #[inline]
    pub fn get_tzid(&self) -> Option<&str> {
        self.get_param("TZID")
    }

    #[inline]
    pub fn get_value_type(&self) -> Option<&str> {
        self.get_param("VALUE")
    }

    /// Insert or overwrite a parameter, keeping its original position.
    pub fn insert(&mut self, name: String, values: Vec<String>) {
        if let Some(pos) = self.params.iter().position(|(n, _)| n == &name) {
            if !self.duplicates.contains(&name) {
                self.duplicates.push(name.clone());
            }
            self.params[pos] = (name, values);
        } else {
            self.params.push((name, values));
        }
    }

    pub fn replace_param(&mut self, name: String, value: String) {
        if let Some(pos) = self.params.iter().position(|(n, _)| n == &name) {
            self.params[pos] = (name, vec![value]);
        } else {
            self.params.push((name, vec![value]));
        }
    }

    #[inline]
    pub fn remove(&mut self, name: &str) {
        self.params.retain(|(n, _)| n != name);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl From<Vec<(String, Vec<String>)>> for ContentLineParams {
    fn from(params: Vec<(String, Vec<String>)>) -> Self {
        let mut out = Self::default();
        for (name, values) in params {
            out.insert(name, values);
        }
        out
    }
}

/// An iCalendar property line.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct ContentLine {
    /// Property name.
    pub name: String,
    /// Property list of parameters.
    pub params: ContentLineParams,
    /// Property value.
    pub value: String,
}

impl ContentLine {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ContentLineParams::default(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn is_extension(&self) -> bool {
        self.name.starts_with("X-")
    }

    /// Tokenize one logical line.
    pub fn parse(line: &Line) -> Result<ContentLine, ContentLineError> {
        let number = line.number();
        let mut to_parse = line.as_str().trim_start();

        // Find end of property name
        let Some(name_end) = to_parse.find([PARAM_DELIMITER, VALUE_DELIMITER]) else {
            return Err(if to_parse.trim().is_empty() {
                ContentLineError::MissingName(number)
            } else {
                ContentLineError::MissingDelimiter(number, VALUE_DELIMITER)
            });
        };
        let (prop_name, remainder) = to_parse.split_at(name_end);
        let prop_name = prop_name.trim_end();
        if prop_name.is_empty() {
            return Err(ContentLineError::MissingName(number));
        }
        if !prop_name.chars().all(is_name_char) {
            return Err(ContentLineError::InvalidName(number, prop_name.to_owned()));
        }
        to_parse = remainder;

        // remainder either starts with ; or :
        let mut params = ContentLineParams::default();
        while to_parse.starts_with(PARAM_DELIMITER) {
            to_parse = &to_parse[1..];

            let Some((key, remainder)) = to_parse.split_once(PARAM_NAME_DELIMITER) else {
                return Err(ContentLineError::MissingDelimiter(number, PARAM_NAME_DELIMITER));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ContentLineError::MissingParamKey(number));
            }
            if key.contains([VALUE_DELIMITER, PARAM_DELIMITER]) {
                return Err(ContentLineError::MissingDelimiter(number, PARAM_NAME_DELIMITER));
            }
            to_parse = remainder;

            // In almost all cases we'll have one parameter value
            let mut values = Vec::with_capacity(1);

            // Loop over comma-separated parameter values
            loop {
                if to_parse.starts_with(PARAM_QUOTE) {
                    // dquoted value, may hold ":", ";" and ","
                    to_parse = &to_parse[1..];
                    let Some((content, remainder)) = to_parse.split_once(PARAM_QUOTE) else {
                        return Err(ContentLineError::MissingClosingQuote(number));
                    };
                    values.push(content.to_owned());
                    to_parse = remainder;
                } else {
                    let Some(delim_pos) =
                        to_parse.find([PARAM_DELIMITER, VALUE_DELIMITER, PARAM_VALUE_DELIMITER])
                    else {
                        return Err(ContentLineError::MissingDelimiter(number, VALUE_DELIMITER));
                    };
                    let (content, remainder) = to_parse.split_at(delim_pos);
                    values.push(content.to_owned());
                    to_parse = remainder;
                }

                if !to_parse.starts_with(PARAM_VALUE_DELIMITER) {
                    break;
                }
                to_parse = &to_parse[1..];
            }

            params.insert(key.to_uppercase(), values);
        }

        if !to_parse.starts_with(VALUE_DELIMITER) {
            return Err(ContentLineError::MissingValue(number));
        }
        to_parse = &to_parse[1..];
        Ok(ContentLine {
            name: prop_name.to_uppercase(),
            params,
            value: to_parse.trim().to_owned(),
        })
    }
}

impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "name: {}\nparams: {:?}\nvalue: {:?}",
            self.name, self.params.params, self.value
        )
    }
}

pub struct ContentLineParser<'a, T: Iterator<Item = Cow<'a, [u8]>>>(LineReader<'a, T>);

impl<'a> ContentLineParser<'a, BytesLines<'a>> {
    pub fn from_slice(slice: &'a [u8]) -> Self {
        ContentLineParser(LineReader::from_slice(slice))
    }
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

impl<'a, T: Iterator<Item = Cow<'a, [u8]>>> ContentLineParser<'a, T> {
    pub fn new(line_reader: LineReader<'a, T>) -> Self {
        ContentLineParser(line_reader)
    }
}

impl<'a, T: Iterator<Item = Cow<'a, [u8]>>> Iterator for ContentLineParser<'a, T> {
    type Item = Result<ContentLine, ContentLineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.0.next()? {
                Ok(line) if line.is_blank() => continue,
                Ok(line) => Some(ContentLine::parse(&line)),
                Err(err) => Some(Err(err.into())),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentLineError, ContentLineParser};
    use crate::parser::Line;
    use rstest::rstest;

    fn tokenize(input: &str) -> Result<super::ContentLine, ContentLineError> {
        super::ContentLine::parse(&Line::new(input, 7))
    }

    #[test]
    fn name_params_value() {
        let line = tokenize("dtstart;tzid=Europe/Berlin;Value=DATE-TIME:20240101T100000 ").unwrap();
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.params.get_tzid(), Some("Europe/Berlin"));
        assert_eq!(line.params.get_value_type(), Some("DATE-TIME"));
        assert_eq!(line.value, "20240101T100000");
    }

    #[test]
    fn colon_inside_quotes() {
        let line =
            tokenize("DESCRIPTION;ALTREP=\"cid:part1.0001@example.org\":The: value").unwrap();
        assert_eq!(line.params.get_param("ALTREP"), Some("cid:part1.0001@example.org"));
        assert_eq!(line.value, "The: value");
    }

    #[test]
    fn multiple_param_values() {
        let line = tokenize("ATTENDEE;MEMBER=\"mailto:a@x\",\"mailto:b@x\":mailto:c@x").unwrap();
        assert_eq!(
            line.params.get_values("MEMBER").unwrap(),
            ["mailto:a@x", "mailto:b@x"]
        );
    }

    #[test]
    fn duplicate_param_last_wins() {
        let line = tokenize("SUMMARY;LANGUAGE=en;X-A=1;LANGUAGE=de:Hallo").unwrap();
        assert_eq!(line.params.get_param("LANGUAGE"), Some("de"));
        assert_eq!(line.params.duplicates, ["LANGUAGE"]);
        assert_eq!(line.params.iter().map(|(n, _)| n).collect::<Vec<_>>(), ["LANGUAGE", "X-A"]);
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(tokenize("DESCRIPTION:").unwrap().value, "");
    }

    #[rstest]
    #[case(":value", ContentLineError::MissingName(7))]
    #[case("SUMMARY", ContentLineError::MissingDelimiter(7, ':'))]
    #[case("SUM MARY:x", ContentLineError::InvalidName(7, "SUM MARY".to_owned()))]
    #[case("SUMMARY;LANGUAGE:x", ContentLineError::MissingDelimiter(7, '='))]
    #[case("SUMMARY;=en:x", ContentLineError::MissingParamKey(7))]
    #[case("SUMMARY;CN=\"open:x", ContentLineError::MissingClosingQuote(7))]
    #[case("SUMMARY;CN=\"a\"x:y", ContentLineError::MissingValue(7))]
    fn errors(#[case] input: &str, #[case] expected: ContentLineError) {
        assert_eq!(tokenize(input), Err(expected));
    }

    #[test]
    fn iterator_skips_blank_lines() {
        let lines = ContentLineParser::from_slice(b"A:1\r\n\r\nB:2\r\n")
            .map(|line| line.unwrap().name)
            .collect::<Vec<_>>();
        assert_eq!(lines, ["A", "B"]);
    }
}
