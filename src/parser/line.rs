//! Read physical lines and merge RFC 5545 §3.1 folds into logical lines.
//!
//! A physical line that is non-empty and starts with a SPACE or HTAB continues the previous
//! one. Unfolding drops the line break together with that single whitespace octet and
//! concatenates the rest directly. Folds are merged on raw bytes so a fold that splits a
//! multi-octet UTF-8 sequence is reassembled before decoding.
//!
//! # Examples
//!
//! ```rust
//! let input = b"SUMMARY:abc\r\n def\r\nUID:1\r\n";
//! let lines = ical_stream::LineReader::from_slice(input)
//!     .map(|line| line.unwrap().into_inner())
//!     .collect::<Vec<_>>();
//! assert_eq!(lines, ["SUMMARY:abcdef", "UID:1"]);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;
use std::iter::Peekable;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("Line {0}: Invalid UTF-8 content.")]
    InvalidUtf8(usize),
}

/// One unfolded logical line and the physical line number it started on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub inner: String,
    number: usize,
}

impl Line {
    pub fn new(inner: impl Into<String>, number: usize) -> Self {
        Self {
            inner: inner.into(),
            number,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.inner
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }

    /// Recognise `BEGIN:<NAME>` / `END:<NAME>` markers, case-insensitively.
    pub fn component_marker(&self) -> Option<ComponentMarker> {
        let (name, value) = self.inner.split_once(crate::VALUE_DELIMITER)?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let name = name.trim();
        if name.eq_ignore_ascii_case("BEGIN") {
            Some(ComponentMarker::Begin(value.to_ascii_uppercase()))
        } else if name.eq_ignore_ascii_case("END") {
            Some(ComponentMarker::End(value.to_ascii_uppercase()))
        } else {
            None
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentMarker {
    Begin(String),
    End(String),
}

/// Physical lines of an in-memory buffer, split on LF.
pub struct BytesLines<'a> {
    rest: &'a [u8],
}

impl<'a> BytesLines<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self { rest: slice }
    }
}

impl<'a> Iterator for BytesLines<'a> {
    type Item = Cow<'a, [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 1..];
                Some(Cow::Borrowed(line))
            }
            None => {
                let line = self.rest;
                self.rest = &[];
                Some(Cow::Borrowed(line))
            }
        }
    }
}

/// Physical lines pulled from any `BufRead`.
///
/// An I/O error ends the stream; it is logged rather than surfaced since the parse must
/// still report whatever was read up to that point.
pub struct ReaderLines<R: BufRead> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for ReaderLines<R> {
    type Item = Cow<'static, [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                Some(Cow::Owned(buf))
            }
            Err(err) => {
                tracing::warn!(error = %err, "reading input failed, stopping");
                self.finished = true;
                None
            }
        }
    }
}

fn strip_cr<'a>(line: Cow<'a, [u8]>) -> Cow<'a, [u8]> {
    match line {
        Cow::Borrowed(slice) => Cow::Borrowed(slice.strip_suffix(b"\r").unwrap_or(slice)),
        Cow::Owned(mut vec) => {
            if vec.last() == Some(&b'\r') {
                vec.pop();
            }
            Cow::Owned(vec)
        }
    }
}

#[inline]
fn is_continuation(line: &[u8]) -> bool {
    matches!(line.first(), Some(b' ' | b'\t'))
}

/// Turns physical lines into logical lines with one line of lookahead.
pub struct LineReader<'a, T: Iterator<Item = Cow<'a, [u8]>>> {
    lines: Peekable<T>,
    number: usize,
}

impl<'a> LineReader<'a, BytesLines<'a>> {
    pub fn from_slice(slice: &'a [u8]) -> Self {
        Self::new(BytesLines::new(slice))
    }
}

impl<R: BufRead> LineReader<'static, ReaderLines<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(ReaderLines::new(reader))
    }
}

impl<'a, T: Iterator<Item = Cow<'a, [u8]>>> LineReader<'a, T> {
    pub fn new(lines: T) -> Self {
        LineReader {
            lines: lines.peekable(),
            number: 0,
        }
    }
}

impl<'a, T: Iterator<Item = Cow<'a, [u8]>>> Iterator for LineReader<'a, T> {
    type Item = Result<Line, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.lines.next()?;
        self.number += 1;
        let start = self.number;
        let mut logical = strip_cr(first);

        while self.lines.peek().is_some_and(|next| is_continuation(next)) {
            let Some(continuation) = self.lines.next() else {
                break;
            };
            self.number += 1;
            let continuation = strip_cr(continuation);
            logical.to_mut().extend_from_slice(&continuation[1..]);
        }

        Some(
            String::from_utf8(logical.into_owned())
                .map(|inner| Line::new(inner, start))
                .map_err(|_| LineError::InvalidUtf8(start)),
        )
    }
}
