//! Serialize content lines and components back to iCalendar text.

mod ical;

use crate::parser::ContentLine;

/// Maximum line length in octets, CRLF excluded.
const MAX_LINE_OCTETS: usize = 75;

pub trait Emitter {
    /// CRLF-terminated, folded iCalendar text.
    fn generate(&self) -> String;
}

/// Fold a logical line at 75 octets and terminate it with CRLF.
///
/// Continuation lines start with a single space. Multi-octet UTF-8 sequences are never
/// split.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut out = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS + 1) * 3);
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;
    while !rest.is_empty() {
        let mut end = limit.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // a single character wider than the limit
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(end);
        if limit < MAX_LINE_OCTETS {
            out.push(' ');
        }
        out.push_str(head);
        out.push_str("\r\n");
        rest = tail;
        // the leading space counts
        limit = MAX_LINE_OCTETS - 1;
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.contains([':', ';', ','])
}

impl Emitter for ContentLine {
    fn generate(&self) -> String {
        let mut line = self.name.clone();
        for (name, values) in self.params.iter() {
            line.push(';');
            line.push_str(name);
            line.push('=');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                if needs_quotes(value) {
                    line.push('"');
                    line.push_str(value);
                    line.push('"');
                } else {
                    line.push_str(value);
                }
            }
        }
        line.push(':');
        line.push_str(&self.value);
        fold_line(&line)
    }
}

impl<T: Emitter> Emitter for [T] {
    fn generate(&self) -> String {
        self.iter().map(Emitter::generate).collect()
    }
}

impl<T: Emitter> Emitter for Option<T> {
    fn generate(&self) -> String {
        self.as_ref().map(Emitter::generate).unwrap_or_default()
    }
}
