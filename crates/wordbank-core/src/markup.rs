//! `**bold**` markup used in example sentences.

/// A run of example text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(s) | Segment::Bold(s) => s,
        }
    }
}

/// Split `text` into plain and bold runs. A `**` without a closing partner
/// stays plain text; empty runs are dropped.
pub fn parse_markup(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Plain(&rest[..open]));
        }
        if close > 0 {
            segments.push(Segment::Bold(&after_open[..close]));
        }
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Plain(rest));
    }
    segments
}

/// The text with markup removed.
pub fn strip_markup(text: &str) -> String {
    parse_markup(text).iter().map(Segment::text).collect()
}
