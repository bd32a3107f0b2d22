//! Two-mode tag/text automaton over an HTML-like document.
//!
//! This is not a parser: there is no DOM, entities stay encoded and malformed
//! input still splits deterministically. Concatenating the raw form of every
//! segment reproduces the input exactly.

use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Between `<` and `>`.
    InsideTag,
    /// Between `>` and `<`.
    InText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text closed by a `<`.
    Text(&'a str),
    /// Tag content between `<` and `>`, delimiters excluded.
    Tag(&'a str),
    /// Input left at the end of the document: unclosed text, or an
    /// unterminated tag including its `<`.
    Trailing(&'a str),
}

impl Segment<'_> {
    /// Writes the segment back exactly as it appeared in the input.
    pub fn write_raw(&self, out: &mut String) {
        match self {
            Segment::Text(text) | Segment::Trailing(text) => out.push_str(text),
            Segment::Tag(tag) => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Splits a document into `(byte_offset, Segment)` pairs. Empty text runs
/// between adjacent tags are not reported.
pub struct Segments<'a> {
    source: &'a str,
    chars: CharIndices<'a>,
    mode: ScanMode,
    start: usize,
    finished: bool,
}

impl<'a> Segments<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            mode: ScanMode::InText,
            start: 0,
            finished: false,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = (usize, Segment<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for (idx, ch) in self.chars.by_ref() {
            match (self.mode, ch) {
                (ScanMode::InText, '<') => {
                    let start = self.start;
                    self.mode = ScanMode::InsideTag;
                    self.start = idx + 1;
                    if idx > start {
                        return Some((start, Segment::Text(&self.source[start..idx])));
                    }
                }
                (ScanMode::InsideTag, '>') => {
                    let start = self.start;
                    self.mode = ScanMode::InText;
                    self.start = idx + 1;
                    return Some((start - 1, Segment::Tag(&self.source[start..idx])));
                }
                _ => {}
            }
        }

        self.finished = true;
        let start = match self.mode {
            ScanMode::InText => self.start,
            ScanMode::InsideTag => self.start - 1,
        };
        (start < self.source.len()).then(|| (start, Segment::Trailing(&self.source[start..])))
    }
}

/// True when `tag` opens the document body (`<body>` or `<body ...>`).
pub fn is_body_tag(tag: &str) -> bool {
    tag.get(..4)
        .is_some_and(|name| name.eq_ignore_ascii_case("body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> Vec<Segment<'_>> {
        Segments::new(source).map(|(_, segment)| segment).collect()
    }

    fn rebuild(source: &str) -> String {
        let mut out = String::new();
        for (_, segment) in Segments::new(source) {
            segment.write_raw(&mut out);
        }
        out
    }

    #[test]
    fn splits_tags_and_text() {
        assert_eq!(
            collect("<p class=\"x\">Hello — world</p>\n"),
            vec![
                Segment::Tag("p class=\"x\""),
                Segment::Text("Hello — world"),
                Segment::Tag("/p"),
                Segment::Trailing("\n"),
            ]
        );
    }

    #[test]
    fn offsets_point_at_segment_start() {
        let offsets: Vec<_> = Segments::new("ab<i>“c”</i>")
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(offsets, vec![0, 2, 5, 12]);
    }

    #[test]
    fn malformed_markup_round_trips() {
        for source in [
            "",
            "plain text",
            "<unterminated",
            "a > b <br> c",
            "<a<b>text</b>",
            "<<>>",
            "<p>tail",
        ] {
            assert_eq!(rebuild(source), source, "input {source:?}");
        }
    }

    #[test]
    fn stray_angle_brackets_stay_in_their_segment() {
        assert_eq!(
            collect("a > b<i>"),
            vec![Segment::Text("a > b"), Segment::Tag("i")]
        );
        assert_eq!(collect("<a<b>"), vec![Segment::Tag("a<b")]);
        assert_eq!(collect("x<br"), vec![Segment::Text("x"), Segment::Trailing("<br")]);
    }

    #[test]
    fn body_tag_detection() {
        assert!(is_body_tag("body"));
        assert!(is_body_tag("body class=\"calibre\""));
        assert!(is_body_tag("BODY"));
        assert!(!is_body_tag("/body"));
        assert!(!is_body_tag("bod"));
        assert!(!is_body_tag("p"));
        assert!(!is_body_tag("ĥody"));
    }
}
