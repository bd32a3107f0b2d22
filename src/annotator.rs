//! Word and phrase annotation of a single run of body text.
//!
//! A run is split into words and gaps. Gaps are whitespace, en and em dashes
//! and runs of two or more hyphens; they are copied through untouched. Each
//! word is looked up on its punctuation-trimmed core, and when that fails the
//! following words (across whitespace gaps only) are tried as a phrase of up
//! to [`MAX_PHRASE_WORDS`] words. The shortest matching phrase wins.

use std::borrow::Cow;

use crate::config::AnnotateOptions;
use crate::lexicon::{Lexicon, Resolution};
use crate::report::AnnotationReport;

pub const MAX_PHRASE_WORDS: usize = 5;

/// Characters stripped from both ends of a word before lookup and kept
/// outside the annotation.
fn is_trim_char(c: char) -> bool {
    matches!(
        c,
        '.' | '?'
            | '!'
            | ','
            | ':'
            | ';'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '<'
            | '>'
            | '“'
            | '”'
            | '‘'
            | '’'
            | '"'
            | '\''
            | '`'
            | '…'
            | '*'
            | '•'
            | '&'
            | '#'
            | '~'
            | '-'
            | '«'
            | '»'
            | '„'
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    Word,
    Gap,
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    kind: PieceKind,
    start: usize,
    end: usize,
}

impl Piece {
    fn text<'s>(&self, span: &'s str) -> &'s str {
        &span[self.start..self.end]
    }
}

/// Splits a run into alternating words and gaps covering every byte.
fn split_pieces(span: &str) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut chars = span.char_indices().peekable();
    let mut prev: Option<char> = None;
    while let Some((idx, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        let kind = if is_boundary(ch, prev, next) {
            PieceKind::Gap
        } else {
            PieceKind::Word
        };
        let end = idx + ch.len_utf8();
        match pieces.last_mut() {
            Some(last) if last.kind == kind => last.end = end,
            _ => pieces.push(Piece {
                kind,
                start: idx,
                end,
            }),
        }
        prev = Some(ch);
    }
    pieces
}

fn is_boundary(ch: char, prev: Option<char>, next: Option<char>) -> bool {
    match ch {
        '–' | '—' => true,
        '-' => prev == Some('-') || next == Some('-'),
        c => c.is_whitespace(),
    }
}

/// Splits `text` into leading punctuation, core and trailing punctuation.
fn split_core(text: &str) -> (&str, &str, &str) {
    let rest = text.trim_start_matches(is_trim_char);
    let core = rest.trim_end_matches(is_trim_char);
    let prefix = &text[..text.len() - rest.len()];
    let suffix = &rest[core.len()..];
    (prefix, core, suffix)
}

/// Lowercased lookup key with whitespace runs collapsed to one space.
fn lookup_key(core: &str) -> String {
    let mut key = String::with_capacity(core.len());
    for (idx, word) in core.split_whitespace().enumerate() {
        if idx > 0 {
            key.push(' ');
        }
        key.push_str(word);
    }
    key.to_lowercase()
}

fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Result of looking a word or phrase up under the current options.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// Found and within the hint-level threshold.
    Hint(Resolution<'a>),
    /// Found, but its hint level is above the threshold.
    AboveThreshold(Resolution<'a>),
    Unknown,
}

impl<'a> Lookup<'a> {
    pub fn hint(self) -> Option<Resolution<'a>> {
        match self {
            Lookup::Hint(resolution) => Some(resolution),
            Lookup::AboveThreshold(_) | Lookup::Unknown => None,
        }
    }
}

/// A run of text with its annotations inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanAnnotation {
    pub text: String,
    pub report: AnnotationReport,
}

/// A match starting at some word: how many pieces of the run it covers and
/// what replaces them.
struct PhraseMatch {
    consumed: usize,
    words: usize,
    replacement: String,
}

pub struct Annotator<'a> {
    lexicon: &'a Lexicon,
    options: AnnotateOptions,
}

impl<'a> Annotator<'a> {
    pub fn new(lexicon: &'a Lexicon, options: AnnotateOptions) -> Self {
        Self { lexicon, options }
    }

    pub fn options(&self) -> AnnotateOptions {
        self.options
    }

    /// Looks up a raw word or phrase: punctuation is trimmed, case folded and
    /// whitespace collapsed before the dictionary and lemma map are consulted.
    pub fn lookup(&self, text: &str) -> Lookup<'a> {
        let (_, core, _) = split_core(text);
        if core.is_empty() {
            return Lookup::Unknown;
        }
        let lexicon: &'a Lexicon = self.lexicon;
        match lexicon.resolve(&lookup_key(core)) {
            Some(resolution) if self.options.hint_level.admits(resolution.record.hint_level) => {
                Lookup::Hint(resolution)
            }
            Some(resolution) => Lookup::AboveThreshold(resolution),
            None => Lookup::Unknown,
        }
    }

    /// Annotates one run of body text.
    pub fn annotate_span(&self, span: &str) -> SpanAnnotation {
        let pieces = split_pieces(span);
        let mut text = String::with_capacity(span.len());
        let mut report = AnnotationReport::default();
        let mut cursor = 0;
        while cursor < pieces.len() {
            let piece = pieces[cursor];
            let raw = piece.text(span);
            if piece.kind == PieceKind::Gap || !has_core(raw) {
                text.push_str(raw);
                cursor += 1;
                continue;
            }
            match self.match_at(span, &pieces, cursor) {
                Some(found) => {
                    text.push_str(&found.replacement);
                    report.words += found.words;
                    report.annotated += 1;
                    cursor += found.consumed;
                }
                None => {
                    text.push_str(raw);
                    report.words += 1;
                    cursor += 1;
                }
            }
        }
        SpanAnnotation { text, report }
    }

    /// Tries the word at `start` alone, then as the head of a phrase.
    fn match_at(&self, span: &str, pieces: &[Piece], start: usize) -> Option<PhraseMatch> {
        let head = pieces[start];
        if let Some(replacement) = self.render(head.text(span)) {
            return Some(PhraseMatch {
                consumed: 1,
                words: 1,
                replacement,
            });
        }

        let mut words = 1;
        let mut last = start;
        while words < MAX_PHRASE_WORDS {
            let (Some(gap), Some(word)) = (pieces.get(last + 1), pieces.get(last + 2)) else {
                break;
            };
            if !gap.text(span).chars().all(char::is_whitespace) {
                break;
            }
            debug_assert_eq!(word.kind, PieceKind::Word);
            last += 2;
            words += 1;
            if let Some(replacement) = self.render(&span[head.start..word.end]) {
                let covered = &pieces[start..=last];
                return Some(PhraseMatch {
                    consumed: covered.len(),
                    words: covered
                        .iter()
                        .filter(|p| p.kind == PieceKind::Word && has_core(p.text(span)))
                        .count(),
                    replacement,
                });
            }
        }
        None
    }

    /// Wraps the core of `text` in a ruby annotation when it has a hint.
    fn render(&self, text: &str) -> Option<String> {
        let resolution = self.lookup(text).hint()?;
        let (prefix, core, suffix) = split_core(text);
        let meaning = resolution.record.meaning(self.options.language);
        Some(format!(
            "{prefix}<ruby>{core}<rt>{}</rt></ruby>{suffix}",
            escape_markup(&meaning)
        ))
    }
}

fn has_core(text: &str) -> bool {
    !split_core(text).1.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HintLevel, Language};
    use crate::lexicon::test_support::{record, sample_lexicon};
    use crate::lexicon::{Dictionary, LemmaMap, MatchSource};

    fn options(level: u8) -> AnnotateOptions {
        AnnotateOptions::new(HintLevel::try_from(level).unwrap(), Language::English)
    }

    fn lexicon_of(records: Vec<crate::lexicon::HintRecord>) -> Lexicon {
        Lexicon::new(
            Dictionary::from_records(records).unwrap(),
            LemmaMap::default(),
        )
    }

    fn words_of(span: &str) -> Vec<&str> {
        split_pieces(span)
            .iter()
            .filter(|p| p.kind == PieceKind::Word)
            .map(|p| p.text(span))
            .collect()
    }

    #[test]
    fn pieces_split_on_spaces_dashes_and_hyphen_runs() {
        assert_eq!(
            words_of("-Disunion--WAND—warden. well-known – x---y"),
            vec!["-Disunion", "WAND", "warden.", "well-known", "x", "y"]
        );
        let span = "a  b";
        let gaps: Vec<_> = split_pieces(span)
            .iter()
            .filter(|p| p.kind == PieceKind::Gap)
            .map(|p| p.text(span))
            .collect();
        assert_eq!(gaps, vec!["  "]);
    }

    #[test]
    fn core_keeps_surrounding_punctuation_apart() {
        assert_eq!(split_core("{\"Lantern?\",..}"), ("{\"", "Lantern", "?\",..}"));
        assert_eq!(split_core("“don’t”"), ("“", "don’t", "”"));
        assert_eq!(split_core("?!"), ("?!", "", ""));
        assert_eq!(lookup_key("Fresh \n Water"), "fresh water");
    }

    #[test]
    fn punctuation_stays_outside_the_annotation() {
        let lexicon = sample_lexicon();
        let annotator = Annotator::new(&lexicon, options(5));
        let result = annotator.annotate_span("\"Lantern?\"");
        assert_eq!(
            result.text,
            "\"<ruby>Lantern<rt>a light carried by a handle</rt></ruby>?\""
        );
        assert_eq!(result.report, AnnotationReport::new(1, 1));
    }

    #[test]
    fn words_and_phrases_with_mixed_separators() {
        let lexicon = sample_lexicon();
        let annotator = Annotator::new(&lexicon, options(5));
        let result = annotator.annotate_span("- (Whole life insurance, workman---fresh water?]");
        assert_eq!(
            result.text,
            "- (<ruby>Whole life insurance<rt>a type of life insurance</rt></ruby>, \
             <ruby>workman<rt>a skilled worker</rt></ruby>---\
             <ruby>fresh water<rt>water that is not salty</rt></ruby>?]"
        );
        assert_eq!(result.report, AnnotationReport::new(6, 3));
    }

    #[test]
    fn shortest_phrase_wins() {
        let lexicon = lexicon_of(vec![
            record("hot dog", "a sausage in a bun", 5),
            record("hot dog stand", "a stall selling hot dogs", 5),
        ]);
        let annotator = Annotator::new(&lexicon, options(5));
        let result = annotator.annotate_span("a hot dog stand");
        assert_eq!(
            result.text,
            "a <ruby>hot dog<rt>a sausage in a bun</rt></ruby> stand"
        );
        assert_eq!(result.report, AnnotationReport::new(4, 1));
    }

    #[test]
    fn phrase_above_threshold_lets_the_search_continue() {
        let lexicon = lexicon_of(vec![
            record("hot dog", "a sausage in a bun", 4),
            record("hot dog stand", "a stall selling hot dogs", 1),
        ]);
        let annotator = Annotator::new(&lexicon, options(2));
        let result = annotator.annotate_span("hot dog stand.");
        assert_eq!(
            result.text,
            "<ruby>hot dog stand<rt>a stall selling hot dogs</rt></ruby>."
        );
        assert_eq!(result.report, AnnotationReport::new(3, 1));
    }

    #[test]
    fn phrases_are_bounded_to_five_words() {
        let lexicon = lexicon_of(vec![
            record("one two three four five", "five words", 5),
            record("one two three four five six", "six words", 5),
        ]);
        let annotator = Annotator::new(&lexicon, options(5));
        let five = annotator.annotate_span("one two three four five");
        assert_eq!(five.report, AnnotationReport::new(5, 1));

        let lexicon = lexicon_of(vec![record("one two three four five six", "six words", 5)]);
        let annotator = Annotator::new(&lexicon, options(5));
        let six = annotator.annotate_span("one two three four five six");
        assert_eq!(six.text, "one two three four five six");
        assert_eq!(six.report, AnnotationReport::new(6, 0));
    }

    #[test]
    fn phrases_do_not_cross_dash_gaps() {
        let lexicon = lexicon_of(vec![record("salt water", "sea water", 5)]);
        let annotator = Annotator::new(&lexicon, options(5));
        assert_eq!(annotator.annotate_span("salt—water").report.annotated, 0);
        assert_eq!(annotator.annotate_span("salt  water").report.annotated, 1);
    }

    #[test]
    fn hint_threshold_filters_records() {
        let lexicon = lexicon_of(vec![record("ephemeral", "lasting a short time", 2)]);
        let strict = Annotator::new(&lexicon, options(1));
        let result = strict.annotate_span("ephemeral");
        assert_eq!(result.text, "ephemeral");
        assert_eq!(result.report, AnnotationReport::new(1, 0));
        assert!(matches!(strict.lookup("ephemeral"), Lookup::AboveThreshold(_)));

        let lenient = Annotator::new(&lexicon, options(5));
        assert_eq!(lenient.annotate_span("ephemeral").report.annotated, 1);
    }

    #[test]
    fn raising_the_threshold_never_loses_single_word_hints() {
        let lexicon = lexicon_of(vec![
            record("alpha", "a", 1),
            record("beta", "b", 2),
            record("gamma", "g", 3),
            record("delta", "d", 4),
            record("epsilon", "e", 5),
        ]);
        let span = "alpha, beta; gamma delta (epsilon)";
        let mut previous = 0;
        for level in 1..=5 {
            let annotated = Annotator::new(&lexicon, options(level))
                .annotate_span(span)
                .report
                .annotated;
            assert!(annotated >= previous, "level {level}");
            previous = annotated;
        }
    }

    // A word admitted at a higher level claims the position, so a phrase that
    // started there and a later phrase that depended on it are both lost.
    #[test]
    fn admitted_word_can_displace_overlapping_phrases() {
        let lexicon = lexicon_of(vec![
            record("a", "word a", 3),
            record("a b", "phrase ab", 1),
            record("c", "word c", 1),
            record("d", "word d", 1),
            record("b c d", "phrase bcd", 1),
        ]);
        let span = "a b c d";

        let strict = Annotator::new(&lexicon, options(1)).annotate_span(span);
        assert_eq!(
            strict.text,
            "<ruby>a b<rt>phrase ab</rt></ruby> <ruby>c<rt>word c</rt></ruby> <ruby>d<rt>word d</rt></ruby>"
        );
        assert_eq!(strict.report, AnnotationReport::new(4, 3));

        let lenient = Annotator::new(&lexicon, options(3)).annotate_span(span);
        assert_eq!(
            lenient.text,
            "<ruby>a<rt>word a</rt></ruby> <ruby>b c d<rt>phrase bcd</rt></ruby>"
        );
        assert_eq!(lenient.report, AnnotationReport::new(4, 2));
    }

    #[test]
    fn inflected_form_uses_lemma_record() {
        let lexicon = sample_lexicon();
        let annotator = Annotator::new(&lexicon, options(5));
        let result = annotator.annotate_span("He Ran.");
        assert_eq!(
            result.text,
            "He <ruby>Ran<rt>move fast on foot</rt></ruby>."
        );
        let resolution = annotator.lookup("Ran.").hint().expect("resolves");
        assert_eq!(resolution.source, MatchSource::Lemma("run"));
    }

    #[test]
    fn secondary_language_prefixes_phoneme() {
        let lexicon = sample_lexicon();
        let annotator = Annotator::new(
            &lexicon,
            AnnotateOptions::new(HintLevel::MAX, Language::Vietnamese),
        );
        assert_eq!(
            annotator.annotate_span("obfuscate!").text,
            "<ruby>obfuscate<rt>/ˈɒbfəskeɪt/ làm khó hiểu</rt></ruby>!"
        );
    }

    #[test]
    fn meanings_are_escaped() {
        let lexicon = lexicon_of(vec![record("lt", "the < sign & friends", 5)]);
        let annotator = Annotator::new(&lexicon, options(5));
        assert_eq!(
            annotator.annotate_span("lt").text,
            "<ruby>lt<rt>the &lt; sign &amp; friends</rt></ruby>"
        );
    }

    #[test]
    fn punctuation_only_tokens_are_not_words() {
        let lexicon = sample_lexicon();
        let annotator = Annotator::new(&lexicon, options(5));
        let result = annotator.annotate_span(" … -- ?! ");
        assert_eq!(result.text, " … -- ?! ");
        assert_eq!(result.report, AnnotationReport::default());
    }
}
