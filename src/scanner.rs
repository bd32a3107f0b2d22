//! Single pass over an HTML document that hands every run of body text to
//! the [`Annotator`] and copies everything else through unchanged.

use crate::annotator::Annotator;
use crate::markup::{Segment, Segments, is_body_tag};
use crate::report::{AnnotationReport, NoProgress, ScanProgress};

/// Per-document scan state. Text is only annotated once a `<body` tag has
/// been seen, so the head, doctype and title stay untouched.
#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    seen_body: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDocument {
    pub html: String,
    pub report: AnnotationReport,
}

pub fn annotate_document(html: &str, annotator: &Annotator<'_>) -> AnnotatedDocument {
    annotate_document_with_progress(html, annotator, NoProgress)
}

/// Like [`annotate_document`], reporting the byte offset of each annotated
/// run to `progress`.
pub fn annotate_document_with_progress<P>(
    html: &str,
    annotator: &Annotator<'_>,
    mut progress: P,
) -> AnnotatedDocument
where
    P: ScanProgress,
{
    let total = html.len();
    let mut state = ScanState::default();
    let mut out = String::with_capacity(total + total / 4);
    let mut report = AnnotationReport::default();

    for (offset, segment) in Segments::new(html) {
        match segment {
            Segment::Text(text) if state.seen_body && !text.trim().is_empty() => {
                let annotated = annotator.annotate_span(text);
                out.push_str(&annotated.text);
                report += annotated.report;
                progress.report(offset, total);
            }
            Segment::Tag(tag) => {
                if !state.seen_body && is_body_tag(tag) {
                    state.seen_body = true;
                }
                segment.write_raw(&mut out);
            }
            Segment::Text(_) | Segment::Trailing(_) => segment.write_raw(&mut out),
        }
    }
    progress.report(total, total);

    AnnotatedDocument { html: out, report }
}
