use std::ops::AddAssign;

use serde::Serialize;

/// Words seen and words annotated. A matched phrase counts once towards
/// `annotated` and once per constituent word towards `words`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub words: usize,
    pub annotated: usize,
}

impl AnnotationReport {
    pub fn new(words: usize, annotated: usize) -> Self {
        Self { words, annotated }
    }
}

impl AddAssign for AnnotationReport {
    fn add_assign(&mut self, rhs: Self) {
        self.words += rhs.words;
        self.annotated += rhs.annotated;
    }
}

/// Receives the scanner's approximate byte offset while a document is
/// processed. Implemented for any `FnMut(offset, total)`.
pub trait ScanProgress {
    fn report(&mut self, offset: usize, total: usize);
}

impl<F> ScanProgress for F
where
    F: FnMut(usize, usize),
{
    fn report(&mut self, offset: usize, total: usize) {
        self(offset, total)
    }
}

/// Progress sink that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn report(&mut self, _offset: usize, _total: usize) {}
}
