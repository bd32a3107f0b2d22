use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use crate::annotator::Annotator;
use crate::convert::{Converter, DUMP_NAME, HTML_DOCUMENT, METADATA_DOCUMENT};
use crate::error::WordwiseError;
use crate::report::{AnnotationReport, ScanProgress};
use crate::scanner::annotate_document_with_progress;
use crate::title::patch_title_file;

const OUTPUT_SUFFIX: &str = "-wordwise";

/// One book going through extract, annotate, retitle and rebuild. The
/// working directory is private to the job and removed when it is dropped.
pub struct BookJob {
    input: PathBuf,
    output: PathBuf,
    converter: Converter,
    workdir: TempDir,
}

impl BookJob {
    /// `format` overrides the output extension; by default the input's is
    /// kept.
    pub fn new(
        input: &Path,
        format: Option<&str>,
        converter: Converter,
    ) -> Result<Self, WordwiseError> {
        if !input.is_file() {
            return Err(WordwiseError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        let workdir = tempfile::Builder::new()
            .prefix("wordwise-")
            .tempdir()
            .map_err(WordwiseError::Workspace)?;
        Ok(Self {
            input: input.to_path_buf(),
            output: output_path(input, format),
            converter,
            workdir,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn html_path(&self) -> PathBuf {
        self.workdir.path().join(DUMP_NAME).join(HTML_DOCUMENT)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.workdir.path().join(DUMP_NAME).join(METADATA_DOCUMENT)
    }

    pub fn extract(&self) -> Result<PathBuf, WordwiseError> {
        info!(input = %self.input.display(), "converting book to HTML");
        Ok(self.converter.extract_html(&self.input, self.workdir.path())?)
    }

    pub fn annotate<P>(
        &self,
        annotator: &Annotator<'_>,
        progress: P,
    ) -> Result<AnnotationReport, WordwiseError>
    where
        P: ScanProgress,
    {
        let html = self.html_path();
        annotate_html_file(&html, &html, annotator, progress)
    }

    /// Marks the book title; failures are ignored.
    pub fn patch_title(&self) -> bool {
        let patched = patch_title_file(&self.metadata_path());
        if !patched {
            warn!("book title left unchanged");
        }
        patched
    }

    pub fn rebuild(&self) -> Result<&Path, WordwiseError> {
        info!(output = %self.output.display(), "building annotated book");
        self.converter
            .build_book(&self.html_path(), &self.metadata_path(), &self.output)?;
        Ok(&self.output)
    }
}

/// `<dir>/<stem>-wordwise.<ext>` next to the input.
pub fn output_path(input: &Path, format: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_else(|| OsStr::new("book"))
        .to_string_lossy();
    let extension = format
        .map(|format| format.trim_start_matches('.').to_string())
        .filter(|format| !format.is_empty())
        .or_else(|| {
            input
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        });
    let file_name = match extension {
        Some(extension) => format!("{stem}{OUTPUT_SUFFIX}.{extension}"),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

/// Annotates the HTML document at `input` and writes it to `output`, which
/// may be the same path.
pub fn annotate_html_file<P>(
    input: &Path,
    output: &Path,
    annotator: &Annotator<'_>,
    progress: P,
) -> Result<AnnotationReport, WordwiseError>
where
    P: ScanProgress,
{
    let html = fs::read_to_string(input).map_err(|source| WordwiseError::Document {
        path: input.to_path_buf(),
        source,
    })?;
    let document = annotate_document_with_progress(&html, annotator, progress);
    fs::write(output, document.html).map_err(|source| WordwiseError::Document {
        path: output.to_path_buf(),
        source,
    })?;
    info!(
        words = document.report.words,
        annotated = document.report.annotated,
        "processed {} words, annotated {}",
        document.report.words,
        document.report.annotated
    );
    Ok(document.report)
}
