use std::io;
use std::path::PathBuf;

/// Failures while turning resource files into a lexicon. All of them abort the
/// run before any document is touched.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} contains no records", path.display())]
    Empty { path: PathBuf },
    #[error("failed to build lexeme index: {0}")]
    Index(#[from] fst::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(
        "cannot run `{program}`. Install Calibre and check that `ebook-convert` works in your shell; \
         it is required to read and write e-books"
    )]
    NotInstalled { program: String },
    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "the converter produced no output at {}. Check that Calibre's `ebook-convert` is installed and can read the book",
        path.display()
    )]
    MissingOutput { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum WordwiseError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("file at {} is not found", path.display())]
    InputNotFound { path: PathBuf },
    #[error("failed to access document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare working directory: {0}")]
    Workspace(#[source] io::Error),
}
