//! Calibre's `ebook-convert`, used to unpack a book into HTML and to build the
//! annotated book back from it.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::ConvertError;

pub const CONVERTER_NAME: &str = "ebook-convert";
const MACOS_CONVERTER: &str = "/Applications/calibre.app/Contents/MacOS/ebook-convert";

/// Name of the intermediate book inside the working directory.
pub const DUMP_NAME: &str = "book_dump";
pub const HTML_DOCUMENT: &str = "index1.html";
pub const METADATA_DOCUMENT: &str = "content.opf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    program: PathBuf,
}

impl Converter {
    /// Uses an explicit program path, which must exist.
    pub fn with_program(program: impl Into<PathBuf>) -> Result<Self, ConvertError> {
        let program = program.into();
        if program.is_file() {
            Ok(Self { program })
        } else if let Some(found) = find_on_path(program.as_os_str()) {
            Ok(Self { program: found })
        } else {
            Err(ConvertError::NotInstalled {
                program: program.display().to_string(),
            })
        }
    }

    /// Finds `ebook-convert` on `PATH`, falling back to the macOS app bundle.
    pub fn locate() -> Result<Self, ConvertError> {
        find_on_path(OsStr::new(CONVERTER_NAME))
            .or_else(|| {
                let bundled = PathBuf::from(MACOS_CONVERTER);
                bundled.is_file().then_some(bundled)
            })
            .map(|program| Self { program })
            .ok_or_else(|| ConvertError::NotInstalled {
                program: CONVERTER_NAME.to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Unpacks `input` into `<workdir>/book_dump/` and returns the path of the
    /// HTML document, which must exist afterwards.
    pub fn extract_html(&self, input: &Path, workdir: &Path) -> Result<PathBuf, ConvertError> {
        let packed = workdir.join(format!("{DUMP_NAME}.htmlz"));
        let unpacked = workdir.join(DUMP_NAME);
        self.run([input.as_os_str(), packed.as_os_str()])?;
        self.run([packed.as_os_str(), unpacked.as_os_str()])?;

        let html = unpacked.join(HTML_DOCUMENT);
        if html.is_file() {
            Ok(html)
        } else {
            Err(ConvertError::MissingOutput { path: html })
        }
    }

    /// Builds `output` from the annotated HTML and its metadata document.
    pub fn build_book(
        &self,
        html: &Path,
        metadata: &Path,
        output: &Path,
    ) -> Result<(), ConvertError> {
        self.run([
            html.as_os_str(),
            output.as_os_str(),
            OsStr::new("-m"),
            metadata.as_os_str(),
        ])?;
        if output.is_file() {
            Ok(())
        } else {
            Err(ConvertError::MissingOutput {
                path: output.to_path_buf(),
            })
        }
    }

    /// Runs the converter. A failing exit status is only logged; callers
    /// check for the files they expect instead.
    fn run<I, S>(&self, args: I) -> Result<(), ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args);
        debug!(command = ?command, "running converter");
        let output = command.output().map_err(|source| ConvertError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !output.status.success() {
            warn!(
                command = ?command,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "converter exited with an error"
            );
        }
        Ok(())
    }
}

fn find_on_path(name: &OsStr) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
