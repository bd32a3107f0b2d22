use std::fs;
use std::path::Path;

use tracing::debug;

use crate::markup::{Segment, Segments};

pub const TITLE_TAG: &str = "dc:title";
pub const TITLE_SUFFIX: &str = " - Wordwise";

/// Appends [`TITLE_SUFFIX`] to the text of every `<dc:title>` element.
pub fn patch_title(metadata: &str) -> String {
    let mut out = String::with_capacity(metadata.len() + TITLE_SUFFIX.len());
    let mut after_title = false;
    for (_, segment) in Segments::new(metadata) {
        match segment {
            Segment::Tag(tag) => {
                if after_title {
                    out.push_str(TITLE_SUFFIX);
                }
                after_title = tag == TITLE_TAG;
            }
            Segment::Text(_) | Segment::Trailing(_) => {}
        }
        segment.write_raw(&mut out);
    }
    out
}

/// Rewrites the metadata file in place. The title is cosmetic, so a file
/// that cannot be read or written is skipped and `false` returned.
pub fn patch_title_file(path: &Path) -> bool {
    let metadata = match fs::read_to_string(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping title patch");
            return false;
        }
    };
    match fs::write(path, patch_title(&metadata)) {
        Ok(()) => true,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to write patched title");
            false
        }
    }
}
