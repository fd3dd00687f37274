//! Top-level transcode operations over an uploader-owned file.

mod encode;
mod replace;

pub use encode::{encode_theora, encode_video};
pub use replace::replace_video;

use crate::error::CoreResult;
use crate::model::Uploader;
use std::path::{Path, PathBuf};

/// Caches the stored file locally if it is not already, exactly once per
/// operation.
fn ensure_cached(uploader: &mut impl Uploader) -> CoreResult<()> {
    if !uploader.cached() {
        uploader.cache_stored_file()?;
    }
    Ok(())
}

/// Temporary sibling of `source` named `tmpfile.<extension>`.
///
/// Names are fixed per attachment: two concurrent transcodes of the same
/// attachment collide on them. That hazard is inherited and not locked
/// against.
fn temp_sibling(source: &Path, extension: &str) -> PathBuf {
    source.with_file_name(format!("tmpfile.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sibling_stays_in_source_directory() {
        let source = PathBuf::from("/uploads/cache/video.mov");
        assert_eq!(
            temp_sibling(&source, "mp4"),
            PathBuf::from("/uploads/cache/tmpfile.mp4")
        );
    }
}
