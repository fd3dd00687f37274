//! Local-file implementations of the core's collaborator traits.

use remora_core::{CoreError, CoreResult, Uploader};
use std::path::{Path, PathBuf};

/// An `Uploader` over a plain local file: always cached, never fetched.
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn open(path: PathBuf) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::InvalidOptions(format!(
                "input file {} does not exist",
                path.display()
            )));
        }
        Ok(Self { path })
    }
}

impl Uploader for LocalFile {
    fn cached(&self) -> bool {
        true
    }

    fn cache_stored_file(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn current_path(&self) -> &Path {
        &self.path
    }
}
