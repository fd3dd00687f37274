//! Capability traits for the two external collaborators: the uploader that
//! owns file storage, and the host model that owns hooks and sinks.

use crate::error::CoreResult;
use crate::logging::LogSink;
use crate::options::RawOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fractional-completion callback, invoked with values in `[0.0, 1.0]`.
///
/// Callbacks run synchronously on the encoding thread; a slow callback
/// stalls the encode.
pub type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;

/// The file-attachment abstraction that owns storage of the asset.
///
/// Remora only ever reads the current path, writes temporary siblings next
/// to it, and renames one of them over the original.
pub trait Uploader {
    /// Whether the stored file is already available at `current_path`.
    fn cached(&self) -> bool;

    /// Makes the stored file available locally. Called exactly once at the
    /// start of an operation when `cached()` is false.
    fn cache_stored_file(&mut self) -> CoreResult<()>;

    /// Path of the locally available file.
    fn current_path(&self) -> &Path;
}

/// The model object owning the attachment.
///
/// Hooks, log sinks, progress sinks, and sibling attachments are looked up
/// by name. Every method has a no-op default so hosts implement only the
/// capabilities they actually provide. Hook presence is checked when
/// options are built, so a configured-but-missing hook fails fast instead
/// of at call time.
pub trait TranscodeHost {
    /// Whether the host defines the named hook.
    fn has_hook(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Invokes the named hook with the target format and the raw options.
    fn run_hook(&self, name: &str, format: &str, raw: &RawOptions) -> CoreResult<()> {
        let _ = (name, format, raw);
        Ok(())
    }

    /// Resolves a named log sink on the host.
    fn logger(&self, name: &str) -> Option<Arc<dyn LogSink>> {
        let _ = name;
        None
    }

    /// Resolves a named progress sink on the host.
    fn progress(&self, name: &str) -> Option<ProgressFn> {
        let _ = name;
        None
    }

    /// Resolves a named sibling attachment to its current path.
    fn attachment_path(&self, name: &str) -> Option<PathBuf> {
        let _ = name;
        None
    }
}

/// A host with no hooks, sinks, or sibling attachments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl TranscodeHost for NullHost {}
