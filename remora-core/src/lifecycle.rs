//! The transcode lifecycle: hook execution, logger swapping, error
//! translation, and the atomic replace primitive.
//!
//! Every invocation runs before → body → (after | rescue) → ensure, with
//! the engine-logger restoration and the ensure hook guaranteed on every
//! exit path. Hook failures are logged and swallowed; they never mask the
//! body's outcome. A failing body surfaces as exactly one error shape,
//! `TranscodeFailed`, with the original error as its cause.

use crate::error::{CoreError, CoreResult};
use crate::logging;
use crate::model::TranscodeHost;
use crate::options::EncodingOptions;
use std::error::Error as _;
use std::fs;
use std::path::Path;

/// One lifecycle invocation. Never shared across concurrent transcodes.
pub struct TranscodeLifecycle<'a> {
    host: &'a dyn TranscodeHost,
    options: &'a EncodingOptions,
}

impl<'a> TranscodeLifecycle<'a> {
    pub fn new(host: &'a dyn TranscodeHost, options: &'a EncodingOptions) -> Self {
        Self { host, options }
    }

    /// Runs `body` inside the full hook/logger scope.
    pub fn run<T>(&self, body: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        let logger = self.options.logger(self.host);
        let swapped = logger
            .as_ref()
            .map(|sink| logging::set_engine_logger(Some(sink.clone())));

        self.fire("before_transcode", self.options.raw.callbacks.before_transcode.as_deref());

        let result = match body() {
            Ok(value) => {
                self.fire("after_transcode", self.options.raw.callbacks.after_transcode.as_deref());
                Ok(value)
            }
            Err(err) => {
                self.fire("rescue", self.options.raw.callbacks.rescue.as_deref());

                if let Some(sink) = &logger {
                    sink.error(&format!("transcode failed: {err}"));
                    let mut cause = err.source();
                    while let Some(inner) = cause {
                        sink.error(&format!("caused by: {inner}"));
                        cause = inner.source();
                    }
                }
                log::error!("Transcode of format `{}` failed: {err}", self.options.format);

                Err(err.into_transcode_failed())
            }
        };

        // Both run on every exit path, logger first so ensure-hook output
        // lands in the caller's original sink.
        if let Some(previous) = swapped {
            logging::set_engine_logger(previous);
        }
        self.fire("ensure", self.options.raw.callbacks.ensure.as_deref());

        result
    }

    /// Best-effort hook dispatch: failures are logged and swallowed.
    fn fire(&self, slot: &str, hook: Option<&str>) {
        let Some(name) = hook else { return };
        if let Err(err) = self.host.run_hook(name, &self.options.format, &self.options.raw) {
            log::warn!("{slot} hook `{name}` failed: {err}");
        }
    }
}

/// Atomically swaps the finished temp file into the source location.
///
/// A single rename, never copy+delete, so no partial file is ever visible
/// at the destination. Requires both paths to live on one filesystem,
/// which holds for the sibling temp paths this crate creates.
pub fn atomic_replace(tmp: &Path, destination: &Path) -> CoreResult<()> {
    fs::rename(tmp, destination).map_err(CoreError::Io)?;
    log::debug!(
        "Replaced {} with transcoded output",
        destination.display()
    );
    Ok(())
}
