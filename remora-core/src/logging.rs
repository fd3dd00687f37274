//! Engine log sinks and the process-wide engine-logger slot.
//!
//! The transcode lifecycle can install a per-invocation sink that receives
//! every line the external engine emits, restoring the previous sink when
//! the invocation ends. The slot is process-wide shared state: two
//! transcodes running concurrently in one process will race on it, and one
//! invocation's sink can receive lines belonging to the other. Callers that
//! need isolation must serialize transcodes per process or install sinks
//! that tolerate interleaved output.

use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

/// A line-oriented destination for engine output.
pub trait LogSink: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}

/// Forwards engine lines to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn info(&self, line: &str) {
        log::info!(target: "remora::engine", "{line}");
    }

    fn error(&self, line: &str) {
        log::error!(target: "remora::engine", "{line}");
    }
}

static ENGINE_LOGGER: Lazy<RwLock<Option<Arc<dyn LogSink>>>> = Lazy::new(|| RwLock::new(None));

/// Installs `next` as the engine logger, returning whatever was installed
/// before so the caller can restore it.
pub fn set_engine_logger(next: Option<Arc<dyn LogSink>>) -> Option<Arc<dyn LogSink>> {
    match ENGINE_LOGGER.write() {
        Ok(mut guard) => std::mem::replace(&mut *guard, next),
        Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
    }
}

/// The currently installed engine logger, if any.
pub fn engine_logger() -> Option<Arc<dyn LogSink>> {
    match ENGINE_LOGGER.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Relays one engine output line to the active sink, falling back to the
/// `log` facade at debug level when no sink is installed.
pub(crate) fn engine_line(line: &str, is_error: bool) {
    match engine_logger() {
        Some(sink) if is_error => sink.error(line),
        Some(sink) => sink.info(line),
        None if is_error => log::warn!(target: "remora::engine", "{line}"),
        None => log::debug!(target: "remora::engine", "{line}"),
    }
}
