//! Process-wide configuration knobs.
//!
//! The three external binaries remora drives are resolved through settable
//! process-wide paths, so deployments can point at vendored builds without
//! touching PATH. Defaults match the conventional binary names.

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Default name of the general-purpose transcoding engine.
pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

/// Default name of the single-purpose Theora transcoder.
pub const DEFAULT_THEORA_BINARY: &str = "ffmpeg2theora";

/// Default name of the content-replacement tool.
pub const DEFAULT_REPLACEMENT_BINARY: &str = "chbg";

static FFMPEG_BINARY: Lazy<RwLock<String>> =
    Lazy::new(|| RwLock::new(DEFAULT_FFMPEG_BINARY.to_string()));
static THEORA_BINARY: Lazy<RwLock<String>> =
    Lazy::new(|| RwLock::new(DEFAULT_THEORA_BINARY.to_string()));
static REPLACEMENT_BINARY: Lazy<RwLock<String>> =
    Lazy::new(|| RwLock::new(DEFAULT_REPLACEMENT_BINARY.to_string()));

fn read(slot: &RwLock<String>) -> String {
    slot.read().map(|s| s.clone()).unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

fn write(slot: &RwLock<String>, value: String) {
    match slot.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// Path of the ffmpeg binary used for encode, demux, and remux stages.
pub fn ffmpeg_binary() -> String {
    read(&FFMPEG_BINARY)
}

pub fn set_ffmpeg_binary(binary: impl Into<String>) {
    write(&FFMPEG_BINARY, binary.into());
}

/// Path of the ffmpeg2theora-equivalent binary used by the ogv encode path.
pub fn theora_binary() -> String {
    read(&THEORA_BINARY)
}

pub fn set_theora_binary(binary: impl Into<String>) {
    write(&THEORA_BINARY, binary.into());
}

/// Path of the content-replacement tool invoked by the replacement pipeline.
pub fn replacement_binary() -> String {
    read(&REPLACEMENT_BINARY)
}

pub fn set_replacement_binary(binary: impl Into<String>) {
    write(&REPLACEMENT_BINARY, binary.into());
}
