//! Core library for attachment-oriented media transcoding.
//!
//! Remora drives external encoder processes against a file owned by an
//! uploader abstraction: it normalizes user options against per-format
//! defaults, relays engine progress, wraps each transcode in a
//! before/after/rescue/ensure hook lifecycle with per-invocation logger
//! scoping, and atomically replaces the source file with the finished
//! output. A secondary pipeline demuxes audio, re-encodes the video
//! stream, runs an external content-replacement tool, and remuxes.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use remora_core::{encode_video, RawOptions, Resolution, Uploader, NullHost};
//! use remora_core::CoreResult;
//! use std::path::{Path, PathBuf};
//!
//! struct LocalFile(PathBuf);
//!
//! impl Uploader for LocalFile {
//!     fn cached(&self) -> bool { true }
//!     fn cache_stored_file(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn current_path(&self) -> &Path { &self.0 }
//! }
//!
//! let mut file = LocalFile(PathBuf::from("/uploads/cache/clip.mov"));
//! let options = RawOptions {
//!     resolution: Some(Resolution::SameAsSource),
//!     ..RawOptions::default()
//! };
//! encode_video(&mut file, &NullHost, "mp4", options).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod options;
pub mod probe;
pub mod processing;
pub mod utils;

// Re-exports for the public API
pub use error::{CoreError, CoreResult};
pub use lifecycle::{TranscodeLifecycle, atomic_replace};
pub use logging::{FacadeSink, LogSink, engine_logger, set_engine_logger};
pub use model::{NullHost, ProgressFn, TranscodeHost, Uploader};
pub use options::{
    Bitrate, Callbacks, EncodingOptions, LoggerSpec, ProgressSpec, RawOptions, ReplacementRef,
    Resolution, Watermark, WatermarkPosition,
};
pub use probe::{MediaProbe, probe};
pub use processing::{encode_theora, encode_video, replace_video};
pub use utils::{format_duration_seconds, parse_ffmpeg_time};
