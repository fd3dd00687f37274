//! The single-format encode operations.

use crate::config;
use crate::error::CoreResult;
use crate::external::{self, engine, theora::TheoraTranscoder};
use crate::lifecycle::{self, TranscodeLifecycle};
use crate::model::{TranscodeHost, Uploader};
use crate::options::{EncodingOptions, RawOptions};
use crate::probe::{self, MediaProbe};

/// Encodes the uploader's current file into `format`, replacing it in
/// place on success.
///
/// Options are validated before anything else runs; sentinel settings are
/// resolved against a probe of the source before the engine is invoked;
/// the whole transcode runs inside the hook/logger lifecycle; and the
/// source is only ever replaced by an atomic rename of the finished
/// output.
pub fn encode_video<U: Uploader, H: TranscodeHost>(
    uploader: &mut U,
    host: &H,
    format: &str,
    raw: RawOptions,
) -> CoreResult<()> {
    raw.validate(format, host)?;
    super::ensure_cached(uploader)?;
    let source = uploader.current_path().to_path_buf();

    // Probe when a sentinel needs resolving or a progress sink needs the
    // duration to turn engine timestamps into fractions.
    let probed: Option<MediaProbe> = if raw.needs_probe() || raw.progress.is_configured() {
        Some(probe::probe(&source)?)
    } else {
        None
    };

    let options = EncodingOptions::build(format, raw, host, probed.as_ref())?;
    let tmp_path = super::temp_sibling(&source, format);

    external::check_dependency(&config::ffmpeg_binary())?;

    let duration = probed.as_ref().and_then(|p| p.duration_secs);
    let progress = options.progress(host);

    TranscodeLifecycle::new(host, &options).run(|| {
        engine::run_transcode(&source, &tmp_path, &options, duration, progress.as_ref())?;
        lifecycle::atomic_replace(&tmp_path, &source)
    })
}

/// Encodes the uploader's current file to Theora/ogv via the dedicated
/// external tool, replacing it in place on success.
pub fn encode_theora<U: Uploader, H: TranscodeHost>(
    uploader: &mut U,
    host: &H,
    raw: RawOptions,
) -> CoreResult<()> {
    raw.validate("ogv", host)?;
    super::ensure_cached(uploader)?;
    let source = uploader.current_path().to_path_buf();

    let options = EncodingOptions::build("ogv", raw, host, None)?;
    let tmp_path = super::temp_sibling(&source, "ogv");

    external::check_dependency(&config::theora_binary())?;

    let logger = options.logger(host);

    TranscodeLifecycle::new(host, &options).run(|| {
        TheoraTranscoder::new(&source, &tmp_path).run(logger.as_ref())?;
        lifecycle::atomic_replace(&tmp_path, &source)
    })
}
