//! The content-replacement pipeline.
//!
//! Five strictly sequential stages over the same engine used for plain
//! encodes: demux the audio track, re-encode a video-only stream, hand
//! that stream to the external replacement tool, remux with the original
//! audio, and atomically swap the result over the source. Stages share
//! temporary sibling files of the source.

use crate::config;
use crate::error::CoreResult;
use crate::external::{self, engine, replacer::ReplacementTool};
use crate::lifecycle::{self, TranscodeLifecycle};
use crate::model::{TranscodeHost, Uploader};
use crate::options::{EncodingOptions, RawOptions, ReplacementRef};
use std::fs;
use std::path::{Path, PathBuf};

/// Runs the replacement pipeline against the uploader's current file.
///
/// The replacement reference is either a literal path or the current path
/// of a named sibling attachment on the host. When neither resolves to a
/// present file the pipeline is deliberately a no-op, not an error.
pub fn replace_video<U: Uploader, H: TranscodeHost>(
    uploader: &mut U,
    host: &H,
    format: &str,
    raw: RawOptions,
) -> CoreResult<()> {
    raw.validate(format, host)?;

    let Some(reference) = resolve_reference(raw.replacement.as_ref(), host) else {
        log::debug!("No replacement reference resolves to a present file; skipping");
        return Ok(());
    };

    super::ensure_cached(uploader)?;
    let source = uploader.current_path().to_path_buf();
    let options = EncodingOptions::build(format, raw, host, None)?;

    external::check_dependency(&config::ffmpeg_binary())?;

    let audio_path = super::temp_sibling(&source, "mp3");
    let video_only_path = super::temp_sibling(&source, "avi");
    let replaced_path = source.with_file_name("replacement_tmp.avi");
    let result_path = super::temp_sibling(&source, "mp4");

    TranscodeLifecycle::new(host, &options).run(|| {
        engine::run_stage(&source, &audio_path, &["-vn"])?;
        engine::run_stage(&source, &video_only_path, &["-an", "-c:v", "libx264"])?;
        ReplacementTool::run(&video_only_path, &reference, &replaced_path)?;
        engine::run_remux(&replaced_path, &audio_path, &result_path)?;
        lifecycle::atomic_replace(&result_path, &source)?;

        if options.raw.cleanup_intermediates {
            cleanup(&[&audio_path, &video_only_path, &replaced_path]);
        }
        Ok(())
    })
}

/// Resolves the configured replacement reference to an existing path.
fn resolve_reference(
    reference: Option<&ReplacementRef>,
    host: &dyn TranscodeHost,
) -> Option<PathBuf> {
    let path = match reference? {
        ReplacementRef::Path(path) => path.clone(),
        ReplacementRef::Attachment { attachment } => host.attachment_path(attachment)?,
    };
    path.exists().then_some(path)
}

/// Best-effort removal of intermediate artifacts after a successful swap.
fn cleanup(paths: &[&Path]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            log::debug!("Could not remove intermediate {}: {err}", path.display());
        }
    }
}
