//! FFmpeg engine invocation for a single input/output path pair.
//!
//! Events are drained on the calling thread: progress events become
//! fractional completion values forwarded synchronously to the progress
//! sink, log and error lines are relayed to the active engine log sink,
//! and the trailing error output is retained for failure reporting.

use crate::config;
use crate::error::{CoreError, CoreResult};
use crate::logging;
use crate::model::ProgressFn;
use crate::options::EncodingOptions;
use crate::utils::parse_ffmpeg_time;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::path::Path;

const STDERR_TAIL_LINES: usize = 15;

/// Builds the engine command for a normalized option set.
pub fn build_transcode_command(
    input: &Path,
    output: &Path,
    options: &EncodingOptions,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new_with_path(config::ffmpeg_binary());
    cmd.hide_banner();
    cmd.overwrite();
    cmd.input(input.to_string_lossy().as_ref());
    for arg in options.format_params() {
        cmd.arg(arg);
    }
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Builds an engine command with a fixed argument list, for the pipeline
/// stages that do not go through option normalization.
pub fn build_stage_command(input: &Path, output: &Path, args: &[&str]) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new_with_path(config::ffmpeg_binary());
    cmd.hide_banner();
    cmd.overwrite();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(args.iter().copied());
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Builds the remux command joining a video-only stream with a previously
/// extracted audio track, stream-copying both.
pub fn build_remux_command(video: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new_with_path(config::ffmpeg_binary());
    cmd.hide_banner();
    cmd.overwrite();
    cmd.input(video.to_string_lossy().as_ref());
    cmd.input(audio.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0", "-map", "1:a:0", "-c", "copy"]);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Runs the engine for one encode, relaying progress to `progress_sink`.
///
/// The destination directory must exist and be writable before anything is
/// spawned. `duration_secs` is the probed source duration used to turn
/// engine timestamps into fractions; without it no progress is reported.
pub fn run_transcode(
    input: &Path,
    output: &Path,
    options: &EncodingOptions,
    duration_secs: Option<f64>,
    progress_sink: Option<&ProgressFn>,
) -> CoreResult<()> {
    super::ensure_destination_writable(output)?;

    log::info!(
        "Starting encode: {} -> {} ({})",
        input.display(),
        output.display(),
        options.format
    );
    let cmd = build_transcode_command(input, output, options);
    execute(cmd, duration_secs, progress_sink)
}

/// Runs one fixed-argument pipeline stage (demux, video-only re-encode).
pub(crate) fn run_stage(input: &Path, output: &Path, args: &[&str]) -> CoreResult<()> {
    super::ensure_destination_writable(output)?;

    log::debug!(
        "Running engine stage {:?}: {} -> {}",
        args,
        input.display(),
        output.display()
    );
    execute(build_stage_command(input, output, args), None, None)
}

/// Remuxes a replaced video stream with the original audio track.
pub(crate) fn run_remux(video: &Path, audio: &Path, output: &Path) -> CoreResult<()> {
    super::ensure_destination_writable(output)?;

    log::debug!(
        "Remuxing {} + {} -> {}",
        video.display(),
        audio.display(),
        output.display()
    );
    execute(build_remux_command(video, audio, output), None, None)
}

fn execute(
    mut cmd: FfmpegCommand,
    duration_secs: Option<f64>,
    progress_sink: Option<&ProgressFn>,
) -> CoreResult<()> {
    log::debug!("Engine command: {cmd:?}");

    let mut child = cmd.spawn().map_err(|e| CoreError::CommandStart {
        tool: config::ffmpeg_binary(),
        detail: e.to_string(),
    })?;

    let mut error_lines: Vec<String> = Vec::new();
    let mut last_fraction: f32 = 0.0;

    let events = child.iter().map_err(|e| CoreError::CommandStart {
        tool: config::ffmpeg_binary(),
        detail: format!("failed to read engine events: {e}"),
    })?;

    for event in events {
        match event {
            FfmpegEvent::Progress(progress) => {
                let Some(sink) = progress_sink else { continue };
                let Some(duration) = duration_secs.filter(|d| *d > 0.0) else { continue };
                last_fraction = progress_fraction(&progress.time, duration, last_fraction);
                sink(last_fraction);
            }
            FfmpegEvent::Log(level, message) => {
                let is_error = matches!(level, LogLevel::Error | LogLevel::Fatal);
                if is_error {
                    error_lines.push(message.clone());
                }
                logging::engine_line(&message, is_error);
            }
            FfmpegEvent::Error(message) => {
                if is_non_critical_engine_error(&message) {
                    log::debug!(target: "remora::engine", "non-critical: {message}");
                } else {
                    logging::engine_line(&message, true);
                }
                error_lines.push(message);
            }
            _ => {}
        }
    }

    let status = child.wait().map_err(|e| CoreError::CommandStart {
        tool: config::ffmpeg_binary(),
        detail: format!("failed to wait for engine: {e}"),
    })?;

    if status.success() {
        log::debug!("Engine finished successfully");
        Ok(())
    } else {
        let tail_start = error_lines.len().saturating_sub(STDERR_TAIL_LINES);
        Err(CoreError::EncodeFailed {
            status: status.code().unwrap_or(-1),
            stderr_tail: error_lines[tail_start..].join("\n"),
        })
    }
}

/// Converts an engine timestamp into a completion fraction, clamped to
/// `[0, 1]` and kept non-decreasing against the last reported value.
fn progress_fraction(time: &str, duration_secs: f64, last: f32) -> f32 {
    let current = parse_ffmpeg_time(time).unwrap_or(0.0);
    ((current / duration_secs).clamp(0.0, 1.0) as f32).max(last)
}

/// Engine stderr messages that do not indicate actual problems.
fn is_non_critical_engine_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("Timestamps are unset")
        || error.contains("automatically inserted filter")
        || error.contains("first frame is no keyframe")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NullHost;
    use crate::options::{RawOptions, Resolution};
    use crate::probe::MediaProbe;
    use std::path::PathBuf;

    fn args_of(cmd: &mut FfmpegCommand) -> Vec<String> {
        cmd.as_inner()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn transcode_command_carries_resolved_resolution() {
        let probe = MediaProbe {
            width: 1280,
            height: 720,
            video_bitrate_kbps: None,
            duration_secs: Some(30.0),
        };
        let raw = RawOptions {
            resolution: Some(Resolution::SameAsSource),
            ..RawOptions::default()
        };
        let options = EncodingOptions::build("mp4", raw, &NullHost, Some(&probe)).unwrap();

        let mut cmd = build_transcode_command(
            &PathBuf::from("/tmp/in.mov"),
            &PathBuf::from("/tmp/tmpfile.mp4"),
            &options,
        );
        let args = args_of(&mut cmd);

        let s_pos = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[s_pos + 1], "1280x720");
        assert!(!args.iter().any(|a| a.eq_ignore_ascii_case("same")));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/tmpfile.mp4"));
    }

    #[test]
    fn stage_command_keeps_fixed_args_in_order() {
        let mut cmd = build_stage_command(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/tmpfile.avi"),
            &["-an", "-c:v", "libx264"],
        );
        let args = args_of(&mut cmd);

        let an_pos = args.iter().position(|a| a == "-an").unwrap();
        assert_eq!(&args[an_pos..an_pos + 3], &["-an", "-c:v", "libx264"]);
    }

    #[test]
    fn progress_fractions_relay_in_order() {
        let times = ["00:00:00.00", "00:00:03.00", "00:00:07.00", "00:00:10.00"];
        let mut seen = Vec::new();
        let mut last = 0.0;
        for time in times {
            last = progress_fraction(time, 10.0, last);
            seen.push(last);
        }
        assert_eq!(seen, vec![0.0, 0.3, 0.7, 1.0]);
    }

    #[test]
    fn progress_fraction_clamps_and_never_decreases() {
        assert_eq!(progress_fraction("00:00:20.00", 10.0, 0.0), 1.0);
        assert_eq!(progress_fraction("00:00:01.00", 10.0, 0.5), 0.5);
        assert_eq!(progress_fraction("N/A", 10.0, 0.4), 0.4);
    }

    #[test]
    fn remux_command_copies_both_streams() {
        let mut cmd = build_remux_command(
            &PathBuf::from("/tmp/replacement_tmp.avi"),
            &PathBuf::from("/tmp/tmpfile.mp3"),
            &PathBuf::from("/tmp/tmpfile.mp4"),
        );
        let args = args_of(&mut cmd);

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:v:0"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "1:a:0"));
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }
}
