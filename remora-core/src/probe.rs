//! Source-media probing via ffprobe.
//!
//! Probing happens before the engine boundary whenever a "same as source"
//! setting needs a concrete value or a progress sink needs the duration.

use crate::error::{CoreError, CoreResult};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Properties of a probed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaProbe {
    pub width: u32,
    pub height: u32,
    /// Video stream bitrate in kbit/s, when the container reports one.
    pub video_bitrate_kbps: Option<u32>,
    pub duration_secs: Option<f64>,
}

impl MediaProbe {
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Probes the file at `path` for resolution, bitrate, and duration.
pub fn probe(path: &Path) -> CoreResult<MediaProbe> {
    log::debug!("Running ffprobe on: {}", path.display());

    let metadata = ffprobe(path).map_err(|err| map_ffprobe_error(path, &err))?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CoreError::ProbeFailed {
            path: path.to_path_buf(),
            detail: "no video stream found".to_string(),
        })?;

    let width = video_stream.width.filter(|w| *w > 0).ok_or_else(|| CoreError::ProbeFailed {
        path: path.to_path_buf(),
        detail: "video stream missing width".to_string(),
    })? as u32;
    let height = video_stream.height.filter(|h| *h > 0).ok_or_else(|| CoreError::ProbeFailed {
        path: path.to_path_buf(),
        detail: "video stream missing height".to_string(),
    })? as u32;

    let video_bitrate_kbps = video_stream
        .bit_rate
        .as_deref()
        .or(metadata.format.bit_rate.as_deref())
        .and_then(|b| b.parse::<u64>().ok())
        .map(|bps| (bps / 1000) as u32);

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    Ok(MediaProbe {
        width,
        height,
        video_bitrate_kbps,
        duration_secs,
    })
}

fn map_ffprobe_error(path: &Path, err: &FfProbeError) -> CoreError {
    let detail = match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        FfProbeError::Deserialize(err) => format!("could not parse ffprobe output: {err}"),
        other => format!("{other:?}"),
    };
    CoreError::ProbeFailed {
        path: path.to_path_buf(),
        detail,
    }
}
