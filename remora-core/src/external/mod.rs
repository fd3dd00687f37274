//! Interactions with the external CLI tools remora drives: the ffmpeg
//! engine, the single-purpose Theora transcoder, and the content
//! replacement tool.

use crate::error::{CoreError, CoreResult};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

pub mod engine;
pub mod replacer;
pub mod theora;

pub use engine::run_transcode;
pub use replacer::ReplacementTool;
pub use theora::TheoraTranscoder;

/// Checks that a required external command is available and executable.
///
/// Runs the command with `-version` and discards its output; only the
/// ability to start it matters.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::EngineUnavailable(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart {
                tool: cmd_name.to_string(),
                detail: e.to_string(),
            })
        }
    }
}

/// Verifies that the directory a destination path will be written into
/// exists and is writable before any encoding starts.
pub(crate) fn ensure_destination_writable(destination: &Path) -> CoreResult<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let metadata = std::fs::metadata(dir)
        .map_err(|_| CoreError::DestinationUnwritable(dir.to_path_buf()))?;
    if !metadata.is_dir() || metadata.permissions().readonly() {
        return Err(CoreError::DestinationUnwritable(dir.to_path_buf()));
    }
    Ok(())
}
