//! The external content-replacement tool (`chbg` by default).
//!
//! Invoked as `<bin> -i <video> -b <reference> -o <output>`; only the exit
//! status matters, stderr is relayed to the engine log sink on failure.

use crate::config;
use crate::error::{CoreError, CoreResult};
use crate::logging;
use std::io;
use std::path::Path;
use std::process::Command;

/// Wrapper for one replacement-tool invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacementTool;

impl ReplacementTool {
    /// Builds the tool invocation without running it.
    pub fn build_command(video: &Path, reference: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(config::replacement_binary());
        cmd.arg("-i")
            .arg(video)
            .arg("-b")
            .arg(reference)
            .arg("-o")
            .arg(output);
        cmd
    }

    /// Runs the replacement tool on a video-only stream.
    pub fn run(video: &Path, reference: &Path, output: &Path) -> CoreResult<()> {
        super::ensure_destination_writable(output)?;

        let binary = config::replacement_binary();
        log::info!(
            "Running replacement tool on {} with reference {}",
            video.display(),
            reference.display()
        );

        let result = Self::build_command(video, reference, output)
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    CoreError::EngineUnavailable(binary.clone())
                } else {
                    CoreError::CommandStart {
                        tool: binary.clone(),
                        detail: e.to_string(),
                    }
                }
            })?;

        if result.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&result.stderr);
            for line in stderr.lines() {
                logging::engine_line(line, true);
            }
            Err(CoreError::ReplacementToolFailed {
                status: result.status.code().unwrap_or(-1),
            })
        }
    }
}
