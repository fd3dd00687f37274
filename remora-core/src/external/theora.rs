//! The single-purpose Theora transcoder (`ffmpeg2theora` by default).
//!
//! The tool takes the input path and `-o <output>`; its diagnostic output
//! is relayed line by line to the provided log sink.

use crate::config;
use crate::error::{CoreError, CoreResult};
use crate::logging::LogSink;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

const STDERR_TAIL_LINES: usize = 15;

/// One input→output Theora transcode.
#[derive(Debug, Clone)]
pub struct TheoraTranscoder {
    input: PathBuf,
    output: PathBuf,
}

impl TheoraTranscoder {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Builds the tool invocation without running it.
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(config::theora_binary());
        cmd.arg(&self.input).arg("-o").arg(&self.output);
        cmd
    }

    /// Runs the transcoder, relaying its output to `logger` when given.
    pub fn run(&self, logger: Option<&Arc<dyn LogSink>>) -> CoreResult<()> {
        super::ensure_destination_writable(&self.output)?;

        let binary = config::theora_binary();
        log::info!(
            "Starting theora encode: {} -> {}",
            self.input.display(),
            self.output.display()
        );

        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CoreError::EngineUnavailable(binary.clone())
            } else {
                CoreError::CommandStart {
                    tool: binary.clone(),
                    detail: e.to_string(),
                }
            }
        })?;

        let mut lines: Vec<String> = Vec::new();
        if let Some(stderr) = child.stderr.take() {
            for line in BufReader::new(stderr).lines() {
                let line = line?;
                if let Some(sink) = logger {
                    sink.info(&line);
                } else {
                    log::debug!(target: "remora::engine", "{line}");
                }
                lines.push(line);
            }
        }

        let status = child.wait().map_err(|e| CoreError::CommandStart {
            tool: binary,
            detail: format!("failed to wait for theora transcoder: {e}"),
        })?;

        if status.success() {
            Ok(())
        } else {
            let tail_start = lines.len().saturating_sub(STDERR_TAIL_LINES);
            Err(CoreError::EncodeFailed {
                status: status.code().unwrap_or(-1),
                stderr_tail: lines[tail_start..].join("\n"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shape_matches_tool_interface() {
        let transcoder = TheoraTranscoder::new("/tmp/in.mp4", "/tmp/tmpfile.ogv");
        let cmd = transcoder.build_command();

        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(args, vec!["/tmp/in.mp4", "-o", "/tmp/tmpfile.ogv"]);
    }
}
