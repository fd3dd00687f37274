use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for remora.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid encoding options: {0}")]
    InvalidOptions(String),

    #[error("failed to probe source media {path}: {detail}")]
    ProbeFailed { path: PathBuf, detail: String },

    #[error("external tool '{0}' not found; check that it is installed and on PATH")]
    EngineUnavailable(String),

    #[error("failed to start {tool}: {detail}")]
    CommandStart { tool: String, detail: String },

    #[error("destination directory {0} does not exist or is not writable")]
    DestinationUnwritable(PathBuf),

    #[error("engine exited with status {status}: {stderr_tail}")]
    EncodeFailed { status: i32, stderr_tail: String },

    #[error("replacement tool exited with status {status}")]
    ReplacementToolFailed { status: i32 },

    #[error("hook `{hook}` failed: {detail}")]
    HookFailed { hook: String, detail: String },

    #[error(
        "Failed to transcode with engine. Check installation and verify the source is not corrupt or truncated."
    )]
    TranscodeFailed {
        #[source]
        source: Box<CoreError>,
    },
}

/// Result type for remora operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Wraps a lifecycle-body failure into the single user-facing shape.
    /// The original error stays reachable through `source()`.
    pub(crate) fn into_transcode_failed(self) -> CoreError {
        CoreError::TranscodeFailed {
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn transcode_failed_preserves_cause_chain() {
        let original = CoreError::EncodeFailed {
            status: 1,
            stderr_tail: "invalid data".to_string(),
        };
        let wrapped = original.into_transcode_failed();

        assert!(wrapped.to_string().contains("Failed to transcode with engine"));
        let cause = wrapped.source().expect("wrapped error must keep its cause");
        assert!(cause.to_string().contains("invalid data"));
    }
}
