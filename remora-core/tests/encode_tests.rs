//! End-to-end encode behavior around a fake engine binary: validation
//! ordering, environment failures, and the wrapped failure shape.

use remora_core::{
    Callbacks, CoreError, CoreResult, RawOptions, NullHost, Uploader, config, encode_video,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Tests here mutate the process-wide ffmpeg binary knob.
static ENGINE_KNOB: Mutex<()> = Mutex::new(());

struct FileUploader {
    path: PathBuf,
    cached: bool,
    cache_calls: usize,
}

impl FileUploader {
    fn cached_at(path: PathBuf) -> Self {
        Self { path, cached: true, cache_calls: 0 }
    }
}

impl Uploader for FileUploader {
    fn cached(&self) -> bool {
        self.cached
    }

    fn cache_stored_file(&mut self) -> CoreResult<()> {
        self.cache_calls += 1;
        self.cached = true;
        Ok(())
    }

    fn current_path(&self) -> &Path {
        &self.path
    }
}

fn source_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("video.mov");
    fs::write(&path, b"original bytes").unwrap();
    path
}

#[test]
fn unknown_hook_fails_before_caching_or_probing() {
    let dir = tempfile::tempdir().unwrap();
    let mut uploader = FileUploader {
        path: source_file(&dir),
        cached: false,
        cache_calls: 0,
    };
    let raw = RawOptions {
        callbacks: Callbacks {
            before_transcode: Some("no_such_hook".to_string()),
            ..Callbacks::default()
        },
        ..RawOptions::default()
    };

    let err = encode_video(&mut uploader, &NullHost, "mp4", raw).unwrap_err();

    assert!(matches!(err, CoreError::InvalidOptions(_)));
    assert_eq!(uploader.cache_calls, 0, "invalid options must surface before any work");
}

#[test]
fn missing_engine_surfaces_unwrapped() {
    let _guard = ENGINE_KNOB.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut uploader = FileUploader {
        path: source_file(&dir),
        cached: false,
        cache_calls: 0,
    };

    config::set_ffmpeg_binary("remora-test-missing-engine");
    let result = encode_video(&mut uploader, &NullHost, "mp4", RawOptions::default());
    config::set_ffmpeg_binary(config::DEFAULT_FFMPEG_BINARY);

    assert!(matches!(result.unwrap_err(), CoreError::EngineUnavailable(_)));
    assert_eq!(uploader.cache_calls, 1, "file is cached exactly once up front");
    assert_eq!(fs::read(uploader.current_path()).unwrap(), b"original bytes");
}

#[cfg(unix)]
#[test]
fn failing_engine_wraps_error_and_leaves_source_untouched() {
    use std::os::unix::fs::PermissionsExt as _;

    let _guard = ENGINE_KNOB.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(&dir);

    // Stand-in engine that accepts a -version check but fails any encode.
    let fake_engine = dir.path().join("fake-ffmpeg");
    fs::write(&fake_engine, "#!/bin/sh\n[ \"$1\" = \"-version\" ] && exit 0\necho 'invalid data' >&2\nexit 1\n")
        .unwrap();
    fs::set_permissions(&fake_engine, fs::Permissions::from_mode(0o755)).unwrap();

    let mut uploader = FileUploader::cached_at(source.clone());
    config::set_ffmpeg_binary(fake_engine.to_string_lossy().to_string());
    let result = encode_video(&mut uploader, &NullHost, "mp4", RawOptions::default());
    config::set_ffmpeg_binary(config::DEFAULT_FFMPEG_BINARY);

    let err = result.unwrap_err();
    assert!(matches!(err, CoreError::TranscodeFailed { .. }));
    assert_eq!(
        fs::read(&source).unwrap(),
        b"original bytes",
        "a failed transcode must never replace the source"
    );
}
