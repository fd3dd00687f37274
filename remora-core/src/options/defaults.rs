//! Per-format default encoder parameters.
//!
//! Keys are ffmpeg flag names without the leading dash; an empty value
//! renders as a bare flag. Caller overrides win on key collision and
//! unknown keys pass through to the engine untouched.

use std::collections::BTreeMap;

pub(crate) fn format_defaults(format: &str) -> BTreeMap<String, String> {
    let pairs: &[(&str, &str)] = match format {
        "mp4" | "m4v" | "mov" => &[
            ("c:v", "libx264"),
            ("c:a", "aac"),
            ("strict", "-2"),
            ("movflags", "+faststart"),
        ],
        "webm" => &[("c:v", "libvpx"), ("c:a", "libvorbis")],
        "ogv" | "ogg" => &[("c:v", "libtheora"), ("c:a", "libvorbis")],
        "avi" => &[("c:v", "libx264")],
        "mp3" => &[("c:a", "libmp3lame"), ("vn", "")],
        _ => &[],
    };

    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
