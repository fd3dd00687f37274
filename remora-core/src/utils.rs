//! Small parsing and formatting helpers shared across the crate.

/// Parses an ffmpeg `HH:MM:SS[.frac]` timestamp into seconds.
///
/// Returns `None` for `N/A` and anything else that does not match the
/// three-part clock format.
pub fn parse_ffmpeg_time(time_str: &str) -> Option<f64> {
    let trimmed = time_str.trim();
    if trimmed.is_empty() || trimmed == "N/A" {
        return None;
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Formats a second count as `HH:MM:SS` for log lines.
pub fn format_duration_seconds(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
