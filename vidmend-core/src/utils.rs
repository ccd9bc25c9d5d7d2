//! Utility functions for formatting, time parsing and path handling.
//!
//! These helpers are shared by the media descriptor, the progress extractor,
//! the argument builders and the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count scaled by 1024 with up to two decimals (e.g. 1536 -> "1.5 KB").
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    let mut len = bytes as f64;
    let mut order = 0;
    while len >= 1024.0 && order < SIZE_UNITS.len() - 1 {
        order += 1;
        len /= 1024.0;
    }

    let formatted = format!("{len:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[order])
}

/// Formats a duration as MM:SS, with minutes not wrapped at the hour (e.g. 3725s -> "62:05").
#[must_use]
pub fn format_duration_mmss(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Formats a duration as HH:MM:SS (e.g. 3725.0 -> "01:02:05").
#[must_use]
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Formats a seek position as HH:MM:SS.mmm, the form ffmpeg's `-ss` accepts.
#[must_use]
pub fn format_timestamp(position: Duration) -> String {
    let total = position.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total / 3600,
        (total % 3600) / 60,
        total % 60,
        position.subsec_millis()
    )
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours = parts[0].parse::<u64>().ok()?;
    let minutes = parts[1].parse::<u64>().ok()?;
    let seconds = parts[2].parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Rewrites every backslash separator as a forward slash.
///
/// ffmpeg accepts forward slashes on every platform, so all paths handed to
/// the external tools go through this first.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('\\', "/"))
}

/// Returns the file name component as a String, or the full path if there is none.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_073_741_824), "1 GB");
        assert_eq!(format_file_size(1_099_511_627_776), "1 TB");
        // Past TB the value keeps growing instead of switching unit
        assert_eq!(format_file_size(1024 * 1_099_511_627_776), "1024 TB");
        // 1.2345 MB rounds to two decimals
        assert_eq!(format_file_size(1_294_467), "1.23 MB");
    }

    #[test]
    fn test_format_duration_mmss() {
        assert_eq!(format_duration_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_duration_mmss(Duration::from_secs(59)), "00:59");
        assert_eq!(format_duration_mmss(Duration::from_secs(300)), "05:00");
        assert_eq!(format_duration_mmss(Duration::from_secs(3725)), "62:05");
        assert_eq!(format_duration_mmss(Duration::from_secs_f64(61.9)), "01:01");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_clock(Duration::from_secs(3661)), "01:01:01");
        assert_eq!(format_clock(Duration::from_secs(90061)), "25:01:01");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Duration::from_secs(0)), "00:00:00.000");
        assert_eq!(format_timestamp(Duration::from_millis(1500)), "00:00:01.500");
        assert_eq!(
            format_timestamp(Duration::from_millis(3_723_045)),
            "01:02:03.045"
        );
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("100:00:00.00"), Some(360_000.0));

        assert_eq!(parse_ffmpeg_time(""), None);
        assert_eq!(parse_ffmpeg_time("N/A"), None);
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("-00:00:01.00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new(r"C:\videos\in put.mov")),
            PathBuf::from("C:/videos/in put.mov")
        );
        assert_eq!(
            normalize_path(Path::new("/already/forward.mp4")),
            PathBuf::from("/already/forward.mp4")
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/clip.mkv")), "clip.mkv");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
