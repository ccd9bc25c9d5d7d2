use std::path::PathBuf;
use std::time::Duration;

use crate::utils::{format_duration_mmss, format_file_size};

/// Which descriptor values fell back to defaults because the probe output
/// did not contain them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Estimated {
    pub duration: bool,
    pub dimensions: bool,
}

impl Estimated {
    /// True when any value is a default rather than a measurement.
    #[must_use]
    pub fn any(&self) -> bool {
        self.duration || self.dimensions
    }
}

/// Description of a media file produced by `MediaProbe`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDescriptor {
    /// Path as handed to the inspection tool (forward slashes).
    pub path: PathBuf,
    /// File name shown to users.
    pub file_name: String,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    /// Container format, e.g. "MP4".
    pub format: String,
    /// Size on disk in bytes.
    pub file_size: u64,
    /// Codec of the first video stream, empty if none.
    pub video_codec: String,
    /// Codec of the first audio stream, empty if none.
    pub audio_codec: String,
    /// Frames per second of the first video stream, 0.0 if unknown.
    pub frame_rate: f64,
    pub estimated: Estimated,
}

impl MediaDescriptor {
    /// Frame size as "WIDTHxHEIGHT".
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Duration as "MM:SS".
    #[must_use]
    pub fn duration_text(&self) -> String {
        format_duration_mmss(self.duration)
    }

    /// File size scaled to B/KB/MB/GB/TB.
    #[must_use]
    pub fn size_text(&self) -> String {
        format_file_size(self.file_size)
    }
}
