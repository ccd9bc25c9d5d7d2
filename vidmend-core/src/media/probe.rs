//! Media inspection through ffprobe.
//!
//! The JSON ffprobe prints is decoded with serde. When that fails (truncated
//! or non-conforming output) the few values the orchestrator needs are pulled
//! out with targeted regexes instead, and anything still missing falls back
//! to a default that is recorded in [`Estimated`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::external::{CommandRunner, ProcessRunner};
use crate::ffmpeg_args::probe_args;
use crate::utils::{display_name, normalize_path};

use super::descriptor::{Estimated, MediaDescriptor};

/// Duration assumed when the probe output has none.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(300);
/// Frame width assumed when the probe output has none.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Frame height assumed when the probe output has none.
pub const DEFAULT_HEIGHT: u32 = 1080;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""duration"\s*:\s*"(\d+(?:\.\d+)?)""#).expect("valid duration regex")
});
static WIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""width"\s*:\s*(\d+)"#).expect("valid width regex"));
static HEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""height"\s*:\s*(\d+)"#).expect("valid height regex"));

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    r_frame_rate: Option<String>,
    #[serde(default)]
    avg_frame_rate: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    format_name: Option<String>,
}

/// Values extracted from one ffprobe run, before defaults are applied.
#[derive(Debug, Default, PartialEq)]
struct ProbeFields {
    duration: Option<Duration>,
    dimensions: Option<(u32, u32)>,
    format_name: Option<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    frame_rate: Option<f64>,
}

/// Runs ffprobe and turns its report into a [`MediaDescriptor`].
pub struct MediaProbe {
    ffprobe_path: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl MediaProbe {
    /// Probe that spawns `ffprobe_path` directly.
    #[must_use]
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(ffprobe_path, Arc::new(ProcessRunner::new()))
    }

    /// Probe that goes through a caller-supplied runner.
    #[must_use]
    pub fn with_runner(ffprobe_path: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            runner,
        }
    }

    #[must_use]
    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe_path
    }

    /// Inspects `path`.
    ///
    /// Fails with `ProbeFailed` when the file cannot be read or ffprobe
    /// rejects it, and with `ToolNotFound` when ffprobe itself is missing.
    pub fn probe(&self, path: &Path) -> CoreResult<MediaDescriptor> {
        let path = normalize_path(path);

        let metadata = fs::metadata(&path).map_err(|e| {
            CoreError::ProbeFailed(format!("Cannot read {}: {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(CoreError::ProbeFailed(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let args = probe_args(&path).to_vec();
        let output = self
            .runner
            .run(&self.ffprobe_path, &args)
            .map_err(|e| match e {
                CoreError::ToolNotFound(_) => e,
                other => CoreError::ProbeFailed(format!(
                    "ffprobe could not read {}: {other}",
                    path.display()
                )),
            })?;

        Ok(build_descriptor(&path, metadata.len(), &output))
    }
}

fn build_descriptor(path: &Path, file_size: u64, output: &str) -> MediaDescriptor {
    let fields = parse_probe_json(output).unwrap_or_else(|e| {
        log::warn!(
            "Unexpected ffprobe output for {} ({e}); falling back to pattern matching",
            path.display()
        );
        scan_probe_text(output)
    });

    let mut estimated = Estimated::default();

    let duration = fields.duration.unwrap_or_else(|| {
        log::warn!(
            "No duration reported for {}; assuming {}s",
            path.display(),
            DEFAULT_DURATION.as_secs()
        );
        estimated.duration = true;
        DEFAULT_DURATION
    });

    let (width, height) = fields.dimensions.unwrap_or_else(|| {
        log::warn!(
            "No frame size reported for {}; assuming {DEFAULT_WIDTH}x{DEFAULT_HEIGHT}",
            path.display()
        );
        estimated.dimensions = true;
        (DEFAULT_WIDTH, DEFAULT_HEIGHT)
    });

    let format = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_uppercase())
        .filter(|ext| !ext.is_empty())
        .or_else(|| {
            fields
                .format_name
                .as_deref()
                .and_then(|names| names.split(',').next())
                .map(|name| name.trim().to_uppercase())
        })
        .unwrap_or_default();

    let descriptor = MediaDescriptor {
        path: path.to_path_buf(),
        file_name: display_name(path),
        duration,
        width,
        height,
        format,
        file_size,
        video_codec: fields.video_codec.unwrap_or_default(),
        audio_codec: fields.audio_codec.unwrap_or_default(),
        frame_rate: fields.frame_rate.unwrap_or(0.0),
        estimated,
    };

    log::debug!(
        "Probed {}: {} {} {} {}fps",
        descriptor.file_name,
        descriptor.duration_text(),
        descriptor.resolution(),
        descriptor.format,
        descriptor.frame_rate
    );
    descriptor
}

fn parse_probe_json(output: &str) -> Result<ProbeFields, serde_json::Error> {
    let parsed: ProbeOutput = serde_json::from_str(output)?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds)
        .or_else(|| video.and_then(|v| v.duration.as_deref()).and_then(parse_seconds));

    let dimensions = video.and_then(|v| match (v.width, v.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
        _ => None,
    });

    let frame_rate = video.and_then(|v| {
        v.avg_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .or_else(|| v.r_frame_rate.as_deref().and_then(parse_frame_rate))
    });

    Ok(ProbeFields {
        duration,
        dimensions,
        format_name: parsed.format.and_then(|f| f.format_name),
        video_codec: video.and_then(|v| v.codec_name.clone()),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        frame_rate,
    })
}

fn scan_probe_text(output: &str) -> ProbeFields {
    let capture = |re: &Regex| {
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let duration = capture(&DURATION_RE).as_deref().and_then(parse_seconds);
    let width = capture(&WIDTH_RE).and_then(|w| w.parse::<u32>().ok());
    let height = capture(&HEIGHT_RE).and_then(|h| h.parse::<u32>().ok());
    let dimensions = match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
        _ => None,
    };

    ProbeFields {
        duration,
        dimensions,
        ..ProbeFields::default()
    }
}

/// Positive, finite seconds as a `Duration`.
fn parse_seconds(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

/// Parses ffprobe's "num/den" rate notation (e.g. "30000/1001").
fn parse_frame_rate(value: &str) -> Option<f64> {
    let (num, den) = match value.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (value.trim().parse::<f64>().ok()?, 1.0),
    };
    let rate = num / den;
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
