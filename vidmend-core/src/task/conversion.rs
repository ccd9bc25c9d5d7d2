//! Format conversion tasks.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use uuid::Uuid;

use super::TaskState;

/// Output container for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Avi,
    Mov,
    Mkv,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 4] = [Self::Mp4, Self::Avi, Self::Mov, Self::Mkv];

    /// Name ffmpeg knows the muxer by (`-f` value).
    #[must_use]
    pub fn muxer(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Mkv => "matroska",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Mkv => "mkv",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "avi" => Ok(Self::Avi),
            "mov" => Ok(Self::Mov),
            "mkv" | "matroska" => Ok(Self::Mkv),
            other => Err(format!(
                "unsupported container '{other}' (expected mp4, avi, mov or mkv)"
            )),
        }
    }
}

/// Encoding quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    High,
    #[default]
    Normal,
    Low,
    /// Leave video encoding to ffmpeg's defaults.
    Custom,
}

impl Quality {
    /// Video encoder flags for this tier.
    #[must_use]
    pub fn video_args(self) -> &'static [&'static str] {
        match self {
            Self::High => &["-c:v", "libx264", "-crf", "18", "-preset", "medium"],
            Self::Normal => &["-c:v", "libx264", "-crf", "23", "-preset", "medium"],
            Self::Low => &["-c:v", "libx264", "-crf", "28", "-preset", "fast"],
            Self::Custom => &[],
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown quality '{other}' (expected high, normal, low or custom)"
            )),
        }
    }
}

/// Target frame size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    /// Keep the source frame size.
    #[default]
    Original,
    Uhd4k,
    Qhd2k,
    Fhd1080p,
    Hd720p,
    Sd480p,
}

impl Resolution {
    /// Output frame size, `None` for `Original`.
    #[must_use]
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            Self::Original => None,
            Self::Uhd4k => Some((3840, 2160)),
            Self::Qhd2k => Some((2560, 1440)),
            Self::Fhd1080p => Some((1920, 1080)),
            Self::Hd720p => Some((1280, 720)),
            Self::Sd480p => Some((854, 480)),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Original => "original",
            Self::Uhd4k => "4k",
            Self::Qhd2k => "2k",
            Self::Fhd1080p => "1080p",
            Self::Hd720p => "720p",
            Self::Sd480p => "480p",
        };
        f.write_str(name)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "4k" | "2160p" => Ok(Self::Uhd4k),
            "2k" | "1440p" => Ok(Self::Qhd2k),
            "1080p" => Ok(Self::Fhd1080p),
            "720p" => Ok(Self::Hd720p),
            "480p" => Ok(Self::Sd480p),
            other => Err(format!(
                "unknown resolution '{other}' (expected original, 4k, 2k, 1080p, 720p or 480p)"
            )),
        }
    }
}

/// A request to transcode one file into another container.
#[derive(Debug, Clone)]
pub struct ConversionSpec {
    pub id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: ContainerFormat,
    pub quality: Quality,
    pub resolution: Resolution,
    pub state: TaskState,
}

impl ConversionSpec {
    /// A pending conversion with default quality and resolution.
    #[must_use]
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        format: ContainerFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            format,
            quality: Quality::default(),
            resolution: Resolution::default(),
            state: TaskState::new(),
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}
