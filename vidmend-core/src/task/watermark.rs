//! Watermark removal tasks.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use uuid::Uuid;

use super::TaskState;

/// Rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region with no area selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies entirely inside a `frame_width` x
    /// `frame_height` frame.
    #[must_use]
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(frame_width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(frame_height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses "X,Y,W,H".
impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected X,Y,W,H but got '{s}'"));
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("'{part}' is not a non-negative integer"))?;
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

/// How the selected region is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemovalTechnique {
    #[default]
    Blur,
    Mosaic,
    /// Trims the frame so the region's width and height are removed.
    Crop,
    Delogo,
    /// Paints the region solid black.
    Inpaint,
}

impl fmt::Display for RemovalTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blur => "blur",
            Self::Mosaic => "mosaic",
            Self::Crop => "crop",
            Self::Delogo => "delogo",
            Self::Inpaint => "inpaint",
        };
        f.write_str(name)
    }
}

impl FromStr for RemovalTechnique {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blur" => Ok(Self::Blur),
            "mosaic" => Ok(Self::Mosaic),
            "crop" => Ok(Self::Crop),
            "delogo" => Ok(Self::Delogo),
            "inpaint" => Ok(Self::Inpaint),
            other => Err(format!(
                "unknown method '{other}' (expected blur, mosaic, crop, delogo or inpaint)"
            )),
        }
    }
}

/// A request to remove a watermark from one file.
#[derive(Debug, Clone)]
pub struct WatermarkSpec {
    pub id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Area to treat. Required before the task can run.
    pub region: Option<Region>,
    pub technique: RemovalTechnique,
    pub state: TaskState,
}

impl WatermarkSpec {
    #[must_use]
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        technique: RemovalTechnique,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            region: None,
            technique,
            state: TaskState::new(),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}
