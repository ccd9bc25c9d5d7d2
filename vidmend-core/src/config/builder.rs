// ============================================================================
// vidmend-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every field starts at its default, so a
// builder only needs the values that differ.

use std::path::PathBuf;
use std::time::Duration;

use super::{CoreConfig, tool_paths};

/// Builder for creating CoreConfig instances.
///
/// ```rust
/// use vidmend_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("/usr/local/bin/ffmpeg")
///     .ffprobe_path("/usr/local/bin/ffprobe")
///     .default_output_dir("/srv/out")
///     .auto_load_first_frame(false)
///     .build();
/// assert_eq!(config.default_output_dir, PathBuf::from("/srv/out"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ffmpeg executable.
    #[must_use]
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    /// Sets the ffprobe executable.
    #[must_use]
    pub fn ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffprobe_path = path.into();
        self
    }

    /// Takes both executables from one directory.
    #[must_use]
    pub fn binary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let (ffmpeg, ffprobe) = tool_paths(&dir.into());
        self.config.ffmpeg_path = ffmpeg;
        self.config.ffprobe_path = ffprobe;
        self
    }

    #[must_use]
    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.screenshot_dir = dir.into();
        self
    }

    #[must_use]
    pub fn default_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.default_input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn default_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.default_output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn auto_load_first_frame(mut self, enabled: bool) -> Self {
        self.config.auto_load_first_frame = enabled;
        self
    }

    /// Sets the seek position for preview frames.
    #[must_use]
    pub fn preview_frame_time(mut self, position: Duration) -> Self {
        self.config.preview_frame_time = position;
        self
    }

    /// Builds the CoreConfig. Tool existence is checked separately by
    /// [`CoreConfig::validate`].
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
