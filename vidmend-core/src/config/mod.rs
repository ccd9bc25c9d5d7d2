//! Configuration for the vidmend-core library.
//!
//! `CoreConfig` carries the tool locations and the directory defaults an
//! orchestrator works with. It is an explicit value built by the consumer
//! (usually from persisted `StoredSettings`) and passed in; nothing here is
//! global.

mod builder;
mod store;

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use builder::CoreConfigBuilder;
pub use store::{ConfigStore, JsonConfigStore, StoredSettings};

use crate::error::CoreResult;
use crate::external::resolve_tool;

/// Seek position used for preview frames when nothing else is configured.
pub const DEFAULT_PREVIEW_FRAME_TIME: Duration = Duration::from_secs(1);

/// Name of the transcoding executable, without platform suffix.
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Name of the inspection executable, without platform suffix.
pub const FFPROBE_BINARY: &str = "ffprobe";

/// Main configuration structure for the vidmend-core library.
///
/// The default looks both tools up on `PATH` and uses the current directory
/// for everything else.
///
/// # Examples
///
/// ```rust,no_run
/// use vidmend_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .binary_dir("/opt/ffmpeg/bin")
///     .screenshot_dir("/tmp/shots")
///     .preview_frame_time(Duration::from_secs(5))
///     .build();
/// config.validate().expect("ffmpeg and ffprobe present");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Transcoding executable
    pub ffmpeg_path: PathBuf,

    /// Inspection executable
    pub ffprobe_path: PathBuf,

    /// Where screenshots land when no output path is given
    pub screenshot_dir: PathBuf,

    /// Directory offered for input selection
    pub default_input_dir: PathBuf,

    /// Directory offered for output selection
    pub default_output_dir: PathBuf,

    /// Whether a preview frame is captured as soon as a file is opened
    pub auto_load_first_frame: bool,

    /// Seek position for preview frames and default screenshots
    pub preview_frame_time: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(FFMPEG_BINARY),
            ffprobe_path: PathBuf::from(FFPROBE_BINARY),
            screenshot_dir: PathBuf::from("."),
            default_input_dir: PathBuf::from("."),
            default_output_dir: PathBuf::from("."),
            auto_load_first_frame: true,
            preview_frame_time: DEFAULT_PREVIEW_FRAME_TIME,
        }
    }
}

impl CoreConfig {
    /// Default configuration with both tools taken from `dir`.
    #[must_use]
    pub fn from_binary_dir(dir: impl AsRef<Path>) -> Self {
        let (ffmpeg_path, ffprobe_path) = tool_paths(dir.as_ref());
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Self::default()
        }
    }

    /// Checks that both executables exist.
    ///
    /// Returns `ToolNotFound` naming the first missing tool.
    pub fn validate(&self) -> CoreResult<()> {
        resolve_tool(&self.ffmpeg_path)?;
        resolve_tool(&self.ffprobe_path)?;
        Ok(())
    }
}

/// Paths of `ffmpeg[.exe]` and `ffprobe[.exe]` inside `dir`.
pub(crate) fn tool_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{FFMPEG_BINARY}{EXE_SUFFIX}")),
        dir.join(format!("{FFPROBE_BINARY}{EXE_SUFFIX}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_uses_path_lookup() {
        let config = CoreConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert!(config.auto_load_first_frame);
        assert_eq!(config.preview_frame_time, Duration::from_secs(1));
    }

    #[test]
    fn binary_dir_joins_tool_names() {
        let config = CoreConfig::from_binary_dir("/opt/ff");
        assert_eq!(
            config.ffmpeg_path,
            Path::new("/opt/ff").join(format!("ffmpeg{EXE_SUFFIX}"))
        );
        assert_eq!(
            config.ffprobe_path,
            Path::new("/opt/ff").join(format!("ffprobe{EXE_SUFFIX}"))
        );
    }

    #[test]
    fn validate_reports_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::from_binary_dir(dir.path());
        match config.validate() {
            Err(CoreError::ToolNotFound(path)) => assert_eq!(path, config.ffmpeg_path),
            other => panic!("expected ToolNotFound, got {other:?}"),
        }

        std::fs::write(&config.ffmpeg_path, b"").unwrap();
        match config.validate() {
            Err(CoreError::ToolNotFound(path)) => assert_eq!(path, config.ffprobe_path),
            other => panic!("expected ToolNotFound, got {other:?}"),
        }

        std::fs::write(&config.ffprobe_path, b"").unwrap();
        assert!(config.validate().is_ok());
    }
}
