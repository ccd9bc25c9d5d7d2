//! Persisted user settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CoreConfig, CoreConfigBuilder, DEFAULT_PREVIEW_FRAME_TIME};
use crate::error::{CoreError, CoreResult};

/// The settings a user can change and that survive restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    /// Directory holding ffmpeg and ffprobe. `None` means look them up on PATH.
    pub ffmpeg_dir: Option<PathBuf>,
    pub screenshot_dir: PathBuf,
    pub default_input_dir: PathBuf,
    pub default_output_dir: PathBuf,
    pub auto_load_first_frame: bool,
    /// Seconds into the file used for preview frames.
    pub preview_frame_time: f64,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            ffmpeg_dir: None,
            screenshot_dir: PathBuf::from("."),
            default_input_dir: PathBuf::from("."),
            default_output_dir: PathBuf::from("."),
            auto_load_first_frame: true,
            preview_frame_time: DEFAULT_PREVIEW_FRAME_TIME.as_secs_f64(),
        }
    }
}

impl StoredSettings {
    /// Turns the stored values into a `CoreConfig`.
    ///
    /// Fails with `Config` when the preview time is negative, not a number or
    /// too large to represent.
    pub fn to_core_config(&self) -> CoreResult<CoreConfig> {
        let preview_frame_time = Duration::try_from_secs_f64(self.preview_frame_time)
            .map_err(|_| {
                CoreError::Config(format!(
                    "preview_frame_time must be a non-negative number of seconds, got {}",
                    self.preview_frame_time
                ))
            })?;

        let mut builder = CoreConfigBuilder::new()
            .screenshot_dir(&self.screenshot_dir)
            .default_input_dir(&self.default_input_dir)
            .default_output_dir(&self.default_output_dir)
            .auto_load_first_frame(self.auto_load_first_frame)
            .preview_frame_time(preview_frame_time);
        if let Some(dir) = &self.ffmpeg_dir {
            builder = builder.binary_dir(dir);
        }
        Ok(builder.build())
    }
}

/// Load/save seam for settings persistence.
pub trait ConfigStore {
    /// Reads the stored settings; defaults when nothing has been saved yet.
    fn load(&self) -> CoreResult<StoredSettings>;

    /// Replaces the stored settings.
    fn save(&self, settings: &StoredSettings) -> CoreResult<()>;

    /// Overwrites the stored settings with defaults and returns them.
    fn restore_defaults(&self) -> CoreResult<StoredSettings> {
        let defaults = StoredSettings::default();
        self.save(&defaults)?;
        Ok(defaults)
    }
}

/// Settings kept as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> CoreResult<StoredSettings> {
        if !self.path.exists() {
            log::debug!("No settings at {}; using defaults", self.path.display());
            return Ok(StoredSettings::default());
        }
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|e| {
            CoreError::Config(format!("Cannot parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, settings: &StoredSettings) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), StoredSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nested/vidmend/config.json"));
        let settings = StoredSettings {
            ffmpeg_dir: Some(PathBuf::from("/opt/ff")),
            screenshot_dir: PathBuf::from("/shots"),
            preview_frame_time: 4.5,
            ..StoredSettings::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"screenshot_dir\""));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"auto_load_first_frame": false}"#).unwrap();

        let settings = JsonConfigStore::new(&path).load().unwrap();
        assert!(!settings.auto_load_first_frame);
        assert_eq!(settings.preview_frame_time, 1.0);
        assert_eq!(settings.ffmpeg_dir, None);
    }

    #[test]
    fn corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonConfigStore::new(&path).load(),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn restore_defaults_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));
        store
            .save(&StoredSettings {
                auto_load_first_frame: false,
                ..StoredSettings::default()
            })
            .unwrap();

        let restored = store.restore_defaults().unwrap();
        assert_eq!(restored, StoredSettings::default());
        assert_eq!(store.load().unwrap(), StoredSettings::default());
    }

    #[test]
    fn converts_to_core_config() {
        let settings = StoredSettings {
            ffmpeg_dir: Some(PathBuf::from("/opt/ff")),
            preview_frame_time: 2.5,
            ..StoredSettings::default()
        };
        let config = settings.to_core_config().unwrap();
        assert!(config.ffmpeg_path.starts_with("/opt/ff"));
        assert_eq!(config.preview_frame_time, Duration::from_millis(2500));

        let path_lookup = StoredSettings::default().to_core_config().unwrap();
        assert_eq!(path_lookup.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn rejects_negative_preview_time() {
        let settings = StoredSettings {
            preview_frame_time: -1.0,
            ..StoredSettings::default()
        };
        assert!(matches!(settings.to_core_config(), Err(CoreError::Config(_))));
    }

    #[test]
    fn rejects_unrepresentable_preview_time() {
        for preview_frame_time in [1e20, f64::INFINITY, f64::NAN] {
            let settings = StoredSettings {
                preview_frame_time,
                ..StoredSettings::default()
            };
            assert!(
                matches!(settings.to_core_config(), Err(CoreError::Config(_))),
                "{preview_frame_time} accepted"
            );
        }
    }
}
