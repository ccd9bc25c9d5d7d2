// vidmend-cli/src/config.rs
//
// Locates the settings file and turns saved settings plus command-line
// overrides into the `CoreConfig` handed to vidmend-core.

use std::path::{Path, PathBuf};

use anyhow::Context;
use vidmend_core::{ConfigStore, CoreConfig, JsonConfigStore, StoredSettings};

use crate::error::CliResult;

pub const CONFIG_DIR_NAME: &str = "vidmend";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Per-user settings file, falling back to the working directory when the
/// platform has no configuration directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// The settings store selected by `--config`, or the per-user one.
pub fn open_store(explicit: Option<&Path>) -> JsonConfigStore {
    JsonConfigStore::new(explicit.map_or_else(default_config_path, Path::to_path_buf))
}

/// Loads saved settings, using defaults when the file is unreadable.
pub fn load_settings(store: &JsonConfigStore) -> StoredSettings {
    match store.load() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!(
                "Ignoring settings in {}: {e}; using defaults",
                store.path().display()
            );
            StoredSettings::default()
        }
    }
}

/// Builds the effective configuration for a task command.
pub fn resolve_config(store: &JsonConfigStore, ffmpeg_dir: Option<&Path>) -> CliResult<CoreConfig> {
    let mut settings = load_settings(store);
    if let Some(dir) = ffmpeg_dir {
        settings.ffmpeg_dir = Some(dir.to_path_buf());
    }
    let config = settings
        .to_core_config()
        .with_context(|| format!("Invalid settings in {}", store.path().display()))?;
    log::debug!(
        "Using ffmpeg at {} and ffprobe at {}",
        config.ffmpeg_path.display(),
        config.ffprobe_path.display()
    );
    Ok(config)
}
