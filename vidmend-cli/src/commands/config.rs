//! Implementation of the `config` subcommand.

use std::path::Path;

use anyhow::{Context, bail};
use vidmend_core::{ConfigStore, JsonConfigStore, StoredSettings};

use crate::cli::ConfigAction;
use crate::config::load_settings;
use crate::error::CliResult;
use crate::terminal;

pub fn run_config(action: &ConfigAction, store: &JsonConfigStore) -> CliResult<()> {
    match action {
        ConfigAction::Show => {
            let settings = load_settings(store);
            print_settings(store.path(), &settings);
        }
        ConfigAction::SetFfmpegDir { dir } => {
            if !dir.is_dir() {
                bail!("Not a directory: {}", dir.display());
            }
            update(store, |settings| settings.ffmpeg_dir = Some(dir.clone()))?;
            terminal::print_success(&format!("ffmpeg directory set to {}", dir.display()));
        }
        ConfigAction::SetScreenshotDir { dir } => {
            update(store, |settings| settings.screenshot_dir = dir.clone())?;
            terminal::print_success(&format!("Screenshot directory set to {}", dir.display()));
        }
        ConfigAction::Reset => {
            store
                .restore_defaults()
                .with_context(|| format!("Cannot reset {}", store.path().display()))?;
            terminal::print_success("Settings restored to defaults");
        }
    }
    Ok(())
}

fn update(store: &JsonConfigStore, change: impl FnOnce(&mut StoredSettings)) -> CliResult<()> {
    let mut settings = load_settings(store);
    change(&mut settings);
    store
        .save(&settings)
        .with_context(|| format!("Cannot save settings to {}", store.path().display()))
}

fn print_settings(path: &Path, settings: &StoredSettings) {
    terminal::print_section("Settings");
    terminal::print_status("File", path.display());
    match &settings.ffmpeg_dir {
        Some(dir) => terminal::print_status("ffmpeg dir", dir.display()),
        None => terminal::print_status("ffmpeg dir", "(PATH)"),
    }
    terminal::print_status("Screenshots", settings.screenshot_dir.display());
    terminal::print_status("Input dir", settings.default_input_dir.display());
    terminal::print_status("Output dir", settings.default_output_dir.display());
    terminal::print_status("Auto preview", settings.auto_load_first_frame);
    terminal::print_status("Preview time", format!("{}s", settings.preview_frame_time));
}
