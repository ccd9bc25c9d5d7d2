//! Implementation of the `screenshot` subcommand.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use vidmend_core::utils::format_timestamp;
use vidmend_core::validation::{safe_file_name, unique_output_path};
use vidmend_core::{CoreConfig, TaskOrchestrator};

use super::check_input;
use crate::cli::ScreenshotArgs;
use crate::error::CliResult;
use crate::terminal;

/// `<screenshot_dir>/<stem>_screenshot.png`, numbered if already taken.
pub fn default_screenshot_path(input: &Path, screenshot_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = safe_file_name(&format!("{stem}_screenshot"));
    unique_output_path(screenshot_dir, &base, "png")
}

/// Seek position from `--at`, else the configured preview time.
pub fn capture_position(at: Option<f64>, config: &CoreConfig) -> CliResult<Duration> {
    match at {
        None => Ok(config.preview_frame_time),
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(position) => Ok(position),
            Err(_) => bail!("Position must be a non-negative number of seconds, got {secs}"),
        },
    }
}

pub fn run_screenshot(args: &ScreenshotArgs, config: &CoreConfig) -> CliResult<()> {
    check_input(&args.input)?;
    let position = capture_position(args.at, config)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_screenshot_path(&args.input, &config.screenshot_dir));

    let orchestrator = TaskOrchestrator::new(config).context("Cannot capture screenshot")?;
    let saved = orchestrator
        .capture_screenshot(&args.input, &output, position)
        .with_context(|| {
            format!(
                "Screenshot of {} at {} failed",
                args.input.display(),
                format_timestamp(position)
            )
        })?;

    terminal::print_success(&format!("Captured frame at {}", format_timestamp(position)));
    terminal::print_status("Saved to", saved.display());
    Ok(())
}
