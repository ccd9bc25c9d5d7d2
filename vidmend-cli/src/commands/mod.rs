//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand. The streamed tasks (convert and
//! watermark) share [`run_observed`], which wires the orchestrator's events
//! to the terminal and applies `--timeout`.

pub mod config;
pub mod convert;
pub mod probe;
pub mod screenshot;
pub mod watermark;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use vidmend_core::validation::{is_supported_video_file, is_valid_output_path};
use vidmend_core::{ChannelObserver, CoreResult, TaskObserver, TaskOrchestrator, TaskOutcome};

use crate::error::CliResult;
use crate::progress::{ProgressDisplay, Watchdog};

/// How a streamed task ended from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    Completed,
    Cancelled,
    TimedOut,
}

/// Runs one streamed task with a progress bar and optional timeout.
pub fn run_observed<F>(
    orchestrator: &TaskOrchestrator,
    label: &str,
    verbose: bool,
    timeout: Option<u64>,
    task: F,
) -> CoreResult<RunReport>
where
    F: FnOnce(Arc<dyn TaskObserver>) -> CoreResult<TaskOutcome>,
{
    let (observer, events) = ChannelObserver::new();
    let display = ProgressDisplay::spawn(label, events, verbose);

    let watchdog = timeout.and_then(|secs| {
        Watchdog::arm(orchestrator.cancel_handle(), Duration::from_secs(secs))
            .map_err(|e| log::warn!("Timeout not applied: {e}"))
            .ok()
    });

    let result = task(Arc::new(observer));
    let timed_out = watchdog.is_some_and(Watchdog::disarm);
    let summary = display.finish();
    log::debug!(
        "{label} reported {:.0}% over {} output lines",
        summary.last_percent,
        summary.lines
    );

    Ok(match result? {
        TaskOutcome::Completed => RunReport::Completed,
        TaskOutcome::Cancelled if timed_out => RunReport::TimedOut,
        TaskOutcome::Cancelled => RunReport::Cancelled,
    })
}

/// Rejects inputs that are missing or not a recognised video file.
pub fn check_input(input: &Path) -> CliResult<()> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }
    if !is_supported_video_file(input) {
        bail!("Unsupported input file type: {}", input.display());
    }
    Ok(())
}

/// Rejects outputs whose directory does not exist or that overwrite the input.
pub fn check_output(input: &Path, output: &Path) -> CliResult<()> {
    if !is_valid_output_path(output) {
        bail!(
            "Output directory does not exist for {}",
            output.display()
        );
    }
    if input == output {
        bail!("Output must differ from input: {}", output.display());
    }
    Ok(())
}
