//! Implementation of the `watermark` subcommand.

use std::time::Instant;

use anyhow::{Context, bail};
use vidmend_core::utils::format_clock;
use vidmend_core::{CoreConfig, TaskOrchestrator, WatermarkSpec};

use super::{RunReport, check_input, check_output, run_observed};
use crate::cli::WatermarkArgs;
use crate::error::CliResult;
use crate::terminal;

pub fn run_watermark(args: &WatermarkArgs, config: &CoreConfig, verbose: bool) -> CliResult<()> {
    check_input(&args.input)?;
    check_output(&args.input, &args.output)?;
    if args.region.is_empty() {
        bail!("Region {} has no area", args.region);
    }

    let orchestrator = TaskOrchestrator::new(config).context("Cannot start watermark removal")?;
    let mut spec =
        WatermarkSpec::new(&args.input, &args.output, args.method).with_region(args.region);

    terminal::print_section("Watermark removal");
    terminal::print_status("Input", args.input.display());
    terminal::print_status("Output", args.output.display());
    terminal::print_status("Region", args.region);
    terminal::print_status("Method", args.method);

    let started = Instant::now();
    let report = run_observed(&orchestrator, "Removing", verbose, args.timeout, |observer| {
        orchestrator.remove_watermark(&mut spec, observer)
    })
    .with_context(|| format!("Watermark removal on {} failed", args.input.display()))?;

    match report {
        RunReport::Completed => {
            terminal::print_success(&format!(
                "Watermark removed in {}",
                format_clock(started.elapsed())
            ));
            terminal::print_status("Saved to", spec.output_path.display());
            Ok(())
        }
        RunReport::TimedOut => bail!(
            "Watermark removal timed out after {}s",
            args.timeout.unwrap_or_default()
        ),
        RunReport::Cancelled => bail!("Watermark removal cancelled"),
    }
}
