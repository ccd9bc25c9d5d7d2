//! Implementation of the `convert` subcommand.
//!
//! Validates the paths, picks the container (explicit `--format`, else the
//! output extension, else MP4) and runs the conversion with a progress bar.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, bail};
use log::{debug, info};
use vidmend_core::utils::format_clock;
use vidmend_core::{ContainerFormat, ConversionSpec, CoreConfig, TaskOrchestrator, format_file_size};

use super::{RunReport, check_input, check_output, run_observed};
use crate::cli::ConvertArgs;
use crate::error::CliResult;
use crate::terminal;

/// Container to write when `--format` is absent.
pub fn infer_format(output: &Path) -> ContainerFormat {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

pub fn run_convert(args: &ConvertArgs, config: &CoreConfig, verbose: bool) -> CliResult<()> {
    check_input(&args.input)?;
    check_output(&args.input, &args.output)?;

    let format = args.format.unwrap_or_else(|| infer_format(&args.output));
    debug!("Output container: {format}");

    let orchestrator = TaskOrchestrator::new(config).context("Cannot start conversion")?;
    let mut spec = ConversionSpec::new(&args.input, &args.output, format)
        .with_quality(args.quality)
        .with_resolution(args.resolution);

    terminal::print_section("Conversion");
    terminal::print_status("Input", args.input.display());
    terminal::print_status("Output", args.output.display());
    terminal::print_status("Format", format);
    terminal::print_status("Quality", args.quality);
    terminal::print_status("Resolution", args.resolution);

    let started = Instant::now();
    let report = run_observed(&orchestrator, "Converting", verbose, args.timeout, |observer| {
        orchestrator.convert(&mut spec, observer)
    })
    .with_context(|| format!("Conversion of {} failed", args.input.display()))?;

    match report {
        RunReport::Completed => {
            let size = std::fs::metadata(&spec.output_path).map(|m| m.len()).unwrap_or(0);
            terminal::print_success(&format!(
                "Converted in {}",
                format_clock(started.elapsed())
            ));
            terminal::print_status("Output size", format_file_size(size));
            info!("Conversion {} finished", spec.id);
            Ok(())
        }
        RunReport::TimedOut => bail!(
            "Conversion timed out after {}s",
            args.timeout.unwrap_or_default()
        ),
        RunReport::Cancelled => bail!("Conversion cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(infer_format(Path::new("out.MKV")), ContainerFormat::Mkv);
        assert_eq!(infer_format(Path::new("out.mov")), ContainerFormat::Mov);
        assert_eq!(infer_format(Path::new("out.webm")), ContainerFormat::Mp4);
        assert_eq!(infer_format(Path::new("out")), ContainerFormat::Mp4);
    }
}
