//! Implementation of the `probe` subcommand.

use anyhow::{Context, bail};
use vidmend_core::{MediaDescriptor, MediaProbe};

use crate::cli::ProbeArgs;
use crate::error::CliResult;
use crate::terminal;

pub fn run_probe(args: &ProbeArgs, probe: &MediaProbe) -> CliResult<()> {
    if !args.file.is_file() {
        bail!("Input file not found: {}", args.file.display());
    }
    let media = probe
        .probe(&args.file)
        .with_context(|| format!("Cannot inspect {}", args.file.display()))?;
    print_descriptor(&media);
    Ok(())
}

fn print_descriptor(media: &MediaDescriptor) {
    terminal::print_section(&media.file_name);
    terminal::print_status("Format", &media.format);
    terminal::print_status("Duration", media.duration_text());
    terminal::print_status("Resolution", media.resolution());
    terminal::print_status("File size", media.size_text());
    if !media.video_codec.is_empty() {
        terminal::print_status("Video codec", &media.video_codec);
    }
    if !media.audio_codec.is_empty() {
        terminal::print_status("Audio codec", &media.audio_codec);
    }
    if media.frame_rate > 0.0 {
        terminal::print_status("Frame rate", format!("{:.2} fps", media.frame_rate));
    }
    if media.estimated.duration {
        terminal::print_warning("Duration was not reported; showing a default");
    }
    if media.estimated.dimensions {
        terminal::print_warning("Frame size was not reported; showing a default");
    }
}
