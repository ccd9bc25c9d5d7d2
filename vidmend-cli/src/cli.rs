// vidmend-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vidmend_core::{ContainerFormat, Quality, Region, RemovalTechnique, Resolution};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Vidmend: video conversion and watermark removal",
    long_about = "Converts videos between containers, removes watermarks and captures frames using ffmpeg via the vidmend-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing ffmpeg and ffprobe (overrides the saved setting)
    #[arg(long, global = true, value_name = "DIR", env = "VIDMEND_FFMPEG_DIR")]
    pub ffmpeg_dir: Option<PathBuf>,

    /// Settings file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write daily log files to DIR instead of logging to the console
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Debug logging and raw ffmpeg output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shows duration, frame size and codecs of a media file
    Probe(ProbeArgs),
    /// Converts a video into another container
    Convert(ConvertArgs),
    /// Removes a watermark from a rectangular region
    Watermark(WatermarkArgs),
    /// Saves a single frame as an image
    Screenshot(ScreenshotArgs),
    /// Shows or changes saved settings
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Video to convert
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// Converted file to write
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output container: mp4, avi, mov or mkv (defaults to the output extension)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ContainerFormat>,

    /// Quality tier: high, normal, low or custom
    #[arg(long, value_name = "QUALITY", default_value = "normal")]
    pub quality: Quality,

    /// Output size: original, 4k, 2k, 1080p, 720p or 480p
    #[arg(long, value_name = "RESOLUTION", default_value = "original")]
    pub resolution: Resolution,

    /// Cancel the conversion after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct WatermarkArgs {
    /// Video with the watermark
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// Cleaned file to write
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Watermark rectangle in source pixels
    #[arg(long, value_name = "X,Y,W,H")]
    pub region: Region,

    /// Removal method: blur, mosaic, crop, delogo or inpaint
    #[arg(long, value_name = "METHOD", default_value = "blur")]
    pub method: RemovalTechnique,

    /// Cancel the removal after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ScreenshotArgs {
    /// Video to capture from
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// Image to write (defaults to a new file in the screenshot directory)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Position in seconds (defaults to the preview frame time)
    #[arg(long, value_name = "SECONDS")]
    pub at: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Prints the saved settings
    Show,
    /// Saves the directory holding ffmpeg and ffprobe
    SetFfmpegDir {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Saves the default screenshot directory
    SetScreenshotDir {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Restores every setting to its default
    Reset,
}
