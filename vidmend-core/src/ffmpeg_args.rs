//! FFmpeg and ffprobe argument construction.
//!
//! Every invocation the core makes is built here as an argv vector. The
//! builder also remembers which arguments are paths or filter graphs so the
//! command line written to the log can quote them.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::task::{ConversionSpec, Region, RemovalTechnique, WatermarkSpec};
use crate::utils::{format_timestamp, normalize_path};

/// Strength of the Gaussian blur applied to a region.
pub const BLUR_SIGMA: u32 = 20;
/// Cell grid the mosaic technique downsamples a region to.
pub const MOSAIC_CELLS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Plain(String),
    Quoted(String),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(s) | Arg::Quoted(s) => s,
        }
    }
}

/// Ordered argument list for one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfmpegArgs {
    args: Vec<Arg>,
}

impl FfmpegArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// Appends several bare arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|a| Arg::Plain(a.into())));
        self
    }

    /// Appends an argument that is quoted when rendered.
    #[must_use]
    pub fn quoted(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Quoted(arg.into()));
        self
    }

    /// Appends a path with forward slashes, quoted when rendered.
    #[must_use]
    pub fn path(self, path: &Path) -> Self {
        let path = normalize_path(path);
        self.quoted(path.to_string_lossy().into_owned())
    }

    /// The argv vector handed to the process, without quoting.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.args.iter().map(|a| a.value().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Value following the first occurrence of `flag`.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a.value() == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(Arg::value)
    }

    #[must_use]
    pub fn contains(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a.value() == arg)
    }
}

/// Renders the list as a single command line for logging.
impl fmt::Display for FfmpegArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match arg {
                Arg::Plain(s) => f.write_str(s)?,
                Arg::Quoted(s) => write!(f, "\"{s}\"")?,
            }
        }
        Ok(())
    }
}

/// Comma-joined chain of simple filters.
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter; empty strings are ignored.
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Joins the chain, `None` when nothing was added.
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Inspection arguments: JSON format and stream sections.
#[must_use]
pub fn probe_args(input: &Path) -> FfmpegArgs {
    FfmpegArgs::new()
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .path(input)
}

/// Transcode arguments for a conversion task.
#[must_use]
pub fn conversion_args(spec: &ConversionSpec) -> FfmpegArgs {
    let mut args = FfmpegArgs::new()
        .args(["-y", "-allowed_extensions", "ALL", "-i"])
        .path(&spec.input_path)
        .args(spec.quality.video_args().iter().copied());

    if let Some((width, height)) = spec.resolution.dimensions() {
        args = args.arg("-s").arg(format!("{width}x{height}"));
    }

    args.args(["-c:a", "aac", "-b:a", "128k", "-f"])
        .arg(spec.format.muxer())
        .path(&spec.output_path)
}

/// Filter graph that applies `technique` to `region` of a
/// `frame_width` x `frame_height` frame.
///
/// Fails with `InvalidTask` for an empty region, and for a crop that would
/// leave nothing of the frame.
pub fn watermark_filter(
    technique: RemovalTechnique,
    region: Region,
    frame_width: u32,
    frame_height: u32,
) -> CoreResult<String> {
    if region.is_empty() {
        return Err(CoreError::InvalidTask(format!(
            "Watermark region {region} has no area"
        )));
    }

    let Region {
        x,
        y,
        width: w,
        height: h,
    } = region;

    let graph = match technique {
        RemovalTechnique::Blur => overlay_graph(
            region,
            VideoFilterChain::new()
                .add_filter(format!("crop={w}:{h}:{x}:{y}"))
                .add_filter(format!("gblur=sigma={BLUR_SIGMA}")),
        ),
        RemovalTechnique::Mosaic => overlay_graph(
            region,
            VideoFilterChain::new()
                .add_filter(format!("crop={w}:{h}:{x}:{y}"))
                .add_filter(format!("scale={MOSAIC_CELLS}:{MOSAIC_CELLS}"))
                .add_filter(format!("scale={w}:{h}:flags=neighbor")),
        ),
        RemovalTechnique::Crop => {
            if !region.fits_within(frame_width, frame_height)
                || w >= frame_width
                || h >= frame_height
            {
                return Err(CoreError::InvalidTask(format!(
                    "Crop region {region} does not fit inside the {frame_width}x{frame_height} frame"
                )));
            }
            format!("crop={}:{}:0:0", frame_width - w, frame_height - h)
        }
        RemovalTechnique::Delogo => format!("delogo=x={x}:y={y}:w={w}:h={h}"),
        RemovalTechnique::Inpaint => {
            format!("drawbox=x={x}:y={y}:w={w}:h={h}:color=black:t=fill")
        }
    };
    Ok(graph)
}

/// Splits the input, runs `chain` on one branch and lays the result back
/// over the original at the region's origin.
fn overlay_graph(region: Region, chain: VideoFilterChain) -> String {
    let effect = chain.build().unwrap_or_default();
    format!(
        "split[main][tmp];[tmp]{effect}[fx];[main][fx]overlay={}:{}",
        region.x, region.y
    )
}

/// Arguments for a watermark removal task.
///
/// `frame_width`/`frame_height` are the probed input dimensions; only the
/// crop technique uses them.
pub fn watermark_args(
    spec: &WatermarkSpec,
    frame_width: u32,
    frame_height: u32,
) -> CoreResult<FfmpegArgs> {
    let region = spec.region.ok_or_else(|| {
        CoreError::InvalidTask("No watermark region selected".to_string())
    })?;
    let graph = watermark_filter(spec.technique, region, frame_width, frame_height)?;

    Ok(FfmpegArgs::new()
        .args(["-y", "-i"])
        .path(&spec.input_path)
        .arg("-vf")
        .quoted(graph)
        .path(&spec.output_path))
}

/// Arguments that extract the single frame at `position`.
#[must_use]
pub fn screenshot_args(input: &Path, output: &Path, position: Duration) -> FfmpegArgs {
    FfmpegArgs::new()
        .args(["-y", "-ss"])
        .arg(format_timestamp(position))
        .arg("-i")
        .path(input)
        .args(["-vframes", "1", "-q:v", "2"])
        .path(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ContainerFormat, Quality, Resolution};

    #[test]
    fn normal_mp4_conversion() {
        let spec = ConversionSpec::new("a.mov", "b.mp4", ContainerFormat::Mp4);
        let args = conversion_args(&spec);

        assert_eq!(args.value_of("-crf"), Some("23"));
        assert!(!args.contains("-s"));
        assert_eq!(args.value_of("-f"), Some("mp4"));
        assert!(args.to_string().ends_with("\"b.mp4\""));
        assert_eq!(
            args.to_string(),
            "-y -allowed_extensions ALL -i \"a.mov\" -c:v libx264 -crf 23 -preset medium \
             -c:a aac -b:a 128k -f mp4 \"b.mp4\""
        );
    }

    #[test]
    fn argv_is_unquoted() {
        let spec = ConversionSpec::new("a.mov", "b.mp4", ContainerFormat::Mp4);
        let argv = conversion_args(&spec).to_vec();
        assert_eq!(argv.last().map(String::as_str), Some("b.mp4"));
        assert!(argv.iter().all(|a| !a.contains('"')));
    }

    #[test]
    fn scaled_mkv_conversion() {
        let spec = ConversionSpec::new("in.avi", "out.mkv", ContainerFormat::Mkv)
            .with_quality(Quality::Low)
            .with_resolution(Resolution::Hd720p);
        let args = conversion_args(&spec);

        assert_eq!(args.value_of("-s"), Some("1280x720"));
        assert_eq!(args.value_of("-crf"), Some("28"));
        assert_eq!(args.value_of("-preset"), Some("fast"));
        assert_eq!(args.value_of("-f"), Some("matroska"));
    }

    #[test]
    fn custom_quality_has_no_video_codec() {
        let spec = ConversionSpec::new("in.avi", "out.mov", ContainerFormat::Mov)
            .with_quality(Quality::Custom);
        let args = conversion_args(&spec);
        assert!(!args.contains("-c:v"));
        assert!(!args.contains("-crf"));
        assert_eq!(args.value_of("-c:a"), Some("aac"));
    }

    #[test]
    fn paths_use_forward_slashes() {
        let spec = ConversionSpec::new(r"C:\clips\a.mov", r"C:\out\b.mp4", ContainerFormat::Mp4);
        let argv = conversion_args(&spec).to_vec();
        assert!(argv.contains(&"C:/clips/a.mov".to_string()));
        assert!(argv.contains(&"C:/out/b.mp4".to_string()));
    }

    #[test]
    fn probe_arguments() {
        let args = probe_args(Path::new("movie.mkv"));
        assert_eq!(
            args.to_vec(),
            vec![
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "movie.mkv"
            ]
        );
    }

    #[test]
    fn filter_graphs() {
        let region = Region::new(10, 20, 100, 50);
        assert_eq!(
            watermark_filter(RemovalTechnique::Blur, region, 1920, 1080).unwrap(),
            "split[main][tmp];[tmp]crop=100:50:10:20,gblur=sigma=20[fx];[main][fx]overlay=10:20"
        );
        assert_eq!(
            watermark_filter(RemovalTechnique::Mosaic, region, 1920, 1080).unwrap(),
            "split[main][tmp];[tmp]crop=100:50:10:20,scale=10:10,scale=100:50:flags=neighbor[fx];[main][fx]overlay=10:20"
        );
        assert_eq!(
            watermark_filter(RemovalTechnique::Crop, region, 1920, 1080).unwrap(),
            "crop=1820:1030:0:0"
        );
        assert_eq!(
            watermark_filter(RemovalTechnique::Delogo, region, 1920, 1080).unwrap(),
            "delogo=x=10:y=20:w=100:h=50"
        );
        assert_eq!(
            watermark_filter(RemovalTechnique::Inpaint, region, 1920, 1080).unwrap(),
            "drawbox=x=10:y=20:w=100:h=50:color=black:t=fill"
        );
    }

    #[test]
    fn rejects_unusable_regions() {
        let empty = Region::new(10, 10, 0, 50);
        assert!(matches!(
            watermark_filter(RemovalTechnique::Blur, empty, 1920, 1080),
            Err(CoreError::InvalidTask(_))
        ));

        let outside = Region::new(1900, 0, 100, 50);
        assert!(matches!(
            watermark_filter(RemovalTechnique::Crop, outside, 1920, 1080),
            Err(CoreError::InvalidTask(_))
        ));

        let whole = Region::new(0, 0, 1920, 1080);
        assert!(watermark_filter(RemovalTechnique::Crop, whole, 1920, 1080).is_err());
    }

    #[test]
    fn watermark_requires_region() {
        let spec = WatermarkSpec::new("in.mp4", "out.mp4", RemovalTechnique::Delogo);
        assert!(matches!(
            watermark_args(&spec, 1920, 1080),
            Err(CoreError::InvalidTask(_))
        ));
    }

    #[test]
    fn watermark_command_line() {
        let spec = WatermarkSpec::new("in.mp4", "out.mp4", RemovalTechnique::Delogo)
            .with_region(Region::new(1, 2, 3, 4));
        let args = watermark_args(&spec, 1920, 1080).unwrap();
        assert_eq!(
            args.to_string(),
            "-y -i \"in.mp4\" -vf \"delogo=x=1:y=2:w=3:h=4\" \"out.mp4\""
        );
    }

    #[test]
    fn screenshot_arguments() {
        let args = screenshot_args(
            Path::new("in.mp4"),
            Path::new("shots/frame.png"),
            Duration::from_millis(3_723_456),
        );
        assert_eq!(args.value_of("-ss"), Some("01:02:03.456"));
        assert_eq!(args.value_of("-vframes"), Some("1"));
        assert_eq!(args.value_of("-q:v"), Some("2"));
        assert_eq!(args.to_vec().last().map(String::as_str), Some("shots/frame.png"));
    }

    #[test]
    fn empty_filter_chain() {
        assert_eq!(VideoFilterChain::new().add_filter("").build(), None);
    }
}
