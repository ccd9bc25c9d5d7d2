//! Progress extraction from ffmpeg log lines.
//!
//! ffmpeg reports its position on stderr in lines such as
//!
//! ```text
//! frame= 1234 fps= 25 q=28.0 size=   12345kB time=00:01:23.45 bitrate=1234.5kbits/s speed=1.23x
//! ```
//!
//! The extractor looks at one line at a time and turns the `time=` token into
//! a percentage of the input's total duration. It never fails: a line that is
//! not a progress line simply yields `None`.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::parse_ffmpeg_time;

/// Marker for the elapsed-time field.
pub const TIME_MARKER: &str = "time=";
/// Marker for the frame-rate field.
pub const FPS_MARKER: &str = "fps=";

/// Highest value the extractor reports when the total duration is known.
/// Only the orchestrator reports 100, and only after a clean exit.
pub const MAX_STREAMED_PERCENT: f64 = 99.0;
/// Ceiling of the heuristic used when the total duration is unknown.
pub const MAX_ESTIMATED_PERCENT: f64 = 90.0;
/// Seconds of output per heuristic percentage point.
const ESTIMATE_SECS_PER_PERCENT: f64 = 10.0;

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("time pattern is valid")
});

/// Stateless parser turning ffmpeg stats lines into percentages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressExtractor;

impl ProgressExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the percentage complete for a progress line, or `None` for any other line.
    ///
    /// With a positive `total` the result is `floor(elapsed / total * 100)`
    /// clamped to `0..=99`. Without one, the result is an approximation:
    /// `min(90, floor(elapsed_secs / 10))`.
    #[must_use]
    pub fn extract(&self, line: &str, total: Option<Duration>) -> Option<f64> {
        let elapsed = Self::elapsed(line)?;
        let elapsed_secs = elapsed.as_secs_f64();

        match total.map(|t| t.as_secs_f64()).filter(|&t| t > 0.0) {
            Some(total_secs) => Some(
                (elapsed_secs / total_secs * 100.0)
                    .floor()
                    .clamp(0.0, MAX_STREAMED_PERCENT),
            ),
            None => Some(
                (elapsed_secs / ESTIMATE_SECS_PER_PERCENT)
                    .floor()
                    .min(MAX_ESTIMATED_PERCENT),
            ),
        }
    }

    /// Returns the elapsed output time of a progress line.
    ///
    /// Both the `time=` and `fps=` markers must be present; lines with only
    /// one of them are unrelated log noise.
    #[must_use]
    pub fn elapsed(line: &str) -> Option<Duration> {
        if !(line.contains(TIME_MARKER) && line.contains(FPS_MARKER)) {
            return None;
        }
        let token = TIME_PATTERN.captures(line)?.get(1)?.as_str();
        parse_ffmpeg_time(token).and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_line(time: &str) -> String {
        format!(
            "frame= 1234 fps= 25 q=28.0 size=   12345kB time={time} bitrate=1234.5kbits/s speed=1.23x"
        )
    }

    #[test]
    fn known_total_uses_ratio() {
        let extractor = ProgressExtractor::new();
        let pct = extractor.extract(&stats_line("00:01:23.45"), Some(Duration::from_secs(600)));
        assert_eq!(pct, Some(13.0));
    }

    #[test]
    fn unknown_total_uses_heuristic() {
        let extractor = ProgressExtractor::new();
        assert_eq!(extractor.extract(&stats_line("00:05:00.00"), None), Some(30.0));
        assert_eq!(
            extractor.extract(&stats_line("00:05:00.00"), Some(Duration::ZERO)),
            Some(30.0)
        );
        assert_eq!(extractor.extract(&stats_line("01:00:00.00"), None), Some(90.0));
        assert_eq!(extractor.extract(&stats_line("00:00:09.99"), None), Some(0.0));
    }

    #[test]
    fn known_total_is_clamped_below_completion() {
        let extractor = ProgressExtractor::new();
        let total = Some(Duration::from_secs(60));
        assert_eq!(extractor.extract(&stats_line("00:01:00.00"), total), Some(99.0));
        assert_eq!(extractor.extract(&stats_line("00:02:30.00"), total), Some(99.0));
        assert_eq!(extractor.extract(&stats_line("00:00:59.99"), total), Some(99.0));
    }

    #[test]
    fn requires_both_markers() {
        let extractor = ProgressExtractor::new();
        let total = Some(Duration::from_secs(600));
        assert_eq!(extractor.extract("size=  1024kB time=00:00:10.00 bitrate=1k", total), None);
        assert_eq!(extractor.extract("frame=  10 fps= 25 q=28.0", total), None);
        assert_eq!(extractor.extract("Stream #0:0: Video: h264", total), None);
        assert_eq!(extractor.extract("", total), None);
    }

    #[test]
    fn unparseable_time_is_skipped() {
        let extractor = ProgressExtractor::new();
        let total = Some(Duration::from_secs(600));
        assert_eq!(extractor.extract(&stats_line("N/A"), total), None);
        assert_eq!(extractor.extract(&stats_line("-00:00:00.02"), total), None);
        assert_eq!(extractor.extract(&stats_line("1:2:3"), total), None);
    }

    #[test]
    fn hours_are_not_width_limited() {
        assert_eq!(
            ProgressExtractor::elapsed(&stats_line("123:00:00.50")),
            Some(Duration::from_secs_f64(442_800.5))
        );
    }

    #[test]
    fn oversized_hours_yield_nothing() {
        let extractor = ProgressExtractor::new();
        let line = "frame=1 fps=1 time=100000000000000000:00:00.00 speed=1x";
        assert_eq!(ProgressExtractor::elapsed(line), None);
        assert_eq!(extractor.extract(line, Some(Duration::from_secs(600))), None);
        assert_eq!(extractor.extract(line, None), None);
    }

    #[test]
    fn percentages_stay_in_range_and_never_decrease() {
        let extractor = ProgressExtractor::new();
        for total_secs in [1u64, 7, 60, 600, 5400] {
            let total = Some(Duration::from_secs(total_secs));
            let mut last = 0.0;
            for step in 0..=(total_secs * 3) {
                let elapsed = Duration::from_millis(step * 500);
                let line = stats_line(&crate::utils::format_timestamp(elapsed));
                let pct = extractor.extract(&line, total).expect("progress line");
                assert!((0.0..=99.0).contains(&pct), "{pct} out of range");
                assert!(pct >= last, "{pct} < {last}");
                last = pct;
            }
        }
    }

    #[test]
    fn heuristic_matches_formula() {
        let extractor = ProgressExtractor::new();
        for secs in (0..2000).step_by(37) {
            let line = stats_line(&crate::utils::format_timestamp(Duration::from_secs(secs)));
            let expected = ((secs as f64) / 10.0).floor().min(90.0);
            assert_eq!(extractor.extract(&line, None), Some(expected));
        }
    }
}
