// vidmend-core/tests/common/mod.rs
//
// Shared helpers for the process tests: small shell scripts standing in for
// ffmpeg and ffprobe, plus an event collector.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use vidmend_core::{CoreConfig, CoreConfigBuilder, TaskEvent};

/// ffprobe report for a 10 second 640x360 clip.
pub const PROBE_JSON: &str = r#"{
  "streams": [
    {"codec_type": "video", "codec_name": "h264", "width": 640, "height": 360, "avg_frame_rate": "25/1"},
    {"codec_type": "audio", "codec_name": "aac"}
  ],
  "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "10.000000"}
}"#;

/// Writes an executable shell script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// A fake ffprobe that prints `PROBE_JSON`.
pub fn fake_ffprobe(dir: &Path) -> PathBuf {
    write_script(dir, "ffprobe", &format!("cat <<'JSON'\n{PROBE_JSON}\nJSON"))
}

/// Config pointing at a fake ffprobe and an ffmpeg script with `ffmpeg_body`.
pub fn fake_tools(dir: &Path, ffmpeg_body: &str) -> CoreConfig {
    let ffprobe = fake_ffprobe(dir);
    let ffmpeg = write_script(dir, "ffmpeg", ffmpeg_body);
    CoreConfigBuilder::new()
        .ffmpeg_path(ffmpeg)
        .ffprobe_path(ffprobe)
        .screenshot_dir(dir.join("shots"))
        .build()
}

/// A dummy input file the probe can stat.
pub fn input_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"not really a video").expect("write input");
    path
}

/// Everything the observer has received so far.
pub fn drain(events: &Receiver<TaskEvent>) -> (Vec<f64>, Vec<String>) {
    let mut progress = Vec::new();
    let mut lines = Vec::new();
    while let Ok(event) = events.recv_timeout(Duration::from_millis(10)) {
        match event {
            TaskEvent::Progress(p) => progress.push(p),
            TaskEvent::Log(line) => lines.push(line),
        }
    }
    (progress, lines)
}

/// Blocks until a log line containing `needle` arrives, returning the lines
/// seen on the way. Panics after five seconds.
pub fn wait_for_line(events: &Receiver<TaskEvent>, needle: &str) -> Vec<String> {
    let mut seen = Vec::new();
    loop {
        match events.recv_timeout(Duration::from_secs(5)) {
            Ok(TaskEvent::Log(line)) => {
                let found = line.contains(needle);
                seen.push(line);
                if found {
                    return seen;
                }
            }
            Ok(TaskEvent::Progress(_)) => {}
            Err(e) => panic!("no line containing {needle:?} ({e}); saw {seen:?}"),
        }
    }
}
