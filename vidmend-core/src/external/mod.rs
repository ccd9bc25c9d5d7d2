// ============================================================================
// vidmend-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Running ffmpeg and ffprobe as subprocesses
//
// This module owns every interaction with the external executables. Short
// invocations (probe, screenshot) go through the `CommandRunner` trait so the
// callers can be exercised with scripted runners in tests. Long invocations
// (conversion, watermark removal) go through the streaming runner, which
// drains both output streams while the process runs.
//
// KEY COMPONENTS:
// - resolve_tool: eager check that a configured executable exists
// - CommandRunner / ProcessRunner: run-to-completion with captured output
// - StreamingProcessRunner / ProcessHandle: observable, killable runs

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CoreError, CoreResult};

mod lines;
pub mod runner;
pub mod streaming;

pub use runner::{CommandRunner, ProcessRunner};
pub use streaming::{ProcessHandle, RunOutcome, StreamingProcessRunner};

/// Confirms that `tool` names an existing executable and returns its path.
///
/// A bare program name (no directory component) is looked up on `PATH` and
/// must be executable there; anything else must point at an existing file.
pub fn resolve_tool(tool: &Path) -> CoreResult<PathBuf> {
    let is_bare_name = tool.components().count() == 1 && !tool.is_absolute();

    if is_bare_name {
        match which::which(tool) {
            Ok(found) => {
                log::debug!("Resolved {} on PATH: {}", tool.display(), found.display());
                return Ok(found);
            }
            Err(e) => log::debug!("{} not found on PATH: {e}", tool.display()),
        }
    }

    if tool.is_file() {
        Ok(tool.to_path_buf())
    } else {
        log::warn!("External tool not found: {}", tool.display());
        Err(CoreError::ToolNotFound(tool.to_path_buf()))
    }
}

/// Short name of a tool for messages, e.g. `/opt/bin/ffmpeg.exe` -> `ffmpeg`.
pub(crate) fn tool_name(tool: &Path) -> String {
    tool.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string())
}

/// Keeps spawned tools from opening a console window on Windows.
#[cfg(windows)]
pub(crate) fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub(crate) fn hide_console_window(_cmd: &mut Command) {}
