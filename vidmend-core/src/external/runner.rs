//! Run-to-completion process execution.
//!
//! Used for short invocations whose output is only useful once the process
//! has exited: the ffprobe inspection and single-frame screenshots.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{CoreResult, command_failed_error, command_start_error};

use super::{hide_console_window, resolve_tool, tool_name};

/// Something that can run a program to completion and return its stdout.
///
/// The seam exists so the probe and screenshot paths can be driven by a
/// scripted implementation in tests.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and returns its standard output.
    ///
    /// Fails with `ToolNotFound` if the program does not exist and with
    /// `ProcessFailed` (carrying stderr) on a nonzero exit.
    fn run(&self, program: &Path, args: &[String]) -> CoreResult<String>;
}

/// `CommandRunner` backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> CoreResult<String> {
        let program = resolve_tool(program)?;
        let tool = tool_name(&program);
        log::debug!("Running {}: {:?}", program.display(), args);

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console_window(&mut cmd);

        let output = cmd.output().map_err(|e| {
            log::error!("Failed to start {}: {}", program.display(), e);
            command_start_error(tool.as_str(), e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("{} exited with {}: {}", tool, output.status, stderr);
            return Err(command_failed_error(tool, output.status, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
