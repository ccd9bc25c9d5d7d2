// ============================================================================
// vidmend-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the vidmend-core library
//
// Every fallible operation in the library returns `CoreResult<T>`. Process
// failures carry the captured stderr text so callers can surface the tool's
// own diagnostic. Cancellation never appears here; it is an outcome
// (`TaskOutcome::Cancelled`), not an error.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::task::TaskStatus;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The configured executable does not exist.
    #[error("External tool not found at '{}'", .0.display())]
    ToolNotFound(PathBuf),

    /// The process ran but exited with a nonzero status.
    #[error("{tool} failed with exit code {}: {stderr}", display_code(.code))]
    ProcessFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The OS refused to start the process.
    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    /// Waiting on a running process failed.
    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    /// The inspection tool failed or the target file could not be read.
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// The task cannot be turned into a command line.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A lifecycle transition that the task state machine forbids.
    #[error("Invalid task transition from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Another task is already running on this orchestrator.
    #[error("Another task is already running")]
    TaskBusy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a `CommandStart` error for the named tool.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Builds a `CommandWait` error for the named tool.
pub fn command_wait_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

/// Builds a `ProcessFailed` error from an exit status and captured stderr.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::ProcessFailed {
        tool: tool.into(),
        code: status.code(),
        stderr: stderr.into(),
    }
}
