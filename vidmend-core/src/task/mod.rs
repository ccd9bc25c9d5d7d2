// ============================================================================
// vidmend-core/src/task/mod.rs
// ============================================================================
//
// TASKS: Task descriptions and their shared lifecycle
//
// A task is created `Pending` by the caller, handed to the orchestrator, and
// driven through `Running` into exactly one terminal state. Only the
// orchestrator mutates the lifecycle record; callers read it.
//
//     Pending -> Running -> { Completed | Failed | Cancelled }

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::{CoreError, CoreResult};

pub mod conversion;
pub mod watermark;

pub use conversion::{ContainerFormat, ConversionSpec, Quality, Resolution};
pub use watermark::{Region, RemovalTechnique, WatermarkSpec};

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Completed, Failed and Cancelled are final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Cancelled)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// How a task that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Cancelled,
}

/// Lifecycle record shared by every task kind.
#[derive(Debug, Clone)]
pub struct TaskState {
    status: TaskStatus,
    progress: u8,
    created_at: DateTime<Local>,
    started_at: Option<DateTime<Local>>,
    completed_at: Option<DateTime<Local>>,
    error_message: Option<String>,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskState {
    /// A fresh `Pending` record stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: TaskStatus::Pending,
            progress: 0,
            created_at: Local::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Percentage complete, 0 to 100.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Time from start to completion, or to now while still running.
    /// `None` until the task has started.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at?;
        let end = self.completed_at.unwrap_or_else(Local::now);
        Some((end - started).to_std().unwrap_or_default())
    }

    pub(crate) fn start(&mut self) -> CoreResult<()> {
        self.transition(TaskStatus::Running)?;
        self.started_at = Some(Local::now());
        Ok(())
    }

    pub(crate) fn set_progress(&mut self, percent: f64) {
        if self.status == TaskStatus::Running {
            self.progress = percent.clamp(0.0, 100.0) as u8;
        }
    }

    pub(crate) fn complete(&mut self) -> CoreResult<()> {
        self.transition(TaskStatus::Completed)?;
        self.progress = 100;
        self.completed_at = Some(Local::now());
        Ok(())
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) -> CoreResult<()> {
        self.transition(TaskStatus::Failed)?;
        let message = message.into();
        self.error_message = Some(if message.trim().is_empty() {
            "Task failed without a diagnostic".to_string()
        } else {
            message
        });
        self.completed_at = Some(Local::now());
        Ok(())
    }

    pub(crate) fn cancel(&mut self) -> CoreResult<()> {
        self.transition(TaskStatus::Cancelled)?;
        self.completed_at = Some(Local::now());
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        log::debug!("Task transition {} -> {}", self.status, next);
        self.status = next;
        Ok(())
    }
}
