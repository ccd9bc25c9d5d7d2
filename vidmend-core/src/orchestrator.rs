// ============================================================================
// vidmend-core/src/orchestrator.rs
// ============================================================================
//
// ORCHESTRATOR: Sequencing of media tasks
//
// A task runs as probe -> argument build -> streamed ffmpeg run -> terminal
// state. The orchestrator owns a single process slot: while one task (or a
// screenshot) is running, any other request on the same instance is refused
// with `TaskBusy`. Cancellation goes through the slot as well, so a
// `CancelHandle` cloned onto another thread can stop whatever is running.
//
// KEY COMPONENTS:
// - TaskOrchestrator: entry point for convert / remove_watermark / screenshot
// - CancelHandle: cloneable cancel trigger scoped to one orchestrator
// - SlotGuard: releases the slot when a task ends, however it ends

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::TaskObserver;
use crate::external::{CommandRunner, ProcessHandle, ProcessRunner, RunOutcome, StreamingProcessRunner};
use crate::ffmpeg_args::{FfmpegArgs, conversion_args, screenshot_args, watermark_args};
use crate::media::{MediaDescriptor, MediaProbe};
use crate::task::{ConversionSpec, TaskOutcome, TaskState, WatermarkSpec};
use crate::utils::{format_clock, normalize_path};

#[derive(Debug, Default)]
struct SlotState {
    busy: bool,
    cancel_requested: bool,
    process: Option<ProcessHandle>,
}

type Slot = Arc<Mutex<SlotState>>;

fn lock(slot: &Slot) -> MutexGuard<'_, SlotState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stops whatever the owning orchestrator is currently running.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    slot: Slot,
}

impl CancelHandle {
    /// Requests cancellation of the active task.
    ///
    /// Kills the running process, or marks the task so its process is killed
    /// as soon as it starts. Does nothing when no task is active.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if !slot.busy {
            log::debug!("Cancel requested with no active task");
            return;
        }
        log::info!("Cancelling active task");
        slot.cancel_requested = true;
        if let Some(process) = &slot.process {
            process.kill();
        }
    }

    /// Whether a task currently holds the slot.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.slot).busy
    }
}

/// Holds the slot for the duration of one task.
struct SlotGuard {
    slot: Slot,
}

impl SlotGuard {
    fn acquire(slot: &Slot) -> CoreResult<Self> {
        let mut state = lock(slot);
        if state.busy {
            return Err(CoreError::TaskBusy);
        }
        *state = SlotState {
            busy: true,
            ..SlotState::default()
        };
        Ok(Self {
            slot: Arc::clone(slot),
        })
    }

    fn cancel_requested(&self) -> bool {
        lock(&self.slot).cancel_requested
    }

    /// Records the running process so it can be cancelled. A cancel that
    /// arrived while the process was starting is applied immediately.
    fn register(&self, process: &ProcessHandle) {
        let mut state = lock(&self.slot);
        if state.cancel_requested {
            process.kill();
        }
        state.process = Some(process.clone());
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *lock(&self.slot) = SlotState::default();
    }
}

/// Forwards events and remembers the last percentage seen.
struct TrackingObserver {
    inner: Arc<dyn TaskObserver>,
    last_progress: Mutex<f64>,
}

impl TrackingObserver {
    fn new(inner: Arc<dyn TaskObserver>) -> Self {
        Self {
            inner,
            last_progress: Mutex::new(0.0),
        }
    }

    fn last_progress(&self) -> f64 {
        *self
            .last_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskObserver for TrackingObserver {
    fn on_progress(&self, percent: f64) {
        *self
            .last_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = percent;
        self.inner.on_progress(percent);
    }

    fn on_log(&self, line: &str) {
        self.inner.on_log(line);
    }
}

/// Runs conversion, watermark removal and screenshot requests, one at a time.
pub struct TaskOrchestrator {
    ffmpeg_path: PathBuf,
    probe: MediaProbe,
    runner: Arc<dyn CommandRunner>,
    streaming: StreamingProcessRunner,
    slot: Slot,
}

impl TaskOrchestrator {
    /// Creates an orchestrator for the tools in `config`.
    ///
    /// Fails with `ToolNotFound` if ffmpeg or ffprobe is missing.
    pub fn new(config: &CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::with_runner(config, Arc::new(ProcessRunner::new())))
    }

    /// Creates an orchestrator whose short-lived invocations (probe and
    /// screenshot) go through `runner`. Tool paths are not validated.
    #[must_use]
    pub fn with_runner(config: &CoreConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            probe: MediaProbe::with_runner(&config.ffprobe_path, Arc::clone(&runner)),
            runner,
            streaming: StreamingProcessRunner::new(),
            slot: Arc::new(Mutex::new(SlotState::default())),
        }
    }

    /// A handle that cancels this orchestrator's active task from any thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Cancels the active task, if any.
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.slot).busy
    }

    /// Inspects a media file with the configured ffprobe.
    pub fn probe(&self, path: &Path) -> CoreResult<MediaDescriptor> {
        self.probe.probe(path)
    }

    /// Converts `spec.input_path` into `spec.format`.
    ///
    /// Once the task has entered `Running` it always ends in a terminal
    /// state: `Ok(Completed)`, `Ok(Cancelled)`, or `Err` with the task marked
    /// `Failed`. `TaskBusy` leaves `spec` untouched.
    pub fn convert(
        &self,
        spec: &mut ConversionSpec,
        observer: Arc<dyn TaskObserver>,
    ) -> CoreResult<TaskOutcome> {
        let guard = SlotGuard::acquire(&self.slot)?;
        spec.state.start()?;
        spec.input_path = normalize_path(&spec.input_path);
        spec.output_path = normalize_path(&spec.output_path);
        log::info!(
            "Conversion {} started: {} -> {} ({}, {} quality, {} resolution)",
            spec.id,
            spec.input_path.display(),
            spec.output_path.display(),
            spec.format,
            spec.quality,
            spec.resolution
        );

        let request = spec.clone();
        self.drive(
            &guard,
            "Conversion",
            &mut spec.state,
            &request.input_path,
            &request.output_path,
            observer,
            |_| Ok(conversion_args(&request)),
        )
    }

    /// Removes the watermark in `spec.region` using `spec.technique`.
    ///
    /// Same lifecycle guarantees as [`TaskOrchestrator::convert`]. A missing
    /// or unusable region ends the task `Failed` with `InvalidTask`.
    pub fn remove_watermark(
        &self,
        spec: &mut WatermarkSpec,
        observer: Arc<dyn TaskObserver>,
    ) -> CoreResult<TaskOutcome> {
        let guard = SlotGuard::acquire(&self.slot)?;
        spec.state.start()?;
        spec.input_path = normalize_path(&spec.input_path);
        spec.output_path = normalize_path(&spec.output_path);
        log::info!(
            "Watermark removal {} started: {} -> {} ({})",
            spec.id,
            spec.input_path.display(),
            spec.output_path.display(),
            spec.technique
        );

        let request = spec.clone();
        self.drive(
            &guard,
            "Watermark removal",
            &mut spec.state,
            &request.input_path,
            &request.output_path,
            observer,
            |media| watermark_args(&request, media.width, media.height),
        )
    }

    /// Writes the frame at `position` of `input` to `output` as an image.
    ///
    /// Runs to completion without streaming. The output directory is created
    /// if needed. Returns the path written.
    pub fn capture_screenshot(
        &self,
        input: &Path,
        output: &Path,
        position: Duration,
    ) -> CoreResult<PathBuf> {
        let _guard = SlotGuard::acquire(&self.slot)?;
        let input = normalize_path(input);
        let output = normalize_path(output);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let args = screenshot_args(&input, &output, position);
        log::info!("Capturing screenshot: {} {}", self.ffmpeg_path.display(), args);
        self.runner.run(&self.ffmpeg_path, &args.to_vec())?;

        if !output.is_file() {
            return Err(CoreError::ProcessFailed {
                tool: "ffmpeg".to_string(),
                code: Some(0),
                stderr: format!("no frame was written to {}", output.display()),
            });
        }
        log::info!("Screenshot saved to {}", output.display());
        Ok(output)
    }

    /// Runs one streamed task and moves `state` to its terminal status.
    #[allow(clippy::too_many_arguments)]
    fn drive<F>(
        &self,
        guard: &SlotGuard,
        kind: &str,
        state: &mut TaskState,
        input: &Path,
        output: &Path,
        observer: Arc<dyn TaskObserver>,
        build_args: F,
    ) -> CoreResult<TaskOutcome>
    where
        F: FnOnce(&MediaDescriptor) -> CoreResult<FfmpegArgs>,
    {
        let tracker = Arc::new(TrackingObserver::new(Arc::clone(&observer)));
        let result = self.execute(guard, kind, input, output, tracker.clone(), build_args);
        state.set_progress(tracker.last_progress());

        let elapsed = format_clock(state.elapsed().unwrap_or_default());
        match result {
            Ok(RunOutcome::Completed) => {
                observer.on_progress(100.0);
                state.complete()?;
                let message = format!("{kind} completed in {elapsed}: {}", output.display());
                log::info!("{message}");
                observer.on_log(&message);
                Ok(TaskOutcome::Completed)
            }
            Ok(RunOutcome::Cancelled) => {
                state.cancel()?;
                let message = format!("{kind} cancelled after {elapsed}");
                log::info!("{message}");
                observer.on_log(&message);
                Ok(TaskOutcome::Cancelled)
            }
            Err(e) => {
                state.fail(e.to_string())?;
                let message = format!("{kind} failed after {elapsed}: {e}");
                log::error!("{message}");
                observer.on_log(&message);
                Err(e)
            }
        }
    }

    fn execute<F>(
        &self,
        guard: &SlotGuard,
        kind: &str,
        input: &Path,
        output: &Path,
        observer: Arc<dyn TaskObserver>,
        build_args: F,
    ) -> CoreResult<RunOutcome>
    where
        F: FnOnce(&MediaDescriptor) -> CoreResult<FfmpegArgs>,
    {
        observer.on_log(&format!(
            "{kind} started: {} -> {}",
            input.display(),
            output.display()
        ));

        let media = self.probe.probe(input)?;
        observer.on_log(&format!(
            "Input: {} {} {} ({}{})",
            media.file_name,
            media.resolution(),
            media.format,
            media.duration_text(),
            if media.estimated.duration { ", estimated" } else { "" }
        ));

        let args = build_args(&media)?;
        observer.on_log(&format!("Command: {} {}", self.ffmpeg_path.display(), args));

        if guard.cancel_requested() {
            log::info!("{kind} cancelled before ffmpeg was started");
            return Ok(RunOutcome::Cancelled);
        }

        // An estimated duration would skew percentages; let the extractor
        // fall back to its elapsed-time heuristic instead.
        let total = (!media.estimated.duration).then_some(media.duration);
        let process = self
            .streaming
            .start(&self.ffmpeg_path, &args.to_vec(), total, observer)?;
        guard.register(&process);
        process.wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use crate::task::{ContainerFormat, RemovalTechnique, TaskStatus};

    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&self, _program: &Path, _args: &[String]) -> CoreResult<String> {
            Err(CoreError::ProcessFailed {
                tool: "ffprobe".to_string(),
                code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            })
        }
    }

    fn orchestrator() -> TaskOrchestrator {
        TaskOrchestrator::with_runner(&CoreConfig::default(), Arc::new(FailingRunner))
    }

    #[test]
    fn busy_slot_rejects_without_touching_spec() {
        let orchestrator = orchestrator();
        let _held = SlotGuard::acquire(&orchestrator.slot).unwrap();
        assert!(orchestrator.is_busy());

        let mut spec = ConversionSpec::new("a.mov", "b.mp4", ContainerFormat::Mp4);
        let err = orchestrator
            .convert(&mut spec, Arc::new(NullObserver))
            .unwrap_err();
        assert!(matches!(err, CoreError::TaskBusy));
        assert_eq!(spec.state.status(), TaskStatus::Pending);

        let err = orchestrator
            .capture_screenshot(Path::new("a.mov"), Path::new("a.png"), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, CoreError::TaskBusy));
    }

    #[test]
    fn slot_is_released_after_failure() {
        let orchestrator = orchestrator();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        fs::write(&input, b"x").unwrap();

        let mut spec = ConversionSpec::new(&input, dir.path().join("out.mp4"), ContainerFormat::Mp4);
        let err = orchestrator
            .convert(&mut spec, Arc::new(NullObserver))
            .unwrap_err();
        assert!(matches!(err, CoreError::ProbeFailed(_)));
        assert_eq!(spec.state.status(), TaskStatus::Failed);
        assert!(!spec.state.error_message().unwrap_or_default().is_empty());
        assert!(!orchestrator.is_busy());
    }

    #[test]
    fn spec_cannot_be_run_twice() {
        let orchestrator = orchestrator();
        let mut spec = WatermarkSpec::new("missing.mp4", "out.mp4", RemovalTechnique::Blur);
        let _ = orchestrator.remove_watermark(&mut spec, Arc::new(NullObserver));
        assert_eq!(spec.state.status(), TaskStatus::Failed);

        let err = orchestrator
            .remove_watermark(&mut spec, Arc::new(NullObserver))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(spec.state.status(), TaskStatus::Failed);
    }

    #[test]
    fn cancel_without_task_is_noop() {
        let orchestrator = orchestrator();
        orchestrator.cancel();
        let handle = orchestrator.cancel_handle();
        handle.cancel();
        assert!(!handle.is_busy());
    }

    #[test]
    fn cancel_before_spawn_is_remembered() {
        let orchestrator = orchestrator();
        let guard = SlotGuard::acquire(&orchestrator.slot).unwrap();
        orchestrator.cancel();
        assert!(guard.cancel_requested());
        drop(guard);

        // The next task starts with a clean slot.
        let guard = SlotGuard::acquire(&orchestrator.slot).unwrap();
        assert!(!guard.cancel_requested());
    }

    #[test]
    fn paths_are_normalized_on_entry() {
        let orchestrator = orchestrator();
        let mut spec = ConversionSpec::new(r"dir\in.mp4", r"dir\out.mp4", ContainerFormat::Mp4);
        let _ = orchestrator.convert(&mut spec, Arc::new(NullObserver));
        assert_eq!(spec.input_path, PathBuf::from("dir/in.mp4"));
        assert_eq!(spec.output_path, PathBuf::from("dir/out.mp4"));
    }
}
