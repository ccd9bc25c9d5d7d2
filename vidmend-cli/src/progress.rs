// ============================================================================
// vidmend-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal display of a running task
//
// The core delivers progress and log lines through a `ChannelObserver`. A
// display thread drains that channel into an indicatif bar; with `--verbose`
// the raw ffmpeg lines are printed above the bar. A separate watchdog thread
// implements `--timeout` by cancelling through the orchestrator's
// `CancelHandle`.

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use vidmend_core::{CancelHandle, TaskEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn init_progress_bar(label: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("  ⧖ {msg}: {pos:>3}% [{bar:30}] {elapsed_precise}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.");
    pb.set_style(style);
    pb.set_message(label.to_string());

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders task events until stopped.
pub struct ProgressDisplay {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<ProgressSummary>>,
}

/// What the display saw over the task's lifetime.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgressSummary {
    pub last_percent: f64,
    pub lines: usize,
}

impl ProgressDisplay {
    /// Starts rendering events from `events`.
    pub fn spawn(label: &str, events: Receiver<TaskEvent>, verbose: bool) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let pb = init_progress_bar(label);
        let worker = {
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("progress-display".to_string())
                .spawn(move || render(&pb, &events, &stop, verbose))
                .map_err(|e| log::warn!("Progress display unavailable: {e}"))
                .ok()
        };
        Self { stop, worker }
    }

    /// Drains anything still queued, clears the bar and returns the summary.
    pub fn finish(mut self) -> ProgressSummary {
        self.stop.store(true, Ordering::SeqCst);
        self.worker
            .take()
            .and_then(|worker| worker.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for ProgressDisplay {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

fn render(
    pb: &ProgressBar,
    events: &Receiver<TaskEvent>,
    stop: &AtomicBool,
    verbose: bool,
) -> ProgressSummary {
    let mut summary = ProgressSummary::default();
    let mut handle = |event: TaskEvent| match event {
        TaskEvent::Progress(percent) => {
            summary.last_percent = percent;
            pb.set_position(percent.clamp(0.0, 100.0) as u64);
        }
        TaskEvent::Log(line) => {
            summary.lines += 1;
            if verbose {
                pb.println(format!("    {line}"));
            }
            log::debug!(target: "ffmpeg_log", "{line}");
        }
    };

    loop {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => handle(event),
            Err(RecvTimeoutError::Timeout) if !stop.load(Ordering::SeqCst) => {}
            Err(_) => break,
        }
    }
    while let Ok(event) = events.try_recv() {
        handle(event);
    }
    pb.finish_and_clear();
    summary
}

/// Cancels the active task if it is still running after a deadline.
pub struct Watchdog {
    disarm: Sender<()>,
    worker: JoinHandle<bool>,
}

impl Watchdog {
    /// Arms a timer that calls `cancel.cancel()` after `timeout`.
    pub fn arm(cancel: CancelHandle, timeout: Duration) -> std::io::Result<Self> {
        let (disarm, disarmed) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("task-timeout".to_string())
            .spawn(move || match disarmed.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Timed out after {}s; cancelling", timeout.as_secs());
                    cancel.cancel();
                    true
                }
                _ => false,
            })?;
        Ok(Self { disarm, worker })
    }

    /// Stops the timer. Returns whether it had already fired.
    pub fn disarm(self) -> bool {
        let _ = self.disarm.send(());
        self.worker.join().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tracks_last_progress() {
        let (tx, rx) = mpsc::channel();
        let display = ProgressDisplay::spawn("Testing", rx, false);
        tx.send(TaskEvent::Log("ffmpeg version".into())).unwrap();
        tx.send(TaskEvent::Progress(42.0)).unwrap();
        tx.send(TaskEvent::Progress(100.0)).unwrap();

        let summary = display.finish();
        assert_eq!(summary.last_percent, 100.0);
        assert_eq!(summary.lines, 1);
    }

    #[test]
    fn finish_returns_with_sender_alive() {
        let (_tx, rx) = mpsc::channel::<TaskEvent>();
        let display = ProgressDisplay::spawn("Testing", rx, false);
        assert_eq!(display.finish(), ProgressSummary::default());
    }
}
