//! Streaming process execution with live progress.
//!
//! The streaming runner starts a long-lived tool, drains stdout and stderr on
//! one thread each for the whole lifetime of the process and reports every
//! line to a `TaskObserver`. Lines from stderr, where ffmpeg writes its stats,
//! are also fed to the `ProgressExtractor`.
//!
//! The returned `ProcessHandle` can be cloned and shared: one thread blocks in
//! `wait()` while another may call `kill()` at any time.

use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::events::TaskObserver;
use crate::progress::ProgressExtractor;

use super::lines::for_each_line;
use super::{hide_console_window, resolve_tool, tool_name};

/// How often `wait()` checks whether the process has exited.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long `wait()` lets the readers drain after a kill. A descendant of
/// the killed tool can keep the pipes open long after the tool itself exits.
const KILLED_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Number of trailing stderr lines kept for the failure diagnostic.
const STDERR_TAIL_LINES: usize = 50;

/// How a streamed process ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code 0.
    Completed,
    /// Terminated through `ProcessHandle::kill`.
    Cancelled,
}

/// Starts tools whose output is observed while they run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingProcessRunner {
    extractor: ProgressExtractor,
}

impl StreamingProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `program` and starts the stream readers.
    ///
    /// `total` is the input's duration, used as the denominator for progress
    /// percentages; `None` switches the extractor to its heuristic.
    pub fn start(
        &self,
        program: &Path,
        args: &[String],
        total: Option<Duration>,
        observer: Arc<dyn TaskObserver>,
    ) -> CoreResult<ProcessHandle> {
        let program = resolve_tool(program)?;
        let tool = tool_name(&program);
        log::debug!("Starting {}: {:?}", program.display(), args);

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console_window(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            log::error!("Failed to start {}: {}", program.display(), e);
            command_start_error(tool.as_str(), e)
        })?;
        log::info!("Started {} (pid {})", tool, child.id());

        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            let observer = Arc::clone(&observer);
            let reader = spawn_reader("stdout", &tool, stdout, move |line| observer.on_log(line));
            match reader {
                Ok(handle) => readers.push(handle),
                Err(e) => return Err(abort_start(child, &tool, e)),
            }
        }

        if let Some(stderr) = child.stderr.take() {
            let observer = Arc::clone(&observer);
            let tail = Arc::clone(&stderr_tail);
            let extractor = self.extractor;
            let reader = spawn_reader("stderr", &tool, stderr, move |line| {
                observer.on_log(line);
                if let Some(percent) = extractor.extract(line, total) {
                    observer.on_progress(percent);
                }
                let mut tail = lock(&tail);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            });
            match reader {
                Ok(handle) => readers.push(handle),
                Err(e) => return Err(abort_start(child, &tool, e)),
            }
        }

        Ok(ProcessHandle {
            inner: Arc::new(ProcessInner {
                tool,
                child: Mutex::new(child),
                killed: AtomicBool::new(false),
                readers: Mutex::new(readers),
                stderr_tail,
                observer,
            }),
        })
    }
}

fn spawn_reader<R, F>(
    stream: &str,
    tool: &str,
    source: R,
    mut on_line: F,
) -> std::io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
    F: FnMut(&str) + Send + 'static,
{
    let label = format!("{tool}-{stream}");
    thread::Builder::new().name(label.clone()).spawn(move || {
        if let Err(e) = for_each_line(source, &mut on_line) {
            log::warn!("Reading {label} failed: {e}");
        }
    })
}

/// Kills a child whose reader threads could not be started.
fn abort_start(mut child: Child, tool: &str, err: std::io::Error) -> crate::error::CoreError {
    log::error!("Failed to start output reader for {tool}: {err}");
    let _ = child.kill();
    let _ = child.wait();
    command_start_error(tool, err)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ProcessInner {
    tool: String,
    child: Mutex<Child>,
    killed: AtomicBool,
    readers: Mutex<Vec<JoinHandle<()>>>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    observer: Arc<dyn TaskObserver>,
}

/// Shared handle to a process started by `StreamingProcessRunner`.
#[derive(Clone)]
pub struct ProcessHandle {
    inner: Arc<ProcessInner>,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("tool", &self.inner.tool)
            .field("killed", &self.inner.killed.load(Ordering::SeqCst))
            .finish()
    }
}

impl ProcessHandle {
    /// OS process id.
    #[must_use]
    pub fn id(&self) -> u32 {
        lock(&self.inner.child).id()
    }

    /// Forcibly terminates the process.
    ///
    /// Safe to call any number of times. Calling it on a process that has
    /// already exited, or was already killed, only produces a notice on the
    /// observer's log feed.
    pub fn kill(&self) {
        let mut child = lock(&self.inner.child);

        match child.try_wait() {
            Ok(Some(status)) => {
                self.notice(&format!(
                    "{} already exited ({status}); nothing to stop",
                    self.inner.tool
                ));
                return;
            }
            Ok(None) => {}
            Err(e) => {
                self.notice(&format!("Could not query {} state: {e}", self.inner.tool));
            }
        }

        if self.inner.killed.swap(true, Ordering::SeqCst) {
            self.notice(&format!("{} is already being stopped", self.inner.tool));
            return;
        }

        match child.kill() {
            Ok(()) => log::info!("Killed {} (pid {})", self.inner.tool, child.id()),
            Err(e) => self.notice(&format!("Error stopping {}: {e}", self.inner.tool)),
        }
    }

    /// Whether `kill()` has terminated (or is terminating) this process.
    #[must_use]
    pub fn was_killed(&self) -> bool {
        self.inner.killed.load(Ordering::SeqCst)
    }

    /// Blocks until the process exits and every output line has been delivered.
    /// After a kill the readers get a short grace period and are then left to
    /// finish on their own.
    ///
    /// Returns `Completed` on exit code 0, `Cancelled` if the process was
    /// killed through this handle, and `ProcessFailed` with the trailing
    /// stderr lines otherwise. The child lock is released between polls so a
    /// concurrent `kill()` is never blocked by a waiting caller.
    pub fn wait(&self) -> CoreResult<RunOutcome> {
        let status = self.wait_for_exit()?;
        self.join_readers();

        if self.was_killed() {
            log::info!("{} stopped on request ({status})", self.inner.tool);
            return Ok(RunOutcome::Cancelled);
        }

        if status.success() {
            return Ok(RunOutcome::Completed);
        }

        let stderr = lock(&self.inner.stderr_tail)
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        log::error!("{} exited with {}", self.inner.tool, status);
        Err(command_failed_error(self.inner.tool.as_str(), status, stderr))
    }

    fn join_readers(&self) {
        let readers: Vec<JoinHandle<()>> = lock(&self.inner.readers).drain(..).collect();
        let deadline = self.was_killed().then(|| Instant::now() + KILLED_DRAIN_TIMEOUT);

        for reader in readers {
            if let Some(deadline) = deadline {
                while !reader.is_finished() && Instant::now() < deadline {
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
                if !reader.is_finished() {
                    log::warn!(
                        "Output of stopped {} is still open; no longer waiting for it",
                        self.inner.tool
                    );
                    continue;
                }
            }
            if reader.join().is_err() {
                log::warn!("An output reader for {} panicked", self.inner.tool);
            }
        }
    }

    fn wait_for_exit(&self) -> CoreResult<ExitStatus> {
        loop {
            {
                let mut child = lock(&self.inner.child);
                match child.try_wait() {
                    Ok(Some(status)) => return Ok(status),
                    Ok(None) => {}
                    Err(e) => return Err(command_wait_error(self.inner.tool.as_str(), e)),
                }
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    fn notice(&self, message: &str) {
        log::info!("{message}");
        self.inner.observer.on_log(message);
    }
}
