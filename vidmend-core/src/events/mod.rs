// ============================================================================
// vidmend-core/src/events/mod.rs
// ============================================================================
//
// EVENTS: Progress and log delivery from running tasks
//
// A running task produces two feeds: percentage updates and raw tool output
// lines. Both are delivered through the `TaskObserver` trait, which is called
// from the stream reader threads, so implementations must be `Send + Sync`.
//
// KEY COMPONENTS:
// - TaskEvent: owned form of one event, used by the channel observer
// - TaskObserver: the observer trait consumed by the runners and orchestrator
// - NullObserver / LogObserver / ChannelObserver: stock implementations

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// One event emitted while a task runs.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// Percentage complete, 0.0 to 100.0.
    Progress(f64),
    /// One line of raw process output.
    Log(String),
}

/// Receives progress and log events from a running task.
///
/// Calls arrive from the stdout and stderr reader threads concurrently.
/// Lines from one stream arrive in the order the process wrote them; there is
/// no ordering between the two streams.
pub trait TaskObserver: Send + Sync {
    /// Called with a percentage whenever a progress line is recognised.
    fn on_progress(&self, percent: f64);

    /// Called for every line the process writes, and for notices from the core.
    fn on_log(&self, line: &str);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TaskObserver for NullObserver {
    fn on_progress(&self, _percent: f64) {}

    fn on_log(&self, _line: &str) {}
}

/// Observer that forwards events to the `log` facade.
///
/// Tool output goes to the `ffmpeg_log` target at debug level, so it stays out
/// of normal console output but lands in file logs configured for debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl TaskObserver for LogObserver {
    fn on_progress(&self, percent: f64) {
        log::debug!(target: "vidmend::progress", "Progress: {percent:.0}%");
    }

    fn on_log(&self, line: &str) {
        log::debug!(target: "ffmpeg_log", "{line}");
    }
}

/// Observer that turns events into `TaskEvent`s on a channel.
///
/// Events sent after the receiver is dropped are silently discarded.
#[derive(Debug)]
pub struct ChannelObserver {
    sender: Mutex<Sender<TaskEvent>>,
}

impl ChannelObserver {
    /// Creates an observer and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<TaskEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }

    fn send(&self, event: TaskEvent) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(event);
        }
    }
}

impl TaskObserver for ChannelObserver {
    fn on_progress(&self, percent: f64) {
        self.send(TaskEvent::Progress(percent));
    }

    fn on_log(&self, line: &str) {
        self.send(TaskEvent::Log(line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn channel_observer_delivers_events_in_order() {
        let (observer, events) = ChannelObserver::new();
        observer.on_log("first");
        observer.on_progress(12.0);
        observer.on_log("second");
        drop(observer);

        let received: Vec<TaskEvent> = events.iter().collect();
        assert_eq!(
            received,
            vec![
                TaskEvent::Log("first".to_string()),
                TaskEvent::Progress(12.0),
                TaskEvent::Log("second".to_string()),
            ]
        );
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (observer, events) = ChannelObserver::new();
        drop(events);
        observer.on_log("nobody is listening");
        observer.on_progress(50.0);
    }

    #[test]
    fn channel_observer_is_shareable_across_threads() {
        let (observer, events) = ChannelObserver::new();
        let observer = Arc::new(observer);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let observer = Arc::clone(&observer);
                thread::spawn(move || observer.on_log(&format!("line {i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(observer);
        assert_eq!(events.iter().count(), 4);
    }
}
