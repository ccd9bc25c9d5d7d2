//! Core library for driving ffmpeg and ffprobe as observable, cancellable tasks.
//!
//! This crate probes media files, builds conversion, watermark-removal and
//! screenshot command lines, runs ffmpeg while streaming its output and
//! progress to an observer, and tracks each task through its lifecycle.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidmend_core::{
//!     ContainerFormat, ConversionSpec, CoreConfig, LogObserver, Quality, TaskOrchestrator,
//! };
//!
//! let config = CoreConfig::from_binary_dir("/opt/ffmpeg/bin");
//! let orchestrator = TaskOrchestrator::new(&config).unwrap();
//!
//! let mut spec = ConversionSpec::new("in.mov", "out.mp4", ContainerFormat::Mp4)
//!     .with_quality(Quality::High);
//! let outcome = orchestrator.convert(&mut spec, Arc::new(LogObserver)).unwrap();
//! println!("{outcome:?} in {:?}", spec.state.elapsed());
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod ffmpeg_args;
pub mod file_logging;
pub mod media;
pub mod orchestrator;
pub mod progress;
pub mod task;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use config::{ConfigStore, CoreConfig, CoreConfigBuilder, JsonConfigStore, StoredSettings};
pub use error::{CoreError, CoreResult};
pub use events::{ChannelObserver, LogObserver, NullObserver, TaskEvent, TaskObserver};
pub use external::{
    CommandRunner, ProcessHandle, ProcessRunner, RunOutcome, StreamingProcessRunner,
};
pub use media::{Estimated, MediaDescriptor, MediaProbe};
pub use orchestrator::{CancelHandle, TaskOrchestrator};
pub use progress::ProgressExtractor;
pub use task::{
    ContainerFormat, ConversionSpec, Quality, Region, RemovalTechnique, Resolution, TaskOutcome,
    TaskState, TaskStatus, WatermarkSpec,
};
pub use utils::{format_file_size, parse_ffmpeg_time};
