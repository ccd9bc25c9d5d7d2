//! Media inspection.
//!
//! `MediaProbe` runs ffprobe against a file and turns its JSON report into a
//! `MediaDescriptor`. Missing metadata degrades to documented defaults rather
//! than failing, and the descriptor records which values were estimated.

pub mod descriptor;
pub mod probe;

pub use descriptor::{Estimated, MediaDescriptor};
pub use probe::{DEFAULT_DURATION, DEFAULT_HEIGHT, DEFAULT_WIDTH, MediaProbe};
