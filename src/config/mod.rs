//! Configuration types for transcode jobs.
//!
//! This module provides:
//! - `TranscodeJob`: One input to transcode into one output
//! - `FileExistsPolicy`: Policy for handling existing output files
//! - `TranscodeConfig`: Serde-backed description of a batch of jobs

mod pipeline;
mod spec;

pub use pipeline::{ConfigError, JobConfig, TranscodeConfig};
pub use spec::{FileExistsPolicy, TranscodeJob};
