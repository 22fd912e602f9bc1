//! Job specifications.

use std::sync::Arc;

use crate::format::WireFormat;
use crate::io::{InputProvider, OutputTarget};

/// Policy for handling existing output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileExistsPolicy {
    /// Overwrite existing files
    Overwrite,
    #[default]
    /// Return an error if file exists
    Error,
}

impl FileExistsPolicy {
    /// Parse a policy from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Some(FileExistsPolicy::Overwrite),
            "error" => Some(FileExistsPolicy::Error),
            _ => None,
        }
    }
}

/// Specification for a single transcode job.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    /// Identifier used in errors and logs
    pub id: String,
    /// Where the document is read from; its format is sniffed
    pub input: Arc<dyn InputProvider>,
    /// Where the transcoded document is written
    pub output: Arc<dyn OutputTarget>,
    /// Format to write
    pub format: WireFormat,
    /// Policy for handling existing output
    pub file_exists_policy: FileExistsPolicy,
}

impl TranscodeJob {
    /// Create a job writing the process default format.
    pub fn new(
        id: impl Into<String>,
        input: Arc<dyn InputProvider>,
        output: Arc<dyn OutputTarget>,
    ) -> Self {
        Self {
            id: id.into(),
            input,
            output,
            format: WireFormat::default(),
            file_exists_policy: FileExistsPolicy::default(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the file exists policy.
    pub fn with_file_exists_policy(mut self, policy: FileExistsPolicy) -> Self {
        self.file_exists_policy = policy;
        self
    }
}
