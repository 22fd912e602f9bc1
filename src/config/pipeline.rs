//! Batch configuration loaded from YAML or JSON.

#[cfg(feature = "config")]
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::format::WireFormat;

/// Configuration for a batch of transcode jobs.
///
/// ```yaml
/// error_policy: accumulate
/// default_format: binary
/// jobs:
///   - input: settings.xml
///     output: settings.abx
///     file_exists_policy: overwrite
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscodeConfig {
    /// Jobs to run, in order
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    /// Error policy: "fast_fail" or "accumulate"
    #[serde(default)]
    pub error_policy: Option<String>,
    /// Output format for jobs that do not name one
    #[serde(default)]
    pub default_format: Option<WireFormat>,
}

/// Configuration for a single job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Identifier; defaults to the input path
    #[serde(default)]
    pub id: Option<String>,
    /// Input path, "-" for stdin
    pub input: String,
    /// Output path, "-" for stdout
    pub output: String,
    /// Output format: "text" or "binary"
    #[serde(default)]
    pub format: Option<WireFormat>,
    /// File exists policy: "overwrite" or "error"
    #[serde(default)]
    pub file_exists_policy: Option<String>,
}

impl JobConfig {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: None,
            input: input.into(),
            output: output.into(),
            format: None,
            file_exists_policy: None,
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the file exists policy.
    pub fn with_file_exists_policy(mut self, policy: impl Into<String>) -> Self {
        self.file_exists_policy = Some(policy.into());
        self
    }
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config extension: {0}")]
    UnknownExtension(String),
}

impl TranscodeConfig {
    /// Create a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job.
    pub fn add_job(mut self, job: JobConfig) -> Self {
        self.jobs.push(job);
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: impl Into<String>) -> Self {
        self.error_policy = Some(policy.into());
        self
    }

    /// Set the default output format.
    pub fn with_default_format(mut self, format: WireFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Load a configuration file, choosing YAML or JSON by extension.
    #[cfg(feature = "config")]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            other => Err(ConfigError::UnknownExtension(other.to_string())),
        }
    }
}
