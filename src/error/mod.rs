//! Error types and policies for xmlwire operations.
//!
//! This module provides:
//! - `XmlError`: Failure of a single sniff, resolve or copy operation
//! - `ErrorPolicy`: Controls whether batch transcoding fails fast or accumulates errors
//! - `Stage`: Indicates where an error occurred in a transcode job
//! - `SingleIoError`: A single job error with context
//! - `AggregateError`: A collection of errors when using `Accumulate` policy

use std::fmt;

use thiserror::Error;

/// Errors raised while sniffing, resolving, parsing, serializing or copying.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Underlying read, seek or write failure
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// Malformed input detected by a codec
    #[error("format error: {message}")]
    Format { message: String },

    /// The copier met a token kind it cannot forward to a sink
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The selected codec lacks a requested capability
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl XmlError {
    /// Build a `Format` error from any message.
    pub fn format(message: impl Into<String>) -> Self {
        XmlError::Format {
            message: message.into(),
        }
    }

    /// True for failures of the underlying stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, XmlError::Stream(_))
    }
}

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(io) => {
                XmlError::Stream(std::io::Error::new(io.kind(), io.to_string()))
            }
            other => XmlError::format(other.to_string()),
        }
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(e: std::str::Utf8Error) -> Self {
        XmlError::format(format!("invalid UTF-8: {e}"))
    }
}

impl From<std::string::FromUtf8Error> for XmlError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        XmlError::format(format!("invalid UTF-8: {e}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing job
    FastFail,
    /// Run every job and return all errors together
    #[default]
    Accumulate,
}

impl ErrorPolicy {
    /// Parse a policy from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast_fail" | "fastfail" | "fast-fail" => Some(ErrorPolicy::FastFail),
            "accumulate" => Some(ErrorPolicy::Accumulate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Error while turning configuration into jobs
    Configure,
    /// Error while opening the input or output stream
    Open,
    /// Error while detecting the input format or reading its prologue
    Sniff,
    /// Error while forwarding events to the output
    Copy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Configure => write!(f, "Configure"),
            Stage::Open => write!(f, "Open"),
            Stage::Sniff => write!(f, "Sniff"),
            Stage::Copy => write!(f, "Copy"),
        }
    }
}

#[derive(Debug)]
pub struct SingleIoError {
    /// Stage where the error occurred
    pub stage: Stage,
    /// Identifier of the job target (input path, "-" for stdin, etc.)
    pub target: String,
    /// The underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl SingleIoError {
    pub fn new(
        stage: Stage,
        target: impl Into<String>,
        error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            stage,
            target: target.into(),
            error: error.into(),
        }
    }
}

impl fmt::Display for SingleIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.target, self.error)
    }
}

impl std::error::Error for SingleIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// An aggregate of multiple job errors.
///
/// This is returned when using `ErrorPolicy::Accumulate` and multiple errors occurred.
#[derive(Debug, Error)]
pub struct AggregateError {
    /// Collection of individual errors
    pub errors: Vec<SingleIoError>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "transcoding encountered {} error(s):", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            writeln!(f, "  #{}: {}", i + 1, e)?;
        }
        Ok(())
    }
}

impl AggregateError {
    /// Create a new aggregate error with a single error.
    pub fn single(error: SingleIoError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Check if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl From<SingleIoError> for AggregateError {
    fn from(error: SingleIoError) -> Self {
        Self::single(error)
    }
}

#[cfg(feature = "miette")]
mod miette_impl;

#[cfg(feature = "miette")]
pub use miette_impl::*;
