//! Miette integration for pretty error reporting.

use miette::{Diagnostic, Severity};
use thiserror::Error;

use super::{AggregateError, SingleIoError, Stage, XmlError};

/// A diagnostic wrapper for transcode errors compatible with miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct IoDiagnostic {
    /// The error message
    pub message: String,

    #[source]
    /// The underlying error source
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,

    #[help]
    /// Help text for the user
    pub help: Option<String>,

    #[diagnostic(severity)]
    /// Severity level
    pub severity: Severity,
}

fn help_for(e: &SingleIoError) -> String {
    if let Some(xml) = e.error.downcast_ref::<XmlError>() {
        match xml {
            XmlError::Format { .. } => {
                return "The input is neither well-formed text XML nor a valid binary document"
                    .into();
            }
            XmlError::Unsupported(_) => {
                return "The output format cannot represent this document; try the binary format".into();
            }
            _ => {}
        }
    }
    match e.stage {
        Stage::Configure => "Check the pipeline configuration file".into(),
        Stage::Open => "Check that the paths exist and the file-exists policy allows writing".into(),
        Stage::Sniff | Stage::Copy => "Check your input documents".into(),
    }
}

impl From<SingleIoError> for IoDiagnostic {
    fn from(e: SingleIoError) -> Self {
        let help = help_for(&e);
        IoDiagnostic {
            message: format!("[{}] on '{}'", e.stage, e.target),
            source: Some(e.error),
            help: Some(help),
            severity: Severity::Error,
        }
    }
}

impl From<AggregateError> for IoDiagnostic {
    fn from(agg: AggregateError) -> Self {
        let first = agg.errors.into_iter().next();
        if let Some(e) = first {
            IoDiagnostic::from(e)
        } else {
            IoDiagnostic {
                message: "Unknown transcode error".into(),
                source: None,
                help: None,
                severity: Severity::Error,
            }
        }
    }
}

impl From<AggregateError> for miette::Report {
    fn from(agg: AggregateError) -> Self {
        miette::Report::new(IoDiagnostic::from(agg))
    }
}
