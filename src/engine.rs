//! Batch transcoding engine.

use std::io::Write;
use std::sync::Arc;

use crate::config::{FileExistsPolicy, TranscodeConfig, TranscodeJob};
use crate::copy::copy;
use crate::error::{AggregateError, ErrorPolicy, SingleIoError, Stage, XmlError};
use crate::format::WireFormat;
use crate::io::{
    FileInput, FileOutput, InputProvider, InputStream, OutputTarget, StdinInput, StdoutOutput,
};
use crate::resolve::{resolve_reader, resolve_writer};

/// Read `input` in whichever format it is in and write it to `out` as `format`.
///
/// Returns the writer once the document has been flushed.
pub fn transcode<W: Write>(input: InputStream, out: W, format: WireFormat) -> Result<W, XmlError> {
    let mut parser = resolve_reader(input)?;
    let mut serializer = resolve_writer(out, format)?;
    copy(&mut parser, &mut serializer)?;
    serializer.into_inner()
}

/// Engine running a batch of transcode jobs.
#[derive(Debug)]
pub struct TranscodeEngine {
    error_policy: ErrorPolicy,
    jobs: Vec<TranscodeJob>,
}

impl TranscodeEngine {
    /// Create a new engine.
    pub fn new(error_policy: ErrorPolicy, jobs: Vec<TranscodeJob>) -> Self {
        Self { error_policy, jobs }
    }

    /// Build an engine from a configuration, resolving paths into providers.
    ///
    /// `-` names stdin for inputs and stdout for outputs.
    pub fn from_config(config: TranscodeConfig) -> Result<Self, AggregateError> {
        let error_policy = match config.error_policy.as_deref() {
            None => ErrorPolicy::default(),
            Some(s) => ErrorPolicy::from_str(s).ok_or_else(|| {
                SingleIoError::new(
                    Stage::Configure,
                    "error_policy",
                    format!("unknown error policy '{s}'"),
                )
            })?,
        };

        let mut jobs = Vec::with_capacity(config.jobs.len());
        let mut errors = Vec::new();
        for job in config.jobs {
            let id = job.id.clone().unwrap_or_else(|| job.input.clone());
            let policy = match job.file_exists_policy.as_deref() {
                None => FileExistsPolicy::default(),
                Some(s) => match FileExistsPolicy::from_str(s) {
                    Some(p) => p,
                    None => {
                        errors.push(SingleIoError::new(
                            Stage::Configure,
                            id,
                            format!("unknown file exists policy '{s}'"),
                        ));
                        continue;
                    }
                },
            };

            let input: Arc<dyn InputProvider> = if job.input == "-" {
                Arc::new(StdinInput::new())
            } else {
                Arc::new(FileInput::new(job.input.into()))
            };
            let output: Arc<dyn OutputTarget> = if job.output == "-" {
                Arc::new(StdoutOutput::new())
            } else {
                Arc::new(FileOutput::new(job.output.into()))
            };
            let format = job
                .format
                .or(config.default_format)
                .unwrap_or_default();

            jobs.push(
                TranscodeJob::new(id, input, output)
                    .with_format(format)
                    .with_file_exists_policy(policy),
            );
        }

        if !errors.is_empty() {
            return Err(AggregateError { errors });
        }
        Ok(Self::new(error_policy, jobs))
    }

    /// Get the error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Get the jobs.
    pub fn jobs(&self) -> &[TranscodeJob] {
        &self.jobs
    }

    /// Run every job, returning how many succeeded.
    ///
    /// If error_policy is FastFail, stops at the first error.
    /// If error_policy is Accumulate, runs all jobs and collects all errors.
    pub fn run(&self) -> Result<usize, AggregateError> {
        let mut done = 0;
        let mut errors = Vec::new();

        for job in &self.jobs {
            match self.run_job(job) {
                Ok(()) => {
                    tracing::info!(job = %job.id, format = %job.format, "transcoded");
                    done += 1;
                }
                Err(e) => {
                    tracing::warn!(job = %job.id, error = %e, "transcode failed");
                    errors.push(e);
                    if matches!(self.error_policy, ErrorPolicy::FastFail) {
                        return Err(AggregateError { errors });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(done)
        } else {
            Err(AggregateError { errors })
        }
    }

    /// Run a single job.
    ///
    /// The output is only opened once the input has been resolved, so an
    /// unreadable input never truncates an existing output. A job writing to
    /// the file it reads from is rejected before either is opened.
    pub fn run_job(&self, job: &TranscodeJob) -> Result<(), SingleIoError> {
        if same_file(job) {
            return Err(SingleIoError::new(
                Stage::Open,
                job.output.id(),
                "output is the same file as the input",
            ));
        }

        let stream = job
            .input
            .open()
            .map_err(|e| SingleIoError::new(Stage::Open, job.input.id(), e))?;

        let mut parser =
            resolve_reader(stream).map_err(|e| SingleIoError::new(Stage::Sniff, job.input.id(), e))?;

        let writer = self.open_output(job)?;

        let mut serializer = resolve_writer(writer, job.format)
            .map_err(|e| SingleIoError::new(Stage::Copy, job.output.id(), e))?;
        copy(&mut parser, &mut serializer)
            .map_err(|e| SingleIoError::new(Stage::Copy, job.output.id(), e))
    }

    /// Open an output based on the file exists policy.
    fn open_output(&self, job: &TranscodeJob) -> Result<Box<dyn Write + Send>, SingleIoError> {
        let target = &job.output;
        let result = match job.file_exists_policy {
            FileExistsPolicy::Overwrite => target.open_overwrite(),
            FileExistsPolicy::Error => {
                if target.exists() {
                    return Err(SingleIoError::new(
                        Stage::Open,
                        target.id(),
                        "output already exists",
                    ));
                }
                target.open_overwrite()
            }
        };

        result.map_err(|e| SingleIoError::new(Stage::Open, target.id(), e))
    }
}

/// Whether a job would overwrite the file it reads from.
fn same_file(job: &TranscodeJob) -> bool {
    let (Some(input), Some(output)) = (job.input.local_path(), job.output.local_path()) else {
        return false;
    };
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => input == output,
    }
}
