//! End-to-end and error-policy tests for TranscodeEngine.

use std::io::Write;
use std::sync::Arc;

use crate::config::{FileExistsPolicy, JobConfig, TranscodeConfig, TranscodeJob};
use crate::engine::{TranscodeEngine, transcode};
use crate::error::{ErrorPolicy, Stage, XmlError};
use crate::format::{MAGIC, WireFormat};
use crate::io::{
    Capability, FileInput, FileOutput, InMemorySink, InMemorySource, InputProvider, InputStream,
    OutputTarget,
};

const DOC: &str = r#"<root><child name="x">text</child></root>"#;

fn job(
    id: &str,
    source: InMemorySource,
    sink: &Arc<InMemorySink>,
    format: WireFormat,
) -> TranscodeJob {
    TranscodeJob::new(id, Arc::new(source), sink.clone())
        .with_format(format)
        .with_file_exists_policy(FileExistsPolicy::Overwrite)
}

#[derive(Debug)]
struct FailingInput;

impl InputProvider for FailingInput {
    fn id(&self) -> &str {
        "failing"
    }

    fn open(&self) -> std::io::Result<InputStream> {
        Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "simulated network timeout",
        ))
    }
}

#[test]
fn engine_transcodes_text_to_binary() {
    let sink = Arc::new(InMemorySink::new("out"));
    let engine = TranscodeEngine::new(
        ErrorPolicy::FastFail,
        vec![job(
            "doc",
            InMemorySource::from_string("in", DOC),
            &sink,
            WireFormat::Binary,
        )],
    );

    assert_eq!(engine.run().unwrap(), 1);
    assert_eq!(&sink.contents()[..4], &MAGIC);
}

#[test]
fn engine_reads_every_capability() {
    for capability in [
        Capability::Positional,
        Capability::Bufferable,
        Capability::Sequential,
    ] {
        let sink = Arc::new(InMemorySink::new("out"));
        let source = InMemorySource::from_string("in", DOC).with_capability(capability);
        let engine = TranscodeEngine::new(
            ErrorPolicy::FastFail,
            vec![job("doc", source, &sink, WireFormat::Text)],
        );
        engine.run().unwrap();
        assert!(
            sink.contents_string().ends_with(DOC),
            "{capability}: {}",
            sink.contents_string()
        );
    }
}

#[test]
fn fast_fail_stops_at_first_error() {
    let sink = Arc::new(InMemorySink::new("out"));
    let failing = TranscodeJob::new("bad", Arc::new(FailingInput), sink.clone());
    let good = job(
        "good",
        InMemorySource::from_string("in", DOC),
        &sink,
        WireFormat::Text,
    );

    let engine = TranscodeEngine::new(ErrorPolicy::FastFail, vec![failing, good]);
    let err = engine.run().unwrap_err();

    assert_eq!(err.len(), 1);
    assert_eq!(err.errors[0].stage, Stage::Open);
    assert_eq!(err.errors[0].target, "failing");
    assert!(!sink.exists());
}

#[test]
fn accumulate_runs_every_job() {
    let good_sink = Arc::new(InMemorySink::new("good"));
    let bad_sink = Arc::new(InMemorySink::new("bad"));
    let jobs = vec![
        TranscodeJob::new("open", Arc::new(FailingInput), bad_sink.clone()),
        job(
            "parse",
            InMemorySource::from_string("in", "<a><b></a>"),
            &bad_sink,
            WireFormat::Text,
        ),
        job(
            "good",
            InMemorySource::from_string("in", DOC),
            &good_sink,
            WireFormat::Binary,
        ),
    ];

    let engine = TranscodeEngine::new(ErrorPolicy::Accumulate, jobs);
    let err = engine.run().unwrap_err();

    assert_eq!(err.len(), 2);
    assert_eq!(err.errors[0].stage, Stage::Open);
    assert_eq!(err.errors[1].stage, Stage::Copy);
    assert!(good_sink.exists());
}

#[test]
fn bad_binary_prologue_fails_in_sniff_stage() {
    let sink = Arc::new(InMemorySink::new("out"));
    let source = InMemorySource::new("in", MAGIC.to_vec());
    let engine = TranscodeEngine::new(
        ErrorPolicy::FastFail,
        vec![job("truncated", source, &sink, WireFormat::Text)],
    );

    let err = engine.run().unwrap_err();
    assert_eq!(err.errors[0].stage, Stage::Sniff);
    assert!(
        err.errors[0]
            .error
            .downcast_ref::<XmlError>()
            .is_some_and(|e| matches!(e, XmlError::Format { .. }))
    );
    // The output is never opened for an unreadable input.
    assert!(!sink.exists());
}

#[test]
fn existing_output_is_kept_under_error_policy() {
    let sink = Arc::new(InMemorySink::new("out"));
    sink.open_overwrite().unwrap().write_all(b"keep me").unwrap();

    let job = TranscodeJob::new(
        "doc",
        Arc::new(InMemorySource::from_string("in", DOC)),
        sink.clone(),
    )
    .with_format(WireFormat::Text)
    .with_file_exists_policy(FileExistsPolicy::Error);

    let err = TranscodeEngine::new(ErrorPolicy::FastFail, vec![job])
        .run()
        .unwrap_err();
    assert_eq!(err.errors[0].stage, Stage::Open);
    assert!(err.errors[0].to_string().contains("already exists"));
    assert_eq!(sink.contents_string(), "keep me");
}

#[test]
fn append_policy_is_rejected() {
    let config = TranscodeConfig::new()
        .add_job(JobConfig::new("in.xml", "out.xml").with_file_exists_policy("append"));

    let err = TranscodeEngine::from_config(config).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.errors[0].stage, Stage::Configure);
    assert!(err.errors[0].to_string().contains("append"));
}

#[test]
fn second_overwrite_leaves_one_readable_document() {
    let sink = Arc::new(InMemorySink::new("out"));
    for format in [WireFormat::Text, WireFormat::Binary] {
        let make = |name: &str| {
            TranscodeJob::new(
                name,
                Arc::new(InMemorySource::from_string("in", format!("<{name}/>"))),
                sink.clone(),
            )
            .with_format(format)
            .with_file_exists_policy(FileExistsPolicy::Overwrite)
        };
        TranscodeEngine::new(ErrorPolicy::FastFail, vec![make("a"), make("b")])
            .run()
            .unwrap();

        let text = transcode(
            InputStream::from_bytes(sink.contents()),
            Vec::new(),
            WireFormat::Text,
        )
        .unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.ends_with("<b/>"), "{format}: {text}");
        assert!(!text.contains("<a/>"), "{format}: {text}");
    }
}

#[test]
fn output_that_is_the_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.xml");
    let doc = format!("<root>{}</root>", "<item/>".repeat(4096));
    std::fs::write(&path, &doc).unwrap();

    let aliased = dir.path().join(".").join("settings.xml");
    let job = TranscodeJob::new(
        "in-place",
        Arc::new(FileInput::new(path.clone())),
        Arc::new(FileOutput::new(aliased)),
    )
    .with_format(WireFormat::Binary)
    .with_file_exists_policy(FileExistsPolicy::Overwrite);

    let err = TranscodeEngine::new(ErrorPolicy::FastFail, vec![job])
        .run()
        .unwrap_err();
    assert_eq!(err.errors[0].stage, Stage::Open);
    assert!(err.errors[0].to_string().contains("same file"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), doc);
}

#[test]
fn from_config_resolves_jobs() {
    let config = TranscodeConfig::new()
        .with_error_policy("fast_fail")
        .with_default_format(WireFormat::Text)
        .add_job(JobConfig::new("in.xml", "out.abx").with_format(WireFormat::Binary))
        .add_job(JobConfig::new("-", "-").with_file_exists_policy("overwrite"));

    let engine = TranscodeEngine::from_config(config).unwrap();
    assert_eq!(engine.error_policy(), ErrorPolicy::FastFail);

    let jobs = engine.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "in.xml");
    assert_eq!(jobs[0].format, WireFormat::Binary);
    assert_eq!(jobs[0].file_exists_policy, FileExistsPolicy::Error);
    assert_eq!(jobs[1].input.id(), "-");
    assert_eq!(jobs[1].output.id(), "-");
    assert_eq!(jobs[1].format, WireFormat::Text);
    assert_eq!(jobs[1].file_exists_policy, FileExistsPolicy::Overwrite);
}

#[test]
fn from_config_reports_every_bad_policy() {
    let config = TranscodeConfig::new()
        .add_job(JobConfig::new("a", "b").with_file_exists_policy("clobber"))
        .add_job(JobConfig::new("c", "d").with_file_exists_policy("sometimes"));

    let err = TranscodeEngine::from_config(config).unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.errors.iter().all(|e| e.stage == Stage::Configure));
}

#[test]
fn from_config_rejects_unknown_error_policy() {
    let config = TranscodeConfig::new().with_error_policy("sometimes");
    let err = TranscodeEngine::from_config(config).unwrap_err();
    assert_eq!(err.errors[0].stage, Stage::Configure);
}
