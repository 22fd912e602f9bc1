//! Tests for job specifications and batch configuration.

use std::sync::Arc;

use crate::config::{FileExistsPolicy, TranscodeConfig, TranscodeJob};
use crate::format::WireFormat;
use crate::io::{InMemorySink, InMemorySource};

#[test]
fn file_exists_policy_default_is_error() {
    assert_eq!(FileExistsPolicy::default(), FileExistsPolicy::Error);
}

#[test]
fn file_exists_policy_from_str() {
    assert_eq!(
        FileExistsPolicy::from_str("Overwrite"),
        Some(FileExistsPolicy::Overwrite)
    );
    assert_eq!(
        FileExistsPolicy::from_str("error"),
        Some(FileExistsPolicy::Error)
    );
    assert_eq!(FileExistsPolicy::from_str("clobber"), None);
    // Two documents back to back are not one readable document.
    assert_eq!(FileExistsPolicy::from_str("append"), None);
}

#[test]
fn job_builders() {
    let job = TranscodeJob::new(
        "job",
        Arc::new(InMemorySource::from_string("in", "<a/>")),
        Arc::new(InMemorySink::new("out")),
    )
    .with_format(WireFormat::Text)
    .with_file_exists_policy(FileExistsPolicy::Overwrite);

    assert_eq!(job.id, "job");
    assert_eq!(job.format, WireFormat::Text);
    assert_eq!(job.file_exists_policy, FileExistsPolicy::Overwrite);
}

#[test]
fn parse_yaml_config() {
    let yaml = r#"
error_policy: fast_fail
default_format: text
jobs:
  - input: a.xml
    output: a.abx
    format: binary
  - id: second
    input: "-"
    output: b.xml
    file_exists_policy: overwrite
"#;

    let cfg: TranscodeConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.error_policy.as_deref(), Some("fast_fail"));
    assert_eq!(cfg.default_format, Some(WireFormat::Text));
    assert_eq!(cfg.jobs.len(), 2);
    assert_eq!(cfg.jobs[0].format, Some(WireFormat::Binary));
    assert_eq!(cfg.jobs[0].id, None);
    assert_eq!(cfg.jobs[1].id.as_deref(), Some("second"));
    assert_eq!(cfg.jobs[1].file_exists_policy.as_deref(), Some("overwrite"));
}

#[test]
fn unknown_format_is_rejected() {
    let yaml = "jobs:\n  - input: a\n    output: b\n    format: json\n";
    assert!(serde_yaml::from_str::<TranscodeConfig>(yaml).is_err());
}

#[cfg(feature = "config")]
mod from_path {
    use crate::config::{ConfigError, TranscodeConfig};
    use crate::format::WireFormat;

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("jobs.yaml");
        std::fs::write(&yaml, "jobs:\n  - input: a\n    output: b\n").unwrap();
        let cfg = TranscodeConfig::from_path(&yaml).unwrap();
        assert_eq!(cfg.jobs[0].input, "a");

        let json = dir.path().join("jobs.json");
        std::fs::write(
            &json,
            r#"{"default_format": "binary", "jobs": [{"input": "a", "output": "b"}]}"#,
        )
        .unwrap();
        let cfg = TranscodeConfig::from_path(&json).unwrap();
        assert_eq!(cfg.default_format, Some(WireFormat::Binary));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.toml");
        std::fs::write(&path, "").unwrap();
        let err = TranscodeConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownExtension(ext) if ext == "toml"));
    }

    #[test]
    fn build_engine_from_missing_file_fails_in_configure() {
        let dir = tempfile::tempdir().unwrap();
        let err = crate::build_engine_from_path(dir.path().join("missing.yaml")).unwrap_err();
        assert_eq!(err.errors[0].stage, crate::error::Stage::Configure);
    }
}
