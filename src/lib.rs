//! # xmlwire
//!
//! Read and write XML documents in either of two interchangeable encodings,
//! human-readable text or a compact binary framing, without the caller
//! knowing which one is in play.
//!
//! ## Overview
//!
//! xmlwire provides:
//! - **Format sniffing**: detect the binary magic prefix without disturbing the stream
//! - **Format resolution**: `resolve_reader` picks the parser, `resolve_writer` the serializer
//! - **Transcoding**: `copy` forwards a document token by token from any parser to any serializer
//! - **Namespace normalization**: `""` and "no namespace" reach sinks as `None`
//! - **Batch jobs**: `TranscodeEngine` runs many transcodes under an error policy,
//!   optionally configured from YAML/JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xmlwire::{InputStream, PushSink, WireFormat, copy, resolve_reader, resolve_writer};
//!
//! fn to_text(bytes: Vec<u8>) -> Result<Vec<u8>, xmlwire::XmlError> {
//!     let mut parser = resolve_reader(InputStream::from_bytes(bytes))?;
//!     let mut serializer = resolve_writer(Vec::new(), WireFormat::Text)?;
//!     copy(&mut parser, &mut serializer)?;
//!     serializer.into_inner()
//! }
//! ```
//!
//! ## Default format
//!
//! `WireFormat::default()` reads the `XMLWIRE_BINARY` environment variable once
//! per process (`true`/`false`, unset means binary). Pass an explicit
//! `WireFormat` to `resolve_writer` to avoid the process default entirely.
//!
//! ## Features
//!
//! - `config` - Load `TranscodeConfig` from YAML or JSON files (enabled by default)
//! - `miette` - Pretty error reporting with miette
//! - `cli` - The `xmlwire` command-line transcoder

// Core modules
pub mod config;
pub mod copy;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod namespace;
pub mod resolve;
pub mod sniff;
pub mod token;

// Re-exports for convenience
pub use config::{FileExistsPolicy, JobConfig, TranscodeConfig, TranscodeJob};
pub use copy::copy;
pub use engine::{TranscodeEngine, transcode};
pub use error::{AggregateError, ErrorPolicy, SingleIoError, Stage, XmlError};
pub use format::binary::{BinaryParser, BinarySerializer};
pub use format::text::{TextParser, TextSerializer};
pub use format::{Encoding, MAGIC, WireFormat};
pub use io::{
    Capability, FileInput, FileOutput, InMemorySink, InMemorySource, InputProvider, InputStream,
    MarkReset, MarkableReader, OutputTarget, PositionalRead, StdinInput, StdoutOutput,
};
pub use namespace::normalize;
pub use resolve::{XmlParser, XmlSerializer, resolve_reader, resolve_writer, resolve_writer_default};
pub use sniff::{Sniffed, sniff};
pub use token::{Attribute, PullSource, PushSink, Token, TokenKind};

/// Build a TranscodeEngine from a configuration file.
#[cfg(feature = "config")]
pub fn build_engine_from_path(
    path: impl AsRef<std::path::Path>,
) -> Result<TranscodeEngine, AggregateError> {
    let path = path.as_ref();
    let config = TranscodeConfig::from_path(path).map_err(|e| {
        SingleIoError::new(Stage::Configure, path.to_string_lossy(), e)
    })?;
    TranscodeEngine::from_config(config)
}

// Miette re-exports
#[cfg(feature = "miette")]
pub use error::IoDiagnostic;

// Internal test modules (see src/tests)
#[cfg(test)]
mod tests;
