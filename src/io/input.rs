//! Input provider trait definition.

use std::fmt::Debug;
use std::path::Path;

use super::InputStream;

/// Trait for synchronous input providers.
///
/// Implementors provide a way to open a readable stream from various sources
/// such as files, stdin, or in-memory buffers.
pub trait InputProvider: Send + Sync + Debug {
    /// Returns a unique identifier for this input source.
    ///
    /// This is used for error messages and logging.
    /// Convention: "-" for stdin, file path for files.
    fn id(&self) -> &str;

    /// Open and return a new readable stream.
    ///
    /// The stream is tagged with the strongest capability the source offers,
    /// so format sniffing can avoid buffering where possible.
    fn open(&self) -> std::io::Result<InputStream>;

    /// Filesystem path backing this source, if any.
    fn local_path(&self) -> Option<&Path> {
        None
    }
}
