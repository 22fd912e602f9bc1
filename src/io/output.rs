//! Output target trait definition.

use std::fmt::Debug;
use std::io::Write;
use std::path::Path;

/// Trait for synchronous output targets.
///
/// Implementors provide a way to open a writable stream to various destinations
/// such as files, stdout, or in-memory buffers.
pub trait OutputTarget: Send + Sync + Debug {
    /// Returns a unique identifier for this output target.
    ///
    /// This is used for error messages and logging.
    /// Convention: "-" for stdout, file path for files.
    fn id(&self) -> &str;

    /// Whether the target already holds content.
    ///
    /// Used to enforce `FileExistsPolicy::Error`.
    fn exists(&self) -> bool;

    /// Open the target for writing, truncating any existing content.
    fn open_overwrite(&self) -> std::io::Result<Box<dyn Write + Send>>;

    /// Filesystem path backing this target, if any.
    fn local_path(&self) -> Option<&Path> {
        None
    }
}
