//! Standard I/O implementations for files and stdin/stdout.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{InputProvider, InputStream, OutputTarget};

/// Input provider for reading from stdin.
///
/// Stdin can neither seek nor rewind, so its streams are sequential.
#[derive(Debug, Clone)]
pub struct StdinInput {
    id: String,
}

impl StdinInput {
    /// Create a new stdin input provider.
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputProvider for StdinInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<InputStream> {
        Ok(InputStream::sequential(io::stdin()))
    }
}

/// Input provider for reading from files.
#[derive(Debug, Clone)]
pub struct FileInput {
    id: String,
    path: PathBuf,
}

impl FileInput {
    /// Create a new file input provider.
    pub fn new(path: PathBuf) -> Self {
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl InputProvider for FileInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<InputStream> {
        let file = std::fs::File::open(&self.path)?;
        Ok(InputStream::from(file))
    }

    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Output target for writing to stdout.
#[derive(Debug, Clone)]
pub struct StdoutOutput {
    id: String,
}

impl StdoutOutput {
    /// Create a new stdout output target.
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTarget for StdoutOutput {
    fn id(&self) -> &str {
        &self.id
    }

    fn exists(&self) -> bool {
        false
    }

    fn open_overwrite(&self) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(io::stdout()))
    }
}

/// Output target for writing to files.
#[derive(Debug, Clone)]
pub struct FileOutput {
    id: String,
    path: PathBuf,
}

impl FileOutput {
    /// Create a new file output target.
    pub fn new(path: PathBuf) -> Self {
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl OutputTarget for FileOutput {
    fn id(&self) -> &str {
        &self.id
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn open_overwrite(&self) -> io::Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        Ok(Box::new(file))
    }

    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
