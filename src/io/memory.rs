//! In-memory I/O implementations for testing.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Capability, InputProvider, InputStream, MarkableReader, OutputTarget};

/// In-memory input source for testing.
///
/// The capability of opened streams is configurable so every sniffing path
/// can be exercised without touching the filesystem.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    id: String,
    data: Arc<Vec<u8>>,
    capability: Capability,
}

impl InMemorySource {
    /// Create a new in-memory source with the given data.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data: Arc::new(data),
            capability: Capability::Positional,
        }
    }

    /// Create a new in-memory source from a string.
    pub fn from_string(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(id, data.into().into_bytes())
    }

    /// Set the capability of streams returned by `open`.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }
}

impl InputProvider for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<InputStream> {
        let cursor = Cursor::new(self.data.as_ref().clone());
        Ok(match self.capability {
            Capability::Positional => InputStream::positional(cursor),
            Capability::Bufferable => InputStream::bufferable(MarkableReader::new(cursor)),
            Capability::Sequential => InputStream::sequential(cursor),
        })
    }
}

/// In-memory output sink for testing.
#[derive(Debug, Clone)]
pub struct InMemorySink {
    id: String,
    buf: Arc<Mutex<Vec<u8>>>,
}

impl InMemorySink {
    /// Create a new empty in-memory sink.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buf: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A panicked writer leaves plain bytes behind; keep using them.
        self.buf.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the contents of the sink as bytes.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Get the contents of the sink as a string.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Clear the sink contents.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl OutputTarget for InMemorySink {
    fn id(&self) -> &str {
        &self.id
    }

    fn exists(&self) -> bool {
        !self.lock().is_empty()
    }

    fn open_overwrite(&self) -> io::Result<Box<dyn Write + Send>> {
        // Clear existing content for overwrite
        self.clear();
        Ok(Box::new(InMemoryWriteHandle {
            buf: self.buf.clone(),
        }))
    }
}

/// Write handle for in-memory sink.
struct InMemoryWriteHandle {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::fmt::Debug for InMemoryWriteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWriteHandle").finish()
    }
}

impl Write for InMemoryWriteHandle {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
