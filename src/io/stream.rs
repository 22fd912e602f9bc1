//! Input streams tagged with their read capability.
//!
//! Format sniffing needs to look at leading bytes without consuming them.
//! How it does that depends on what the stream can do, so every stream is
//! tagged with a [`Capability`] when it is constructed:
//!
//! - `Positional`: reads at an absolute offset without moving the cursor
//! - `Bufferable`: supports mark/reset
//! - `Sequential`: neither; the sniffer wraps it in a [`MarkableReader`]

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};

/// Read capability of an [`InputStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Positional,
    Bufferable,
    Sequential,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Positional => write!(f, "positional"),
            Capability::Bufferable => write!(f, "bufferable"),
            Capability::Sequential => write!(f, "sequential"),
        }
    }
}

/// Streams that can read at an absolute offset independently of their cursor.
pub trait PositionalRead: Read + Send {
    /// Read into `buf` starting at `offset`, leaving the cursor untouched.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl PositionalRead for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        // seek_read moves the cursor on Windows; restore it afterwards.
        use std::io::Seek;
        let mut handle = self;
        let pos = handle.stream_position()?;
        let n = std::os::windows::fs::FileExt::seek_read(self, buf, offset);
        handle.seek(io::SeekFrom::Start(pos))?;
        n
    }

    #[cfg(not(any(unix, windows)))]
    fn read_at(&self, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "positional reads are not available on this platform",
        ))
    }
}

impl<T: AsRef<[u8]> + Send> PositionalRead for Cursor<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.get_ref().as_ref();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }
}

/// Streams that can remember a position and rewind to it.
pub trait MarkReset: Read + Send {
    /// Remember the current position. The mark stays valid while at most
    /// `read_limit` bytes are read past it.
    fn mark(&mut self, read_limit: usize);

    /// Rewind to the last mark.
    fn reset(&mut self) -> io::Result<()>;
}

/// Buffering adapter that adds mark/reset to any reader.
///
/// Bytes read after a mark are retained so [`reset`](MarkReset::reset) can
/// replay them. Once the adapter has been introduced it must be used for every
/// later read, otherwise the retained bytes are lost.
pub struct MarkableReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    mark: Option<usize>,
    read_limit: usize,
}

impl<R: Read> MarkableReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            mark: None,
            read_limit: 0,
        }
    }
}

impl<R> fmt::Debug for MarkableReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkableReader")
            .field("buffered", &(self.buf.len() - self.pos))
            .field("mark", &self.mark)
            .finish()
    }
}

impl<R: Read> Read for MarkableReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        if self.pos < self.buf.len() {
            let n = out.len().min(self.buf.len() - self.pos);
            out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            if self.mark.is_none() && self.pos == self.buf.len() {
                self.buf.clear();
                self.pos = 0;
            }
            return Ok(n);
        }

        let Some(mark) = self.mark else {
            return self.inner.read(out);
        };

        let n = self.inner.read(out)?;
        self.buf.extend_from_slice(&out[..n]);
        self.pos = self.buf.len();
        if self.buf.len() - mark > self.read_limit {
            // Read past the limit: the mark is no longer recoverable.
            self.mark = None;
            self.buf.clear();
            self.pos = 0;
        }
        Ok(n)
    }
}

impl<R: Read + Send> MarkReset for MarkableReader<R> {
    fn mark(&mut self, read_limit: usize) {
        self.buf.drain(..self.pos);
        self.pos = 0;
        self.mark = Some(0);
        self.read_limit = read_limit;
    }

    fn reset(&mut self) -> io::Result<()> {
        match self.mark {
            Some(mark) => {
                self.pos = mark;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "reset without a valid mark",
            )),
        }
    }
}

/// A byte stream plus its capability tag.
pub enum InputStream {
    Positional(Box<dyn PositionalRead>),
    Bufferable(Box<dyn MarkReset>),
    Sequential(Box<dyn Read + Send>),
}

impl InputStream {
    pub fn positional(reader: impl PositionalRead + 'static) -> Self {
        InputStream::Positional(Box::new(reader))
    }

    pub fn bufferable(reader: impl MarkReset + 'static) -> Self {
        InputStream::Bufferable(Box::new(reader))
    }

    pub fn sequential(reader: impl Read + Send + 'static) -> Self {
        InputStream::Sequential(Box::new(reader))
    }

    /// In-memory stream; positional, so sniffing it never buffers.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::positional(Cursor::new(bytes.into()))
    }

    pub fn capability(&self) -> Capability {
        match self {
            InputStream::Positional(_) => Capability::Positional,
            InputStream::Bufferable(_) => Capability::Bufferable,
            InputStream::Sequential(_) => Capability::Sequential,
        }
    }
}

impl From<File> for InputStream {
    fn from(file: File) -> Self {
        Self::positional(file)
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputStream")
            .field(&self.capability())
            .finish()
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputStream::Positional(r) => r.read(buf),
            InputStream::Bufferable(r) => r.read(buf),
            InputStream::Sequential(r) => r.read(buf),
        }
    }
}
