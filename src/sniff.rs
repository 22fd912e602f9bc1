//! Binary-vs-text detection from the leading bytes of a stream.

use std::io::{self, Read};

use crate::error::XmlError;
use crate::format::MAGIC;
use crate::io::{InputStream, MarkReset, MarkableReader, PositionalRead};

/// Readahead granted to the mark while probing.
const MARK_LIMIT: usize = 8;

/// Outcome of [`sniff`].
#[derive(Debug)]
pub struct Sniffed {
    /// Whether the stream starts with [`MAGIC`].
    pub is_binary: bool,
    /// The stream to read from next, positioned where the input stream was.
    ///
    /// This may be a buffering wrapper around the stream passed in; later
    /// reads must go through it.
    pub stream: InputStream,
}

/// Check whether `stream` begins with the binary magic prefix.
///
/// Positional streams are probed at offset 0 without moving their cursor.
/// Everything else is probed with mark/reset, wrapping sequential streams in
/// a [`MarkableReader`](crate::io::MarkableReader) first. A stream shorter than
/// the prefix is a non-match.
pub fn sniff(stream: InputStream) -> Result<Sniffed, XmlError> {
    let capability = stream.capability();
    let mut magic = [0u8; MAGIC.len()];

    let (filled, stream) = match stream {
        InputStream::Positional(reader) => {
            let n = read_at_fully(reader.as_ref(), &mut magic)?;
            (n, InputStream::Positional(reader))
        }
        InputStream::Bufferable(reader) => probe_marked(reader, &mut magic)?,
        InputStream::Sequential(reader) => {
            probe_marked(Box::new(MarkableReader::new(reader)), &mut magic)?
        }
    };

    let is_binary = filled == MAGIC.len() && magic == MAGIC;
    tracing::debug!(
        %capability,
        probed = filled,
        is_binary,
        "sniffed input stream"
    );
    Ok(Sniffed { is_binary, stream })
}

fn probe_marked(
    mut reader: Box<dyn MarkReset>,
    magic: &mut [u8],
) -> io::Result<(usize, InputStream)> {
    reader.mark(MARK_LIMIT);
    let n = read_fully(&mut reader, magic)?;
    reader.reset()?;
    Ok((n, InputStream::Bufferable(reader)))
}

fn read_at_fully(reader: &dyn PositionalRead, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read_at(&mut buf[filled..], filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
