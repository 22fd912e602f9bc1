//! Format resolution: picking the parser or serializer for a stream.
//!
//! - `resolve_reader` sniffs the input and binds the matching parser
//! - `resolve_writer` binds the serializer named by an explicit [`WireFormat`]
//!
//! Both bind UTF-8. The magic prefix is the only format marker, so anything
//! written through `resolve_writer` is read back by `resolve_reader`.

use std::io::Write;

use crate::error::XmlError;
use crate::format::WireFormat;
use crate::format::binary::{BinaryParser, BinarySerializer};
use crate::format::text::{TextParser, TextSerializer};
use crate::io::InputStream;
use crate::sniff::sniff;
use crate::token::{PullSource, PushSink, Token, TokenKind};

/// Parser chosen by [`resolve_reader`].
pub enum XmlParser {
    Text(TextParser<InputStream>),
    Binary(BinaryParser<InputStream>),
}

impl XmlParser {
    pub fn format(&self) -> WireFormat {
        match self {
            XmlParser::Text(p) => p.format(),
            XmlParser::Binary(p) => p.format(),
        }
    }
}

impl std::fmt::Debug for XmlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlParser")
            .field("format", &self.format())
            .field("event_kind", &self.event_kind())
            .finish()
    }
}

impl PullSource for XmlParser {
    fn event_kind(&self) -> TokenKind {
        match self {
            XmlParser::Text(p) => p.event_kind(),
            XmlParser::Binary(p) => p.event_kind(),
        }
    }

    fn input_encoding(&self) -> Option<&str> {
        match self {
            XmlParser::Text(p) => p.input_encoding(),
            XmlParser::Binary(p) => p.input_encoding(),
        }
    }

    fn next_token(&mut self) -> Result<Token, XmlError> {
        match self {
            XmlParser::Text(p) => p.next_token(),
            XmlParser::Binary(p) => p.next_token(),
        }
    }
}

/// Serializer chosen by [`resolve_writer`].
pub enum XmlSerializer<W: Write> {
    Text(TextSerializer<W>),
    Binary(BinarySerializer<W>),
}

impl<W: Write> XmlSerializer<W> {
    pub fn format(&self) -> WireFormat {
        match self {
            XmlSerializer::Text(s) => s.format(),
            XmlSerializer::Binary(s) => s.format(),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, XmlError> {
        match self {
            XmlSerializer::Text(s) => s.into_inner(),
            XmlSerializer::Binary(s) => s.into_inner(),
        }
    }
}

impl<W: Write> std::fmt::Debug for XmlSerializer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSerializer")
            .field("format", &self.format())
            .finish()
    }
}

macro_rules! delegate_sink {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            XmlSerializer::Text(s) => s.$method($($arg),*),
            XmlSerializer::Binary(s) => s.$method($($arg),*),
        }
    };
}

impl<W: Write> PushSink for XmlSerializer<W> {
    fn start_document(
        &mut self,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), XmlError> {
        delegate_sink!(self, start_document(encoding, standalone))
    }

    fn end_document(&mut self) -> Result<(), XmlError> {
        delegate_sink!(self, end_document())
    }

    fn start_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        delegate_sink!(self, start_tag(namespace, name))
    }

    fn attribute(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        value: &str,
    ) -> Result<(), XmlError> {
        delegate_sink!(self, attribute(namespace, name, value))
    }

    fn end_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        delegate_sink!(self, end_tag(namespace, name))
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, text(text))
    }

    fn cdsect(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, cdsect(text))
    }

    fn entity_ref(&mut self, name: &str) -> Result<(), XmlError> {
        delegate_sink!(self, entity_ref(name))
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, ignorable_whitespace(text))
    }

    fn processing_instruction(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, processing_instruction(text))
    }

    fn comment(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, comment(text))
    }

    fn docdecl(&mut self, text: &str) -> Result<(), XmlError> {
        delegate_sink!(self, docdecl(text))
    }

    fn flush(&mut self) -> Result<(), XmlError> {
        delegate_sink!(self, flush())
    }
}

/// Detect the format of `stream` and bind the matching parser with UTF-8.
///
/// The parser reads from the stream returned by sniffing, which may be a
/// buffering wrapper around `stream`. Errors in the document prologue are
/// returned here rather than from the first `next_token` call.
pub fn resolve_reader(stream: InputStream) -> Result<XmlParser, XmlError> {
    let sniffed = sniff(stream)?;
    let parser = if sniffed.is_binary {
        XmlParser::Binary(BinaryParser::new(sniffed.stream)?)
    } else {
        XmlParser::Text(TextParser::new(sniffed.stream)?)
    };
    tracing::debug!(format = %parser.format(), "resolved reader");
    Ok(parser)
}

/// Bind the serializer for `format` to `out` with UTF-8.
///
/// The binary serializer writes the magic prefix immediately.
pub fn resolve_writer<W: Write>(out: W, format: WireFormat) -> Result<XmlSerializer<W>, XmlError> {
    let serializer = match format {
        WireFormat::Text => XmlSerializer::Text(TextSerializer::new(out)),
        WireFormat::Binary => XmlSerializer::Binary(BinarySerializer::new(out)?),
    };
    tracing::debug!(%format, "resolved writer");
    Ok(serializer)
}

/// [`resolve_writer`] with the process default format.
pub fn resolve_writer_default<W: Write>(out: W) -> Result<XmlSerializer<W>, XmlError> {
    resolve_writer(out, WireFormat::default())
}
