//! Text (XML) wire format using quick-xml.
//!
//! Both directions are namespace-unaware: the parser reports every namespace
//! as the empty string and qualified names such as `a:b` pass through as
//! plain names, while the serializer rejects any non-empty namespace.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::{BufReader, BufWriter, Read, Write};

use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::escape::{escape, partial_escape, unescape};

use super::{Encoding, WireFormat};
use crate::error::XmlError;
use crate::namespace::normalize;
use crate::token::{Attribute, PullSource, PushSink, Token, TokenKind};

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    Ok(std::str::from_utf8(bytes)?)
}

const PREDEFINED_ENTITIES: [&str; 5] = ["lt", "gt", "amp", "apos", "quot"];

/// Whether `s` matches the XML `Name` production.
fn is_name(s: &str) -> bool {
    fn is_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_' || c == ':' || (!c.is_ascii() && c.is_alphabetic())
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_start(c) => {}
        _ => return false,
    }
    chars.all(|c| {
        is_start(c)
            || c.is_ascii_digit()
            || c == '-'
            || c == '.'
            || (!c.is_ascii() && c.is_alphanumeric())
    })
}

/// Replacement text of a predefined entity or character reference.
fn resolve_reference(name: &str) -> Result<Option<String>, XmlError> {
    let predefined = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    };
    if let Some(c) = predefined {
        return Ok(Some(c.to_string()));
    }

    let Some(number) = name.strip_prefix('#') else {
        return Ok(None);
    };
    let code = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    }
    .map_err(|_| XmlError::format(format!("invalid character reference '&{name};'")))?;
    char::from_u32(code)
        .map(|c| Some(c.to_string()))
        .ok_or_else(|| XmlError::format(format!("character reference '&{name};' is not a valid char")))
}

/// One decoded quick-xml event.
enum Raw {
    /// Character data to be coalesced into the surrounding text
    Chars(String),
    /// A token, optionally followed by a second one (the end of an empty element)
    Token(Token, Option<Token>),
    Decl,
}

/// Pull parser for the text format.
///
/// Adjacent character data, predefined entities and character references are
/// coalesced into a single `Text` token. Other entity references are reported
/// as `EntityRef`. An XML declaration is consumed as the start of the document.
pub struct TextParser<R: Read> {
    reader: quick_xml::Reader<BufReader<R>>,
    buf: Vec<u8>,
    encoding: Encoding,
    current: TokenKind,
    lookahead: Option<Raw>,
    queued: VecDeque<Token>,
    depth: usize,
}

impl<R: Read> TextParser<R> {
    /// Bind to `input` as UTF-8 and read the prologue.
    pub fn new(input: R) -> Result<Self, XmlError> {
        Self::with_encoding(input, Encoding::Utf8)
    }

    /// Bind to `input` with an explicit character encoding.
    ///
    /// Only UTF-8 and its ASCII subset can be read.
    pub fn with_encoding(input: R, encoding: Encoding) -> Result<Self, XmlError> {
        if !matches!(encoding, Encoding::Utf8 | Encoding::UsAscii) {
            return Err(XmlError::Unsupported(format!(
                "text parser cannot read {encoding}"
            )));
        }

        let mut reader = quick_xml::Reader::from_reader(BufReader::new(input));
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;

        let mut parser = Self {
            reader,
            buf: Vec::new(),
            encoding,
            current: TokenKind::StartDocument,
            lookahead: None,
            queued: VecDeque::new(),
            depth: 0,
        };

        match parser.read_raw()? {
            Raw::Decl => {}
            other => parser.lookahead = Some(other),
        }
        Ok(parser)
    }

    pub fn format(&self) -> WireFormat {
        WireFormat::Text
    }

    fn start_tag(start: &BytesStart<'_>) -> Result<Token, XmlError> {
        let name = utf8(start.name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::format(format!("in <{name}>: {e}")))?;
            let value = unescape(utf8(&attr.value)?)
                .map_err(|e| XmlError::format(format!("in <{name}>: {e}")))?;
            attributes.push(Attribute {
                namespace: Some(String::new()),
                name: utf8(attr.key.as_ref())?.to_owned(),
                value: value.into_owned(),
            });
        }
        Ok(Token::StartTag {
            namespace: Some(String::new()),
            name,
            attributes,
        })
    }

    fn read_raw(&mut self) -> Result<Raw, XmlError> {
        if let Some(raw) = self.lookahead.take() {
            return Ok(raw);
        }

        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        let raw = match event {
            Event::Decl(_) => Raw::Decl,
            Event::Start(start) => {
                self.depth += 1;
                Raw::Token(Self::start_tag(&start)?, None)
            }
            Event::Empty(start) => {
                let token = Self::start_tag(&start)?;
                let end = Token::EndTag {
                    namespace: Some(String::new()),
                    name: utf8(start.name().as_ref())?.to_owned(),
                };
                Raw::Token(token, Some(end))
            }
            Event::End(end) => {
                let name = utf8(end.name().as_ref())?.to_owned();
                if self.depth == 0 {
                    return Err(XmlError::format(format!("unexpected end tag </{name}>")));
                }
                self.depth -= 1;
                Raw::Token(
                    Token::EndTag {
                        namespace: Some(String::new()),
                        name,
                    },
                    None,
                )
            }
            Event::Text(text) => Raw::Chars(utf8(&text)?.to_owned()),
            Event::GeneralRef(reference) => {
                let name = utf8(&reference)?;
                match resolve_reference(name)? {
                    Some(resolved) => Raw::Chars(resolved),
                    None => Raw::Token(Token::EntityRef(name.to_owned()), None),
                }
            }
            Event::CData(cdata) => Raw::Token(Token::CData(utf8(&cdata)?.to_owned()), None),
            Event::Comment(comment) => {
                Raw::Token(Token::Comment(utf8(&comment)?.to_owned()), None)
            }
            Event::PI(pi) => Raw::Token(
                Token::ProcessingInstruction(utf8(&pi)?.to_owned()),
                None,
            ),
            Event::DocType(doctype) => Raw::Token(
                Token::DocDecl(utf8(&doctype)?.trim_start().to_owned()),
                None,
            ),
            Event::Eof => {
                if self.depth > 0 {
                    return Err(XmlError::format(format!(
                        "unexpected end of input with {} unclosed element(s)",
                        self.depth
                    )));
                }
                Raw::Token(Token::EndDocument, None)
            }
            #[allow(unreachable_patterns)]
            _ => return Err(XmlError::format("unsupported XML construct")),
        };
        Ok(raw)
    }

    fn read_token(&mut self) -> Result<Token, XmlError> {
        let mut text: Option<String> = None;
        loop {
            match self.read_raw()? {
                Raw::Chars(chars) if chars.is_empty() => {}
                Raw::Chars(chars) => match text.as_mut() {
                    Some(t) => t.push_str(&chars),
                    None => text = Some(chars),
                },
                Raw::Decl => {
                    return Err(XmlError::format(
                        "XML declaration is only allowed at the start of the document",
                    ));
                }
                Raw::Token(token, trailing) => {
                    let first = match text {
                        Some(text) => {
                            self.queued.push_back(token);
                            Token::Text(text)
                        }
                        None => token,
                    };
                    if let Some(trailing) = trailing {
                        self.queued.push_back(trailing);
                    }
                    return Ok(first);
                }
            }
        }
    }
}

impl<R: Read> PullSource for TextParser<R> {
    fn event_kind(&self) -> TokenKind {
        self.current
    }

    fn input_encoding(&self) -> Option<&str> {
        Some(self.encoding.name())
    }

    fn next_token(&mut self) -> Result<Token, XmlError> {
        if self.current == TokenKind::EndDocument {
            return Ok(Token::EndDocument);
        }
        let token = match self.queued.pop_front() {
            Some(token) => token,
            None => self.read_token()?,
        };
        self.current = token.kind();
        Ok(token)
    }
}

/// Serializer writing the text format.
///
/// Output is buffered. A start tag stays open until the next event so
/// attributes can be added; a start tag closed without content is written as
/// an empty element.
pub struct TextSerializer<W: Write> {
    writer: quick_xml::Writer<BufWriter<W>>,
    encoding: Encoding,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl<W: Write> TextSerializer<W> {
    /// Bind to `out` as UTF-8.
    pub fn new(out: W) -> Self {
        Self {
            writer: quick_xml::Writer::new(BufWriter::new(out)),
            encoding: Encoding::Utf8,
            pending: None,
            open: Vec::new(),
        }
    }

    /// Bind to `out` with an explicit character encoding.
    ///
    /// US-ASCII and ISO-8859-1 output is pure ASCII with character references
    /// for everything else. UTF-16 is not supported.
    pub fn with_encoding(out: W, encoding: Encoding) -> Result<Self, XmlError> {
        if encoding == Encoding::Utf16 {
            return Err(XmlError::Unsupported(format!(
                "text serializer cannot write {encoding}"
            )));
        }
        let mut serializer = Self::new(out);
        serializer.encoding = encoding;
        Ok(serializer)
    }

    pub fn format(&self) -> WireFormat {
        WireFormat::Text
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W, XmlError> {
        self.close_pending()?;
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| XmlError::Stream(e.into_error()))
    }

    fn check_namespace(namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        match normalize(namespace) {
            None => Ok(()),
            Some(ns) => Err(XmlError::Unsupported(format!(
                "text format cannot write namespace '{ns}' on '{name}'"
            ))),
        }
    }

    /// Replace characters the output encoding cannot hold with references.
    fn encode<'a>(&self, s: Cow<'a, str>) -> Cow<'a, str> {
        if !self.encoding.is_ascii_only() || s.is_ascii() {
            return s;
        }
        let mut out = String::with_capacity(s.len() + 8);
        for c in s.chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                out.push_str(&format!("&#x{:X};", u32::from(c)));
            }
        }
        Cow::Owned(out)
    }

    fn require_ascii(&self, what: &str, s: &str) -> Result<(), XmlError> {
        if self.encoding.is_ascii_only() && !s.is_ascii() {
            return Err(XmlError::format(format!(
                "{what} contains characters not representable in {}",
                self.encoding
            )));
        }
        Ok(())
    }

    fn close_pending(&mut self) -> Result<(), XmlError> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    fn write_chars(&mut self, text: &str) -> Result<(), XmlError> {
        self.close_pending()?;
        let escaped = self.encode(partial_escape(text));
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escaped)))?;
        Ok(())
    }
}

impl<W: Write> PushSink for TextSerializer<W> {
    fn start_document(
        &mut self,
        _encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), XmlError> {
        let standalone = standalone.map(|s| if s { "yes" } else { "no" });
        self.writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some(self.encoding.name()),
            standalone,
        )))?;
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), XmlError> {
        self.close_pending()?;
        while let Some(name) = self.open.pop() {
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        self.flush()
    }

    fn start_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        Self::check_namespace(namespace, name)?;
        self.require_ascii("tag name", name)?;
        self.close_pending()?;
        self.pending = Some(BytesStart::new(name.to_owned()));
        self.open.push(name.to_owned());
        Ok(())
    }

    fn attribute(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        value: &str,
    ) -> Result<(), XmlError> {
        Self::check_namespace(namespace, name)?;
        self.require_ascii("attribute name", name)?;
        let escaped = self.encode(escape(value));
        let start = self.pending.as_mut().ok_or_else(|| {
            XmlError::format(format!("attribute '{name}' written outside of a start tag"))
        })?;
        start.push_attribute(XmlAttribute::from((name.as_bytes(), escaped.as_bytes())));
        Ok(())
    }

    fn end_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        Self::check_namespace(namespace, name)?;
        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(XmlError::format(format!(
                    "end tag </{name}> does not match <{open}>"
                )));
            }
            None => return Err(XmlError::format(format!("unexpected end tag </{name}>"))),
        }

        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(name.to_owned())))?,
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_chars(text)
    }

    fn cdsect(&mut self, text: &str) -> Result<(), XmlError> {
        if text.contains("]]>") {
            return Err(XmlError::format("CDATA section cannot contain ']]>'"));
        }
        self.require_ascii("CDATA section", text)?;
        self.close_pending()?;
        self.writer
            .write_event(Event::CData(BytesCData::new(text)))?;
        Ok(())
    }

    fn entity_ref(&mut self, name: &str) -> Result<(), XmlError> {
        if !is_name(name) {
            return Err(XmlError::format(format!(
                "'{name}' is not a valid entity name"
            )));
        }
        if PREDEFINED_ENTITIES.contains(&name) {
            return Err(XmlError::format(format!(
                "predefined entity '{name}' must be written as text"
            )));
        }
        self.require_ascii("entity name", name)?;
        self.close_pending()?;
        self.writer.get_mut().write_all(format!("&{name};").as_bytes())?;
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_chars(text)
    }

    fn processing_instruction(&mut self, text: &str) -> Result<(), XmlError> {
        if text.contains("?>") {
            return Err(XmlError::format("processing instruction cannot contain '?>'"));
        }
        self.require_ascii("processing instruction", text)?;
        self.close_pending()?;
        self.writer.write_event(Event::PI(BytesPI::new(text)))?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), XmlError> {
        if text.contains("--") {
            return Err(XmlError::format("comment cannot contain '--'"));
        }
        self.require_ascii("comment", text)?;
        self.close_pending()?;
        self.writer
            .write_event(Event::Comment(BytesText::from_escaped(text)))?;
        Ok(())
    }

    fn docdecl(&mut self, text: &str) -> Result<(), XmlError> {
        self.require_ascii("document type declaration", text)?;
        self.close_pending()?;
        self.writer
            .write_event(Event::DocType(BytesText::from_escaped(text)))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), XmlError> {
        self.writer.get_mut().flush()?;
        Ok(())
    }
}
