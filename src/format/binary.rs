//! Binary wire format.
//!
//! Layout after the 4-byte [`MAGIC`]: a sequence of frames, each one command
//! byte followed by a payload.
//!
//! | command | payload |
//! |---|---|
//! | `START_DOCUMENT` (0), `END_DOCUMENT` (1) | none |
//! | `START_TAG` (2), `END_TAG` (3) | namespace, name |
//! | `ATTRIBUTE` (15) | namespace, name, value |
//! | 4..=10 | string |
//!
//! Strings are a big-endian `u16` byte length followed by UTF-8. Names and
//! namespaces are interned: a `u16` table index, or `0xFFFF` followed by a
//! new string which takes the next index. A namespace is preceded by a
//! presence byte so absent and empty stay distinct.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use super::{MAGIC, WireFormat};
use crate::error::XmlError;
use crate::token::{Attribute, PullSource, PushSink, Token, TokenKind};

const ATTRIBUTE: u8 = 15;
const INTERN_NEW: u16 = 0xFFFF;
const MAX_STRING_LEN: usize = u16::MAX as usize;

const NS_ABSENT: u8 = 0;
const NS_PRESENT: u8 = 1;

/// Serializer writing the binary format.
///
/// The magic prefix is written as soon as the serializer is created.
pub struct BinarySerializer<W: Write> {
    out: BufWriter<W>,
    interned: HashMap<String, u16>,
    tag_open: bool,
}

impl<W: Write> BinarySerializer<W> {
    pub fn new(out: W) -> Result<Self, XmlError> {
        let mut out = BufWriter::new(out);
        out.write_all(&MAGIC)?;
        Ok(Self {
            out,
            interned: HashMap::new(),
            tag_open: false,
        })
    }

    pub fn format(&self) -> WireFormat {
        WireFormat::Binary
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, XmlError> {
        self.out
            .into_inner()
            .map_err(|e| XmlError::Stream(e.into_error()))
    }

    fn command(&mut self, kind: TokenKind) -> Result<(), XmlError> {
        self.tag_open = false;
        self.out.write_all(&[kind.code()])?;
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<(), XmlError> {
        let len = u16::try_from(s.len()).map_err(|_| {
            XmlError::format(format!(
                "string of {} bytes exceeds the {MAX_STRING_LEN} byte limit",
                s.len()
            ))
        })?;
        self.out.write_all(&len.to_be_bytes())?;
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_interned(&mut self, s: &str) -> Result<(), XmlError> {
        if let Some(&index) = self.interned.get(s) {
            self.out.write_all(&index.to_be_bytes())?;
            return Ok(());
        }
        let index = u16::try_from(self.interned.len())
            .ok()
            .filter(|&i| i != INTERN_NEW)
            .ok_or_else(|| XmlError::format("too many distinct names to intern"))?;
        self.out.write_all(&INTERN_NEW.to_be_bytes())?;
        self.write_string(s)?;
        self.interned.insert(s.to_owned(), index);
        Ok(())
    }

    fn write_namespace(&mut self, namespace: Option<&str>) -> Result<(), XmlError> {
        match namespace {
            None => self.out.write_all(&[NS_ABSENT])?,
            Some(ns) => {
                self.out.write_all(&[NS_PRESENT])?;
                self.write_interned(ns)?;
            }
        }
        Ok(())
    }

    fn write_text_frame(&mut self, kind: TokenKind, text: &str) -> Result<(), XmlError> {
        self.command(kind)?;
        self.write_string(text)
    }
}

impl<W: Write> PushSink for BinarySerializer<W> {
    fn start_document(
        &mut self,
        _encoding: Option<&str>,
        _standalone: Option<bool>,
    ) -> Result<(), XmlError> {
        self.command(TokenKind::StartDocument)
    }

    fn end_document(&mut self) -> Result<(), XmlError> {
        self.command(TokenKind::EndDocument)?;
        self.flush()
    }

    fn start_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        self.command(TokenKind::StartTag)?;
        self.write_namespace(namespace)?;
        self.write_interned(name)?;
        self.tag_open = true;
        Ok(())
    }

    fn attribute(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        value: &str,
    ) -> Result<(), XmlError> {
        if !self.tag_open {
            return Err(XmlError::format(format!(
                "attribute '{name}' written outside of a start tag"
            )));
        }
        self.out.write_all(&[ATTRIBUTE])?;
        self.write_namespace(namespace)?;
        self.write_interned(name)?;
        self.write_string(value)
    }

    fn end_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError> {
        self.command(TokenKind::EndTag)?;
        self.write_namespace(namespace)?;
        self.write_interned(name)
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::Text, text)
    }

    fn cdsect(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::CData, text)
    }

    fn entity_ref(&mut self, name: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::EntityRef, name)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::IgnorableWhitespace, text)
    }

    fn processing_instruction(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::ProcessingInstruction, text)
    }

    fn comment(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::Comment, text)
    }

    fn docdecl(&mut self, text: &str) -> Result<(), XmlError> {
        self.write_text_frame(TokenKind::DocDecl, text)
    }

    fn flush(&mut self) -> Result<(), XmlError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Pull parser reading the binary format.
///
/// A leading `START_DOCUMENT` frame is folded into the initial position, so
/// the parser starts at `StartDocument` and does not return it again. Bytes
/// after `END_DOCUMENT` are a format error.
pub struct BinaryParser<R: Read> {
    input: BufReader<R>,
    interned: Vec<String>,
    current: TokenKind,
    peeked: Option<u8>,
}

impl<R: Read> BinaryParser<R> {
    /// Bind to `input`, verifying the magic prefix and reading the first frame.
    pub fn new(input: R) -> Result<Self, XmlError> {
        let mut parser = Self {
            input: BufReader::new(input),
            interned: Vec::new(),
            current: TokenKind::StartDocument,
            peeked: None,
        };

        let mut magic = [0u8; MAGIC.len()];
        parser.read_exact(&mut magic, "magic prefix")?;
        if magic != MAGIC {
            return Err(XmlError::format(format!(
                "missing binary magic prefix, found {magic:02x?}"
            )));
        }

        let first = parser.read_command()?;
        if first != TokenKind::StartDocument.code() {
            parser.peeked = Some(first);
        }
        Ok(parser)
    }

    pub fn format(&self) -> WireFormat {
        WireFormat::Binary
    }

    fn read_exact(&mut self, buf: &mut [u8], what: &str) -> Result<(), XmlError> {
        self.input.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                XmlError::format(format!("truncated binary document while reading {what}"))
            } else {
                XmlError::Stream(e)
            }
        })
    }

    fn read_command(&mut self) -> Result<u8, XmlError> {
        if let Some(command) = self.peeked.take() {
            return Ok(command);
        }
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte, "command")?;
        Ok(byte[0])
    }

    fn read_u16(&mut self, what: &str) -> Result<u16, XmlError> {
        let mut bytes = [0u8; 2];
        self.read_exact(&mut bytes, what)?;
        Ok(u16::from_be_bytes(bytes))
    }

    fn read_string(&mut self) -> Result<String, XmlError> {
        let len = self.read_u16("string length")?;
        let mut bytes = vec![0u8; usize::from(len)];
        self.read_exact(&mut bytes, "string")?;
        Ok(String::from_utf8(bytes)?)
    }

    fn read_interned(&mut self) -> Result<String, XmlError> {
        let index = self.read_u16("intern index")?;
        if index == INTERN_NEW {
            let s = self.read_string()?;
            self.interned.push(s.clone());
            return Ok(s);
        }
        self.interned
            .get(usize::from(index))
            .cloned()
            .ok_or_else(|| XmlError::format(format!("unknown intern index {index}")))
    }

    fn read_namespace(&mut self) -> Result<Option<String>, XmlError> {
        let mut flag = [0u8; 1];
        self.read_exact(&mut flag, "namespace flag")?;
        match flag[0] {
            NS_ABSENT => Ok(None),
            NS_PRESENT => self.read_interned().map(Some),
            other => Err(XmlError::format(format!("invalid namespace flag {other}"))),
        }
    }

    fn read_start_tag(&mut self) -> Result<Token, XmlError> {
        let namespace = self.read_namespace()?;
        let name = self.read_interned()?;
        let mut attributes = Vec::new();
        loop {
            let command = self.read_command()?;
            if command != ATTRIBUTE {
                self.peeked = Some(command);
                break;
            }
            let namespace = self.read_namespace()?;
            let name = self.read_interned()?;
            let value = self.read_string()?;
            attributes.push(Attribute {
                namespace,
                name,
                value,
            });
        }
        Ok(Token::StartTag {
            namespace,
            name,
            attributes,
        })
    }

    fn expect_end_of_input(&mut self) -> Result<(), XmlError> {
        if !self.input.fill_buf()?.is_empty() {
            return Err(XmlError::format("trailing bytes after END_DOCUMENT"));
        }
        Ok(())
    }

    fn read_token(&mut self) -> Result<Token, XmlError> {
        let command = self.read_command()?;
        let token = match TokenKind::from_code(command) {
            TokenKind::StartDocument => Token::StartDocument {
                encoding: Some("UTF-8".into()),
            },
            TokenKind::EndDocument => Token::EndDocument,
            TokenKind::StartTag => self.read_start_tag()?,
            TokenKind::EndTag => {
                let namespace = self.read_namespace()?;
                let name = self.read_interned()?;
                Token::EndTag { namespace, name }
            }
            TokenKind::Text => Token::Text(self.read_string()?),
            TokenKind::CData => Token::CData(self.read_string()?),
            TokenKind::EntityRef => Token::EntityRef(self.read_string()?),
            TokenKind::IgnorableWhitespace => Token::IgnorableWhitespace(self.read_string()?),
            TokenKind::ProcessingInstruction => {
                Token::ProcessingInstruction(self.read_string()?)
            }
            TokenKind::Comment => Token::Comment(self.read_string()?),
            TokenKind::DocDecl => Token::DocDecl(self.read_string()?),
            TokenKind::Unknown(ATTRIBUTE) => {
                return Err(XmlError::format("attribute frame outside of a start tag"));
            }
            TokenKind::Unknown(code) => {
                return Err(XmlError::format(format!("unknown command byte {code}")));
            }
        };
        Ok(token)
    }
}

impl<R: Read> PullSource for BinaryParser<R> {
    fn event_kind(&self) -> TokenKind {
        self.current
    }

    fn input_encoding(&self) -> Option<&str> {
        Some("UTF-8")
    }

    fn next_token(&mut self) -> Result<Token, XmlError> {
        if self.current == TokenKind::EndDocument {
            return Ok(Token::EndDocument);
        }
        let token = self.read_token()?;
        if token == Token::EndDocument {
            self.expect_end_of_input()?;
        }
        self.current = token.kind();
        Ok(token)
    }
}
