//! Document event model shared by every codec.
//!
//! This module provides:
//! - `Token`: One event of a pull-style document stream
//! - `TokenKind`: The discriminant of a `Token`, with its wire code
//! - `Attribute`: A single attribute of a start tag
//! - `PullSource`: Trait for sequential token producers (parsers)
//! - `PushSink`: Trait for token consumers committing output as events arrive (serializers)

use crate::error::XmlError;

/// A single attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Create an attribute with no namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// One discrete event of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartDocument {
        encoding: Option<String>,
    },
    EndDocument,
    StartTag {
        namespace: Option<String>,
        name: String,
        attributes: Vec<Attribute>,
    },
    EndTag {
        namespace: Option<String>,
        name: String,
    },
    Text(String),
    CData(String),
    EntityRef(String),
    IgnorableWhitespace(String),
    ProcessingInstruction(String),
    Comment(String),
    DocDecl(String),
    /// A kind produced by a third-party source that no sink understands.
    Unknown(u8),
}

impl Token {
    /// Start tag with no namespace and no attributes.
    pub fn start_tag(name: impl Into<String>) -> Self {
        Token::StartTag {
            namespace: None,
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// End tag with no namespace.
    pub fn end_tag(name: impl Into<String>) -> Self {
        Token::EndTag {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Token::Text(text.into())
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartDocument { .. } => TokenKind::StartDocument,
            Token::EndDocument => TokenKind::EndDocument,
            Token::StartTag { .. } => TokenKind::StartTag,
            Token::EndTag { .. } => TokenKind::EndTag,
            Token::Text(_) => TokenKind::Text,
            Token::CData(_) => TokenKind::CData,
            Token::EntityRef(_) => TokenKind::EntityRef,
            Token::IgnorableWhitespace(_) => TokenKind::IgnorableWhitespace,
            Token::ProcessingInstruction(_) => TokenKind::ProcessingInstruction,
            Token::Comment(_) => TokenKind::Comment,
            Token::DocDecl(_) => TokenKind::DocDecl,
            Token::Unknown(code) => TokenKind::Unknown(*code),
        }
    }
}

/// Discriminant of a [`Token`].
///
/// The numeric codes double as the command nibble of the binary framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartDocument,
    EndDocument,
    StartTag,
    EndTag,
    Text,
    CData,
    EntityRef,
    IgnorableWhitespace,
    ProcessingInstruction,
    Comment,
    DocDecl,
    Unknown(u8),
}

impl TokenKind {
    pub fn code(self) -> u8 {
        match self {
            TokenKind::StartDocument => 0,
            TokenKind::EndDocument => 1,
            TokenKind::StartTag => 2,
            TokenKind::EndTag => 3,
            TokenKind::Text => 4,
            TokenKind::CData => 5,
            TokenKind::EntityRef => 6,
            TokenKind::IgnorableWhitespace => 7,
            TokenKind::ProcessingInstruction => 8,
            TokenKind::Comment => 9,
            TokenKind::DocDecl => 10,
            TokenKind::Unknown(code) => code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => TokenKind::StartDocument,
            1 => TokenKind::EndDocument,
            2 => TokenKind::StartTag,
            3 => TokenKind::EndTag,
            4 => TokenKind::Text,
            5 => TokenKind::CData,
            6 => TokenKind::EntityRef,
            7 => TokenKind::IgnorableWhitespace,
            8 => TokenKind::ProcessingInstruction,
            9 => TokenKind::Comment,
            10 => TokenKind::DocDecl,
            other => TokenKind::Unknown(other),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::StartDocument => write!(f, "START_DOCUMENT"),
            TokenKind::EndDocument => write!(f, "END_DOCUMENT"),
            TokenKind::StartTag => write!(f, "START_TAG"),
            TokenKind::EndTag => write!(f, "END_TAG"),
            TokenKind::Text => write!(f, "TEXT"),
            TokenKind::CData => write!(f, "CDSECT"),
            TokenKind::EntityRef => write!(f, "ENTITY_REF"),
            TokenKind::IgnorableWhitespace => write!(f, "IGNORABLE_WHITESPACE"),
            TokenKind::ProcessingInstruction => write!(f, "PROCESSING_INSTRUCTION"),
            TokenKind::Comment => write!(f, "COMMENT"),
            TokenKind::DocDecl => write!(f, "DOCDECL"),
            TokenKind::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// Trait for pull-style token sources.
///
/// A source starts positioned at `StartDocument`; each call to
/// [`next_token`](PullSource::next_token) advances it by one event.
/// Sources may or may not return `StartDocument` from `next_token`.
pub trait PullSource {
    /// Kind of the event the source is currently positioned at.
    fn event_kind(&self) -> TokenKind;

    /// Character encoding the source was bound with.
    fn input_encoding(&self) -> Option<&str>;

    /// Advance to and return the next event.
    ///
    /// After `EndDocument` has been returned, further calls keep returning it.
    fn next_token(&mut self) -> Result<Token, XmlError>;
}

/// Trait for push-style token sinks.
///
/// Attributes are added with [`attribute`](PushSink::attribute) directly after
/// the [`start_tag`](PushSink::start_tag) they belong to.
pub trait PushSink {
    fn start_document(
        &mut self,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), XmlError>;

    fn end_document(&mut self) -> Result<(), XmlError>;

    fn start_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError>;

    fn attribute(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        value: &str,
    ) -> Result<(), XmlError>;

    fn end_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<(), XmlError>;

    fn text(&mut self, text: &str) -> Result<(), XmlError>;

    fn cdsect(&mut self, text: &str) -> Result<(), XmlError>;

    fn entity_ref(&mut self, name: &str) -> Result<(), XmlError>;

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), XmlError>;

    fn processing_instruction(&mut self, text: &str) -> Result<(), XmlError>;

    fn comment(&mut self, text: &str) -> Result<(), XmlError>;

    fn docdecl(&mut self, text: &str) -> Result<(), XmlError>;

    /// Push buffered output to the underlying writer.
    fn flush(&mut self) -> Result<(), XmlError>;
}

impl<S: PullSource + ?Sized> PullSource for &mut S {
    fn event_kind(&self) -> TokenKind {
        (**self).event_kind()
    }

    fn input_encoding(&self) -> Option<&str> {
        (**self).input_encoding()
    }

    fn next_token(&mut self) -> Result<Token, XmlError> {
        (**self).next_token()
    }
}
