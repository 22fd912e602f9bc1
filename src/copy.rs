//! Event-by-event transcoding from a pull source to a push sink.

use crate::error::XmlError;
use crate::namespace::normalize;
use crate::token::{PullSource, PushSink, Token, TokenKind};

/// Drain `source` and replay every event onto `sink`.
///
/// Sources that start positioned at `StartDocument` have that event emitted
/// first, with the source's input encoding and `standalone` set. Exactly one
/// `StartDocument` reaches the sink whether the source returns it again,
/// returns it only when pulled, or never returns it at all.
/// Namespaces are normalized so `""` arrives as `None`.
///
/// Memory use is bounded by the largest single token. On error the copy stops
/// immediately; whatever was already written to `sink` stays there.
pub fn copy<S, K>(source: &mut S, sink: &mut K) -> Result<(), XmlError>
where
    S: PullSource + ?Sized,
    K: PushSink + ?Sized,
{
    let mut started = false;
    if source.event_kind() == TokenKind::StartDocument {
        sink.start_document(source.input_encoding(), Some(true))?;
        started = true;
    }

    let mut events: u64 = 0;
    loop {
        let token = source.next_token()?;
        events += 1;
        if !started && token.kind() != TokenKind::StartDocument {
            // Source was already past the start of the document.
            sink.start_document(source.input_encoding(), Some(true))?;
            started = true;
        }
        match token {
            Token::StartDocument { encoding } => {
                if !started {
                    let encoding = encoding.as_deref().or(source.input_encoding());
                    sink.start_document(encoding, Some(true))?;
                    started = true;
                }
            }
            Token::EndDocument => {
                sink.end_document()?;
                sink.flush()?;
                tracing::debug!(events, "copy finished");
                return Ok(());
            }
            Token::StartTag {
                namespace,
                name,
                attributes,
            } => {
                sink.start_tag(normalize(namespace.as_deref()), &name)?;
                for attr in &attributes {
                    sink.attribute(normalize(attr.namespace.as_deref()), &attr.name, &attr.value)?;
                }
            }
            Token::EndTag { namespace, name } => {
                sink.end_tag(normalize(namespace.as_deref()), &name)?;
            }
            Token::Text(text) => sink.text(&text)?,
            Token::CData(text) => sink.cdsect(&text)?,
            Token::EntityRef(name) => sink.entity_ref(&name)?,
            Token::IgnorableWhitespace(text) => sink.ignorable_whitespace(&text)?,
            Token::ProcessingInstruction(text) => sink.processing_instruction(&text)?,
            Token::Comment(text) => sink.comment(&text)?,
            Token::DocDecl(text) => sink.docdecl(&text)?,
            Token::Unknown(code) => {
                return Err(XmlError::ProtocolViolation(format!(
                    "unknown token {code} after {events} event(s)"
                )));
            }
        }
    }
}
