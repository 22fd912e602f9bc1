//! Tests for one-shot transcoding.

use crate::engine::transcode;
use crate::error::XmlError;
use crate::format::{MAGIC, WireFormat};
use crate::io::InputStream;

const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?><cfg><item k="a &amp; b">v</item><!--c--></cfg>"#;

#[test]
fn text_to_binary_and_back() {
    let binary = transcode(InputStream::from_bytes(DOC), Vec::new(), WireFormat::Binary).unwrap();
    assert_eq!(&binary[..4], &MAGIC);

    let text = transcode(InputStream::from_bytes(binary), Vec::new(), WireFormat::Text).unwrap();
    assert_eq!(
        String::from_utf8(text).unwrap(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cfg><item k="a &amp; b">v</item><!--c--></cfg>"#
    );
}

#[test]
fn binary_to_binary_is_stable() {
    let once = transcode(InputStream::from_bytes(DOC), Vec::new(), WireFormat::Binary).unwrap();
    let twice = transcode(
        InputStream::from_bytes(once.clone()),
        Vec::new(),
        WireFormat::Binary,
    )
    .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn malformed_input_fails() {
    let err = transcode(
        InputStream::from_bytes("<a><b></a>"),
        Vec::new(),
        WireFormat::Binary,
    )
    .unwrap_err();
    assert!(matches!(err, XmlError::Format { .. }), "got {err:?}");
}
