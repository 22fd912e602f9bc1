
use crate::format::{Encoding, WireFormat};

#[test]
fn wire_format_from_str() {
    assert_eq!(WireFormat::from_str("text"), Some(WireFormat::Text));
    assert_eq!(WireFormat::from_str("XML"), Some(WireFormat::Text));
    assert_eq!(WireFormat::from_str("binary"), Some(WireFormat::Binary));
    assert_eq!(WireFormat::from_str("abx"), Some(WireFormat::Binary));
    assert_eq!(WireFormat::from_str("json"), None);
}

#[test]
fn wire_format_from_flag() {
    assert_eq!(WireFormat::from_binary_flag(true), WireFormat::Binary);
    assert_eq!(WireFormat::from_binary_flag(false), WireFormat::Text);
}

#[test]
fn wire_format_display_round_trips() {
    for format in [WireFormat::Text, WireFormat::Binary] {
        assert_eq!(WireFormat::from_str(&format.to_string()), Some(format));
    }
}

#[test]
fn wire_format_deserializes_lowercase() {
    let format: WireFormat = serde_yaml::from_str("binary").unwrap();
    assert_eq!(format, WireFormat::Binary);
    let format: WireFormat = serde_yaml::from_str("text").unwrap();
    assert_eq!(format, WireFormat::Text);
}

#[test]
fn process_default_is_stable() {
    let first = WireFormat::default();
    for _ in 0..3 {
        assert_eq!(WireFormat::default(), first);
    }
}

#[test]
fn encoding_names() {
    assert_eq!(Encoding::default(), Encoding::Utf8);
    assert_eq!(Encoding::from_name("utf-8"), Some(Encoding::Utf8));
    assert_eq!(Encoding::from_name("ascii"), Some(Encoding::UsAscii));
    assert_eq!(Encoding::from_name("latin1"), Some(Encoding::Iso8859_1));
    assert_eq!(Encoding::from_name("ebcdic"), None);
    for encoding in [
        Encoding::UsAscii,
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::Iso8859_1,
    ] {
        assert_eq!(Encoding::from_name(encoding.name()), Some(encoding));
    }
}
