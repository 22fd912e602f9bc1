use std::io::{Read, Write};

use crate::io::{Capability, InMemorySink, InMemorySource, InputProvider, OutputTarget};

#[test]
fn source_opens_fresh_streams() {
    let source = InMemorySource::from_string("mem", "abc");
    assert_eq!(source.id(), "mem");

    for _ in 0..2 {
        let mut out = String::new();
        source.open().unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc");
    }
}

#[test]
fn source_capability_is_configurable() {
    for capability in [
        Capability::Positional,
        Capability::Bufferable,
        Capability::Sequential,
    ] {
        let source = InMemorySource::new("mem", b"abc".to_vec()).with_capability(capability);
        assert_eq!(source.open().unwrap().capability(), capability);
    }
}

#[test]
fn sink_overwrite_replaces_contents() {
    let sink = InMemorySink::new("out");
    assert!(!sink.exists());

    let mut handle = sink.open_overwrite().unwrap();
    handle.write_all(b"first").unwrap();
    handle.write_all(b"+more").unwrap();
    assert!(sink.exists());
    assert_eq!(sink.contents_string(), "first+more");

    sink.open_overwrite().unwrap().write_all(b"second").unwrap();
    assert_eq!(sink.contents(), b"second");

    sink.clear();
    assert!(!sink.exists());
}

#[test]
fn sink_clones_share_contents() {
    let sink = InMemorySink::new("out");
    let clone = sink.clone();
    clone.open_overwrite().unwrap().write_all(b"shared").unwrap();
    assert_eq!(sink.contents_string(), "shared");
}
