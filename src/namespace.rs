//! Reconciles the two spellings of "no namespace".
//!
//! Some parsers report an empty string when namespaces are unsupported while
//! sinks expect `None`. Every namespace read from a source goes through
//! [`normalize`] before it reaches a sink.

/// Map `None` and `Some("")` to `None`; pass anything else through.
pub fn normalize(namespace: Option<&str>) -> Option<&str> {
    match namespace {
        Some(ns) if !ns.is_empty() => Some(ns),
        _ => None,
    }
}
