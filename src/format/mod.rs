//! Wire format selection.
//!
//! This module provides:
//! - `WireFormat`: The two interchangeable document encodings
//! - `Encoding`: Character encodings a text codec can be bound with
//! - `MAGIC`: Leading bytes that identify the binary encoding
//! - The process-wide default format, read once from `XMLWIRE_BINARY`
//! - `binary`, `text`: The parser and serializer of each format

use std::sync::OnceLock;

use serde::Deserialize;

pub mod binary;
pub mod text;

/// Leading bytes of every binary document: `ABX` followed by version 0.
pub const MAGIC: [u8; 4] = [0x41, 0x42, 0x58, 0x00];

/// Environment variable holding the default-format toggle.
pub const BINARY_DEFAULT_ENV: &str = "XMLWIRE_BINARY";

/// The document encodings this crate can resolve between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Human-readable XML text
    Text,
    /// Compact binary framing introduced by [`MAGIC`]
    Binary,
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireFormat::Text => write!(f, "text"),
            WireFormat::Binary => write!(f, "binary"),
        }
    }
}

impl WireFormat {
    /// Parse a format from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "xml" | "txt" => Some(WireFormat::Text),
            "binary" | "bin" | "abx" => Some(WireFormat::Binary),
            _ => None,
        }
    }

    /// Format selected by a boolean "binary enabled" toggle.
    pub fn from_binary_flag(binary: bool) -> Self {
        if binary {
            WireFormat::Binary
        } else {
            WireFormat::Text
        }
    }

    /// Read the toggle from `XMLWIRE_BINARY` without caching.
    ///
    /// Unset or unparsable values select binary.
    pub fn from_env() -> Self {
        let flag = std::env::var(BINARY_DEFAULT_ENV)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);
        Self::from_binary_flag(flag)
    }
}

impl Default for WireFormat {
    /// The process default, read from the environment on first use.
    fn default() -> Self {
        static DEFAULT: OnceLock<WireFormat> = OnceLock::new();
        *DEFAULT.get_or_init(|| {
            let format = WireFormat::from_env();
            tracing::debug!(%format, "default wire format initialized");
            format
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Supported character encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    UsAscii,
    #[default]
    Utf8,
    Utf16,
    Iso8859_1,
}

impl Encoding {
    /// Canonical name, as written in an XML declaration.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::UsAscii => "US-ASCII",
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Look up an encoding by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "US-ASCII" | "ASCII" => Some(Encoding::UsAscii),
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "UTF-16" | "UTF16" => Some(Encoding::Utf16),
            "ISO-8859-1" | "LATIN1" => Some(Encoding::Iso8859_1),
            _ => None,
        }
    }

    /// Whether text in this encoding is written as pure ASCII, with every
    /// other character emitted as a numeric character reference.
    pub(crate) fn is_ascii_only(&self) -> bool {
        matches!(self, Encoding::UsAscii | Encoding::Iso8859_1)
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
