//! Attribute text encodings.
//!
//! The `.cpg` sidecar names the code page of the `.dbf` text fields. Only the
//! two encodings seen in practice for this data are supported.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShpError};

/// Text encoding of `.dbf` character fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShpEncoding {
    /// UTF-8 (default for written files).
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character.
    Latin1,
}

impl ShpEncoding {
    /// Parse a code page label such as `UTF-8`, `utf8`, `ISO-8859-1` or `88591`.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" | "65001" => Ok(Self::Utf8),
            "iso88591" | "88591" | "latin1" | "l1" => Ok(Self::Latin1),
            _ => Err(ShpError::unsupported_encoding(label.trim())),
        }
    }

    /// Label written to the `.cpg` file.
    #[must_use]
    pub const fn cpg_label(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode field bytes, returning `None` when they are not valid text.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Encode text, returning `None` when a character has no representation.
    #[must_use]
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::Latin1 => text.chars().map(|ch| u8::try_from(ch).ok()).collect(),
        }
    }
}

impl fmt::Display for ShpEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cpg_label())
    }
}

impl FromStr for ShpEncoding {
    type Err = ShpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}
