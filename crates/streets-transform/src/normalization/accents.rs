//! Repair of text that was decoded with the wrong code page upstream.
//!
//! The repair reinterprets a string in four stages:
//!
//! 1. encode as Latin-1
//! 2. decode as raw-unicode-escape (`\uXXXX` and `\UXXXXXXXX` escapes)
//! 3. encode as Latin-1 again
//! 4. decode as UTF-8
//!
//! Text such as `"rua sÃ£o bento"` (UTF-8 bytes read as Latin-1) comes out
//! as `"rua são bento"`. Correct text fails stage 4 and is kept as is.

use thiserror::Error;

/// Why a string could not be repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccentRepairError {
    #[error("character {ch:?} at {position} is outside Latin-1")]
    NotLatin1 { ch: char, position: usize },
    #[error("truncated \\{marker} escape at byte {position}")]
    TruncatedEscape { marker: char, position: usize },
    #[error("escape value {value:#x} at byte {position} is not a Unicode scalar")]
    InvalidCodePoint { value: u32, position: usize },
    #[error("re-encoded bytes are not UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Repair `text`, returning it unchanged when any stage fails.
pub fn repair_accents(text: &str) -> String {
    match try_repair_accents(text) {
        Ok(repaired) => repaired,
        Err(error) => {
            tracing::trace!(%error, text, "accent repair fell back to original");
            text.to_string()
        }
    }
}

/// Repair `text`, reporting the failing stage.
pub fn try_repair_accents(text: &str) -> Result<String, AccentRepairError> {
    let latin1 = encode_latin1(text)?;
    let unescaped = decode_raw_unicode_escape(&latin1)?;
    let bytes = encode_latin1(&unescaped)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode bytes as raw-unicode-escape.
///
/// Every byte maps to the code point of the same value, except that a
/// backslash run of odd length followed by `u` (4 hex digits) or `U`
/// (8 hex digits) ends in an escape. Even runs are literal backslashes.
pub fn decode_raw_unicode_escape(bytes: &[u8]) -> Result<String, AccentRepairError> {
    let mut out = String::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte != b'\\' {
            out.push(char::from(byte));
            pos += 1;
            continue;
        }

        let run_start = pos;
        while pos < bytes.len() && bytes[pos] == b'\\' {
            pos += 1;
        }
        let run = pos - run_start;
        let digits = match bytes.get(pos) {
            Some(b'u') if run % 2 == 1 => 4,
            Some(b'U') if run % 2 == 1 => 8,
            _ => {
                out.extend(std::iter::repeat_n('\\', run));
                continue;
            }
        };

        out.extend(std::iter::repeat_n('\\', run - 1));
        let escape_start = pos - 1;
        let marker = char::from(bytes[pos]);
        let hex = bytes
            .get(pos + 1..pos + 1 + digits)
            .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .ok_or(AccentRepairError::TruncatedEscape {
                marker,
                position: escape_start,
            })?;
        let value = hex
            .iter()
            .fold(0u32, |acc, digit| (acc << 4) | hex_value(*digit));
        let ch = char::from_u32(value).ok_or(AccentRepairError::InvalidCodePoint {
            value,
            position: escape_start,
        })?;
        out.push(ch);
        pos += 1 + digits;
    }
    Ok(out)
}

fn encode_latin1(text: &str) -> Result<Vec<u8>, AccentRepairError> {
    text.chars()
        .enumerate()
        .map(|(position, ch)| {
            u8::try_from(u32::from(ch)).map_err(|_| AccentRepairError::NotLatin1 { ch, position })
        })
        .collect()
}

fn hex_value(digit: u8) -> u32 {
    // Callers only pass ASCII hex digits.
    char::from(digit).to_digit(16).unwrap_or(0)
}
