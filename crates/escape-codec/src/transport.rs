//! Transport-safe alphabet shared by every generation.
//!
//! Payloads must survive URLs, chat clients and being read aloud, and they
//! must never contain the `.` segment separator. All generations use the
//! base64url alphabet without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::{CompressionError, CompressionResult};

/// Symbols in value order: `A-Z`, `a-z`, `0-9`, `-`, `_`.
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Bits carried by one symbol.
pub const BITS_PER_SYMBOL: u32 = 6;

/// Symbol for a six-bit value.
#[must_use]
pub fn symbol(value: u32) -> char {
    char::from(ALPHABET[(value & 0x3F) as usize])
}

/// Six-bit value of a symbol, if it belongs to the alphabet.
#[must_use]
pub const fn symbol_value(symbol: char) -> Option<u32> {
    match symbol {
        'A'..='Z' => Some(symbol as u32 - 'A' as u32),
        'a'..='z' => Some(symbol as u32 - 'a' as u32 + 26),
        '0'..='9' => Some(symbol as u32 - '0' as u32 + 52),
        '-' => Some(62),
        '_' => Some(63),
        _ => None,
    }
}

/// Encodes raw bytes.
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes raw bytes.
pub fn decode_bytes(payload: &str) -> CompressionResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| CompressionError::Transport(e.to_string()))
}

/// Encodes text as its UTF-8 bytes.
#[must_use]
pub fn encode_text(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

/// Decodes text previously produced by [`encode_text`].
pub fn decode_text(payload: &str) -> CompressionResult<String> {
    let bytes = decode_bytes(payload)?;
    String::from_utf8(bytes).map_err(|_| CompressionError::InvalidText)
}
