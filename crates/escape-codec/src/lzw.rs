//! Fixed-width LZW used by second-generation codes.
//!
//! Works on the UTF-8 bytes of the input. The dictionary starts with the 256
//! single-byte strings and every code is written as a big-endian `u16`. Once
//! the dictionary holds [`MAX_ENTRIES`] strings, the next insertion resets it
//! to the single-byte seed instead. The decoder mirrors the reset one code
//! later, so neither side ever sends the dictionary.
//!
//! Superseded by [`crate::lz`], kept so old codes still import.

use ahash::AHashMap;

use crate::{transport, CompressionError, CompressionResult, MAX_DECOMPRESSED_UNITS};

/// Dictionary capacity; codes run from `0` to `MAX_ENTRIES - 1`.
pub const MAX_ENTRIES: usize = 65_535;

/// Number of single-byte seed entries.
const SEED_ENTRIES: usize = 256;

/// Encoder-side dictionary keyed by (prefix code, next byte).
struct EncodeDictionary {
    phrases: AHashMap<(u16, u8), u16>,
    next_code: usize,
}

impl EncodeDictionary {
    fn new() -> Self {
        Self {
            phrases: AHashMap::new(),
            next_code: SEED_ENTRIES,
        }
    }

    fn get(&self, prefix: u16, byte: u8) -> Option<u16> {
        self.phrases.get(&(prefix, byte)).copied()
    }

    fn insert_or_reset(&mut self, prefix: u16, byte: u8) {
        if self.next_code < MAX_ENTRIES {
            self.phrases.insert((prefix, byte), self.next_code as u16);
            self.next_code += 1;
        } else {
            self.phrases.clear();
            self.next_code = SEED_ENTRIES;
        }
    }
}

/// Compresses `input` into the 16-bit code sequence.
#[must_use]
pub fn compress_codes(input: &str) -> Vec<u16> {
    let mut dictionary = EncodeDictionary::new();
    let mut codes = Vec::new();
    let mut current: Option<u16> = None;

    for &byte in input.as_bytes() {
        let Some(prefix) = current else {
            current = Some(u16::from(byte));
            continue;
        };
        if let Some(code) = dictionary.get(prefix, byte) {
            current = Some(code);
            continue;
        }
        codes.push(prefix);
        dictionary.insert_or_reset(prefix, byte);
        current = Some(u16::from(byte));
    }

    if let Some(prefix) = current {
        codes.push(prefix);
    }
    codes
}

/// Compresses `input` into big-endian byte pairs.
#[must_use]
pub fn compress_to_bytes(input: &str) -> Vec<u8> {
    compress_codes(input)
        .into_iter()
        .flat_map(u16::to_be_bytes)
        .collect()
}

/// Compresses `input` into transport text.
#[must_use]
pub fn compress(input: &str) -> String {
    transport::encode_bytes(&compress_to_bytes(input))
}

/// Rebuilds text from a code sequence.
pub fn decompress_codes(codes: &[u16]) -> CompressionResult<String> {
    let mut entries: Vec<Vec<u8>> = (0..=u8::MAX).map(|byte| vec![byte]).collect();
    let mut previous: Option<Vec<u8>> = None;
    let mut output = Vec::new();

    for &code in codes {
        let index = usize::from(code);
        let entry = match (entries.get(index), &previous) {
            (Some(entry), _) => entry.clone(),
            // The encoder used the string it was still defining.
            (None, Some(prev)) if index == entries.len() && index < MAX_ENTRIES => {
                let mut entry = prev.clone();
                entry.push(prev[0]);
                entry
            },
            _ => {
                return Err(CompressionError::InvalidCode {
                    code: u32::from(code),
                    next: entries.len() as u32,
                })
            },
        };

        if output.len() + entry.len() > MAX_DECOMPRESSED_UNITS {
            return Err(CompressionError::TooLarge {
                limit: MAX_DECOMPRESSED_UNITS,
            });
        }
        output.extend_from_slice(&entry);

        if let Some(mut phrase) = previous.take() {
            if entries.len() < MAX_ENTRIES {
                phrase.push(entry[0]);
                entries.push(phrase);
            } else {
                entries.truncate(SEED_ENTRIES);
            }
        }
        previous = Some(entry);
    }

    String::from_utf8(output).map_err(|_| CompressionError::InvalidText)
}

/// Rebuilds text from big-endian byte pairs.
pub fn decompress_bytes(bytes: &[u8]) -> CompressionResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(CompressionError::OddLength(bytes.len()));
    }
    let codes: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    decompress_codes(&codes)
}

/// Rebuilds text from transport text.
pub fn decompress(payload: &str) -> CompressionResult<String> {
    decompress_bytes(&transport::decode_bytes(payload)?)
}
