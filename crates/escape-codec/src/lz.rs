//! Variable-width LZ78 compressor used by current progress codes.
//!
//! The input is read as UTF-16 code units. Both sides grow the same
//! dictionary in lockstep, so only the code stream is transmitted:
//!
//! - codes `0`, `1` and `2` are reserved: an 8-bit literal follows, a 16-bit
//!   literal follows, end of stream
//! - the first unseen occurrence of a unit is sent as a literal and gets the
//!   next dictionary code
//! - every emitted phrase adds "phrase + next unit" to the dictionary
//! - codes start narrow and gain a bit each time the current width's
//!   capacity is used up; the opening literal marker is two bits wide and
//!   the stream proper starts at three
//!
//! Bits of each code are written least significant first and packed six per
//! symbol of [`transport::ALPHABET`], most significant symbol bit first.

use ahash::{AHashMap, AHashSet};

use crate::transport::{self, BITS_PER_SYMBOL};
use crate::{CompressionError, CompressionResult, MAX_DECOMPRESSED_UNITS};

/// Next literal is an 8-bit unit.
const CODE_LITERAL_8: u32 = 0;
/// Next literal is a 16-bit unit.
const CODE_LITERAL_16: u32 = 1;
/// End of stream.
const CODE_END: u32 = 2;
/// First code available to dictionary entries.
const FIRST_FREE_CODE: u32 = 3;

/// Value of the top bit of a symbol; the reader's starting mask.
const SYMBOL_TOP_BIT: u32 = 1 << (BITS_PER_SYMBOL - 1);

/// Current code width and how many more codes fit before it grows.
#[derive(Debug, Clone, Copy)]
struct CodeWidth {
    bits: u32,
    remaining: u32,
}

impl CodeWidth {
    /// Encoder state before the opening literal.
    const ENCODER_START: Self = Self { bits: 2, remaining: 2 };
    /// Decoder state after the opening literal has been read.
    const DECODER_START: Self = Self { bits: 3, remaining: 4 };

    /// Accounts for one dictionary insertion, widening when full.
    fn tick(&mut self) {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = 1 << self.bits;
            self.bits += 1;
        }
    }
}

/// Packs variable-width codes into alphabet symbols.
struct BitWriter {
    output: String,
    value: u32,
    position: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            value: 0,
            position: 0,
        }
    }

    fn write(&mut self, mut value: u32, bits: u32) {
        for _ in 0..bits {
            self.value = (self.value << 1) | (value & 1);
            value >>= 1;
            self.advance();
        }
    }

    fn advance(&mut self) {
        if self.position == BITS_PER_SYMBOL - 1 {
            self.output.push(transport::symbol(self.value));
            self.position = 0;
            self.value = 0;
        } else {
            self.position += 1;
        }
    }

    /// Pads the last symbol with zero bits.
    fn finish(mut self) -> String {
        loop {
            self.value <<= 1;
            if self.position == BITS_PER_SYMBOL - 1 {
                self.output.push(transport::symbol(self.value));
                return self.output;
            }
            self.position += 1;
        }
    }
}

/// The longest dictionary match seen so far.
#[derive(Debug, Clone, Copy)]
struct Phrase {
    code: u32,
    /// Set when the phrase is a single unit.
    unit: Option<u16>,
}

/// Per-call compressor state.
struct Encoder {
    units: AHashMap<u16, u32>,
    /// Units given a code but not yet sent as literals.
    pending_literals: AHashSet<u16>,
    phrases: AHashMap<(u32, u16), u32>,
    next_code: u32,
    width: CodeWidth,
    writer: BitWriter,
    current: Option<Phrase>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            units: AHashMap::new(),
            pending_literals: AHashSet::new(),
            phrases: AHashMap::new(),
            next_code: FIRST_FREE_CODE,
            width: CodeWidth::ENCODER_START,
            writer: BitWriter::new(),
            current: None,
        }
    }

    fn assign_code(&mut self) -> u32 {
        let code = self.next_code;
        self.next_code += 1;
        code
    }

    fn push(&mut self, unit: u16) {
        let unit_code = match self.units.get(&unit) {
            Some(&code) => code,
            None => {
                let code = self.assign_code();
                self.units.insert(unit, code);
                self.pending_literals.insert(unit);
                code
            },
        };
        let single = Phrase {
            code: unit_code,
            unit: Some(unit),
        };

        let Some(current) = self.current else {
            self.current = Some(single);
            return;
        };

        if let Some(&code) = self.phrases.get(&(current.code, unit)) {
            self.current = Some(Phrase { code, unit: None });
            return;
        }

        self.emit(current);
        let code = self.assign_code();
        self.phrases.insert((current.code, unit), code);
        self.current = Some(single);
    }

    fn emit(&mut self, phrase: Phrase) {
        match phrase.unit {
            Some(unit) if self.pending_literals.remove(&unit) => {
                if unit < 256 {
                    self.writer.write(CODE_LITERAL_8, self.width.bits);
                    self.writer.write(u32::from(unit), 8);
                } else {
                    self.writer.write(CODE_LITERAL_16, self.width.bits);
                    self.writer.write(u32::from(unit), 16);
                }
                self.width.tick();
            },
            _ => self.writer.write(phrase.code, self.width.bits),
        }
        self.width.tick();
    }

    fn finish(mut self) -> String {
        if let Some(current) = self.current.take() {
            self.emit(current);
        }
        self.writer.write(CODE_END, self.width.bits);
        self.writer.finish()
    }
}

/// Compresses `input` into alphabet symbols. Empty input gives an empty string.
#[must_use]
pub fn compress(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut encoder = Encoder::new();
    for unit in input.encode_utf16() {
        encoder.push(unit);
    }
    encoder.finish()
}

/// Reads variable-width codes back out of symbol values.
struct BitReader<'a> {
    symbols: &'a [u32],
    value: u32,
    mask: u32,
    index: usize,
}

impl<'a> BitReader<'a> {
    fn new(symbols: &'a [u32]) -> Self {
        Self {
            symbols,
            value: symbols.first().copied().unwrap_or(0),
            mask: SYMBOL_TOP_BIT,
            index: 1,
        }
    }

    /// Reads `bits` bits, least significant first. Past the end reads zeros.
    fn read(&mut self, bits: u32) -> u32 {
        let mut result = 0;
        for power in 0..bits {
            let bit = self.value & self.mask;
            self.mask >>= 1;
            if self.mask == 0 {
                self.mask = SYMBOL_TOP_BIT;
                self.value = self.symbols.get(self.index).copied().unwrap_or(0);
                self.index += 1;
            }
            if bit != 0 {
                result |= 1 << power;
            }
        }
        result
    }

    fn is_exhausted(&self) -> bool {
        self.index > self.symbols.len()
    }

    fn read_literal(&mut self, marker: u32) -> u16 {
        let bits = if marker == CODE_LITERAL_8 { 8 } else { 16 };
        self.read(bits) as u16
    }
}

/// Rebuilds text from a payload produced by [`compress`].
pub fn decompress(payload: &str) -> CompressionResult<String> {
    if payload.is_empty() {
        return Err(CompressionError::Empty);
    }
    let symbols = payload
        .chars()
        .map(|c| transport::symbol_value(c).ok_or(CompressionError::InvalidSymbol(c)))
        .collect::<CompressionResult<Vec<u32>>>()?;
    let mut reader = BitReader::new(&symbols);

    // Reserved slots keep dictionary indices equal to codes.
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(); FIRST_FREE_CODE as usize];

    let first = match reader.read(2) {
        marker @ (CODE_LITERAL_8 | CODE_LITERAL_16) => reader.read_literal(marker),
        CODE_END => return Ok(String::new()),
        code => {
            return Err(CompressionError::InvalidCode {
                code,
                next: FIRST_FREE_CODE,
            })
        },
    };
    dictionary.push(vec![first]);
    let mut previous = vec![first];
    let mut output = previous.clone();
    let mut width = CodeWidth::DECODER_START;

    loop {
        if reader.is_exhausted() {
            return Err(CompressionError::Truncated);
        }

        let code = match reader.read(width.bits) {
            marker @ (CODE_LITERAL_8 | CODE_LITERAL_16) => {
                let unit = reader.read_literal(marker);
                dictionary.push(vec![unit]);
                width.tick();
                dictionary.len() - 1
            },
            CODE_END => {
                return String::from_utf16(&output).map_err(|_| CompressionError::InvalidText)
            },
            code => code as usize,
        };

        let entry = match dictionary.get(code) {
            Some(entry) => entry.clone(),
            // The encoder used the phrase it was still defining.
            None if code == dictionary.len() => {
                let mut entry = previous.clone();
                entry.push(previous[0]);
                entry
            },
            None => {
                return Err(CompressionError::InvalidCode {
                    code: code as u32,
                    next: dictionary.len() as u32,
                })
            },
        };

        if output.len() + entry.len() > MAX_DECOMPRESSED_UNITS {
            return Err(CompressionError::TooLarge {
                limit: MAX_DECOMPRESSED_UNITS,
            });
        }
        output.extend_from_slice(&entry);
        let mut phrase = previous;
        phrase.push(entry[0]);
        dictionary.push(phrase);
        width.tick();
        previous = entry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn compress_with_width(input: &str) -> (String, u32) {
        let mut encoder = Encoder::new();
        for unit in input.encode_utf16() {
            encoder.push(unit);
        }
        let bits = encoder.width.bits;
        (encoder.finish(), bits)
    }

    #[test]
    fn test_known_outputs() {
        assert_eq!(compress("a"), "IZA");
        assert_eq!(compress("aaaa"), "IY5A");
        assert_eq!(decompress("IZA").expect("decompress"), "a");
        assert_eq!(decompress("IY5A").expect("decompress"), "aaaa");
    }

    #[test]
    fn test_empty_input_encodes_to_empty_string() {
        assert_eq!(compress(""), "");
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert_eq!(decompress(""), Err(CompressionError::Empty));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = r#"{"v":1,"currentSceneId":"intro","completed":{"seal1":false,"seal2":false,"seal3":false,"seal4":false,"final":false},"puzzles":{},"inventory":[],"flags":{}}"#;
        let payload = compress(json);
        assert!(payload.len() < json.len());
        assert!(payload.chars().all(|c| transport::symbol_value(c).is_some()));
        assert_eq!(decompress(&payload).expect("decompress"), json);
    }

    #[test]
    fn test_sixteen_bit_literals() {
        let text = "¡Sello ✓ 😀! ✓ 😀";
        assert_eq!(decompress(&compress(text)).expect("decompress"), text);
    }

    #[test]
    fn test_width_grows_on_long_input() {
        let text: String = (0..200)
            .map(|i| format!(r#"{{"id":"p{i}","status":"done","score":{}}}"#, i * 7))
            .collect();
        let (payload, bits) = compress_with_width(&text);
        assert!(bits > 8, "width stayed at {bits} bits");
        assert_eq!(decompress(&payload).expect("decompress"), text);
    }

    #[test]
    fn test_rejects_foreign_symbol() {
        assert_eq!(
            decompress("IZ.A"),
            Err(CompressionError::InvalidSymbol('.'))
        );
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let payload = compress("hello hello hello");
        let truncated = &payload[..payload.len() / 2];
        assert!(decompress(truncated).is_err());
    }

    #[test]
    fn test_rejects_code_from_the_future() {
        // Opening literal 'a' takes code 3, so at three bits the only valid
        // references are 3 and the next entry, 4.
        let mut writer = BitWriter::new();
        writer.write(CODE_LITERAL_8, 2);
        writer.write(u32::from(b'a'), 8);
        writer.write(7, 3);
        writer.write(CODE_END, 3);
        let payload = writer.finish();
        assert_eq!(
            decompress(&payload),
            Err(CompressionError::InvalidCode { code: 7, next: 4 })
        );
    }

    #[test]
    fn test_rejects_self_referencing_blowup() {
        // Each code names the entry still being defined, so entry k is k+1
        // units long and output grows quadratically in the payload.
        let mut writer = BitWriter::new();
        writer.write(CODE_LITERAL_8, 2);
        writer.write(u32::from(b'a'), 8);
        let mut width = CodeWidth::DECODER_START;
        for code in 4..1_004 {
            writer.write(code, width.bits);
            width.tick();
        }
        writer.write(CODE_END, width.bits);
        let payload = writer.finish();

        assert!(payload.len() < 2_000);
        assert_eq!(
            decompress(&payload),
            Err(CompressionError::TooLarge {
                limit: MAX_DECOMPRESSED_UNITS
            })
        );
    }

    #[test]
    fn test_output_at_the_cap_still_decodes() {
        let text = "a".repeat(MAX_DECOMPRESSED_UNITS);
        assert_eq!(decompress(&compress(&text)).expect("decompress"), text);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(text in "\\PC{1,400}") {
            prop_assert_eq!(decompress(&compress(&text)).expect("decompress"), text);
        }
    }
}
