//! Six-character payload checksum.
//!
//! Catches typos and casual tampering in pasted codes. It is not a MAC.

/// Length of every checksum string.
pub const CHECKSUM_LEN: usize = 6;

/// djb2 seed.
const SEED: u32 = 5381;

/// Filler appended when the base-36 digest is shorter than six characters.
const PAD: char = '0';

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// djb2 over the UTF-16 code units of `input`, wrapped to 32 bits.
#[must_use]
pub fn djb2(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(SEED, |hash, unit| hash.wrapping_mul(33).wrapping_add(u32::from(unit)))
}

/// Renders `value` in lowercase base 36.
fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}

/// Checksum of `input`: base-36 djb2, truncated or padded to six characters.
#[must_use]
pub fn checksum6(input: &str) -> String {
    let mut digest = to_base36(djb2(input));
    digest.truncate(CHECKSUM_LEN);
    while digest.len() < CHECKSUM_LEN {
        digest.push(PAD);
    }
    digest
}
