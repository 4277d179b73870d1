//! Portable progress codes.
//!
//! A code is `TAG.PAYLOAD.CHECKSUM`:
//! - `TAG` names the format generation (`GEN1`, `GEN2`, `GEN3`)
//! - `PAYLOAD` is the record JSON, compressed by that generation
//! - `CHECKSUM` is the six-character digest of `PAYLOAD`
//!
//! Export always writes the current generation. Import accepts every
//! generation in [`GENERATIONS`], so codes handed out long ago keep working.

use escape_codec::{checksum, lz, lzw, transport, CompressionResult};
use escape_common::{CodeError, CodeGeneration, CodeResult};
use tracing::debug;

use crate::progress::{now_millis, MinimalProgressState, ProgressState};

/// Separator between the three code segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Codec pair registered for one generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationCodec {
    /// Generation handled by this entry.
    pub generation: CodeGeneration,
    /// Turns record JSON into a payload.
    pub compress: fn(&str) -> String,
    /// Turns a payload back into record JSON.
    pub decompress: fn(&str) -> CompressionResult<String>,
}

impl GenerationCodec {
    /// Whether export produces this generation.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        self.generation.is_current()
    }
}

/// Every generation ever shipped, oldest first.
pub const GENERATIONS: &[GenerationCodec] = &[
    GenerationCodec {
        generation: CodeGeneration::Gen1,
        compress: transport::encode_text,
        decompress: transport::decode_text,
    },
    GenerationCodec {
        generation: CodeGeneration::Gen2,
        compress: lzw::compress,
        decompress: lzw::decompress,
    },
    GenerationCodec {
        generation: CodeGeneration::Gen3,
        compress: lz::compress,
        decompress: lz::decompress,
    },
];

/// Finds the codec registered for a tag.
#[must_use]
pub fn codec_for_tag(tag: &str) -> Option<&'static GenerationCodec> {
    GENERATIONS
        .iter()
        .find(|codec| codec.generation.accepted_tags().contains(&tag))
}

/// The codec export writes with.
#[must_use]
pub fn current_codec() -> &'static GenerationCodec {
    GENERATIONS
        .iter()
        .find(|codec| codec.is_current())
        .expect("the generation table has a current entry")
}

/// Joins the three segments, computing the checksum.
fn assemble(tag: &str, payload: &str) -> String {
    let sum = checksum::checksum6(payload);
    format!("{tag}{SEGMENT_SEPARATOR}{payload}{SEGMENT_SEPARATOR}{sum}")
}

/// Encodes `state` with a specific generation.
fn encode_with(codec: &GenerationCodec, state: &ProgressState) -> String {
    let json = if codec.generation.carries_full_state() {
        state.to_json()
    } else {
        MinimalProgressState::from(state).to_json()
    };
    let payload = (codec.compress)(&json);
    debug!(
        generation = %codec.generation,
        json_len = json.len(),
        payload_len = payload.len(),
        "Encoded progress code"
    );
    assemble(codec.generation.tag(), &payload)
}

/// Exports progress as a current-generation code.
#[must_use]
pub fn encode(state: &ProgressState) -> String {
    encode_with(current_codec(), state)
}

/// Imports a code, stamping regenerated timestamps with the current time.
pub fn decode(code: &str) -> CodeResult<ProgressState> {
    decode_at(code, now_millis())
}

/// Imports a code, stamping regenerated timestamps with `now_ms`.
pub fn decode_at(code: &str, now_ms: u64) -> CodeResult<ProgressState> {
    let segments: Vec<&str> = code.trim().split(SEGMENT_SEPARATOR).collect();
    let [tag, payload, sum] = segments[..] else {
        return Err(CodeError::Malformed {
            segments: segments.len(),
        });
    };

    let expected = checksum::checksum6(payload);
    if expected != sum {
        return Err(CodeError::ChecksumMismatch {
            expected,
            found: sum.to_string(),
        });
    }

    let codec =
        codec_for_tag(tag).ok_or_else(|| CodeError::UnsupportedVersion(tag.to_string()))?;

    let json =
        (codec.decompress)(payload).map_err(|e| CodeError::CorruptPayload(e.to_string()))?;
    if json.is_empty() {
        return Err(CodeError::CorruptPayload("payload decodes to nothing".to_string()));
    }
    debug!(
        generation = %codec.generation,
        payload_len = payload.len(),
        json_len = json.len(),
        "Decoded progress code"
    );

    ProgressState::from_json(&json, now_ms).map_err(|e| CodeError::InvalidState(e.to_string()))
}

/// Builds codes in retired generations, for fixtures and compatibility tests.
#[cfg(test)]
pub(crate) fn encode_legacy(state: &ProgressState, generation: CodeGeneration) -> String {
    let codec = codec_for_tag(generation.tag()).expect("every generation is registered");
    encode_with(codec, state)
}

/// Wraps an arbitrary payload with the given tag and a valid checksum.
#[cfg(test)]
pub(crate) fn wrap_payload(tag: &str, payload: &str) -> String {
    assemble(tag, payload)
}
