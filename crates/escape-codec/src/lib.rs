//! # Escape Codec
//!
//! Text and byte codecs behind progress codes.
//!
//! Nothing here knows what a progress record is. Each module turns text into
//! transport-safe text and back:
//! - [`checksum`]: six-character djb2 digest of a payload
//! - [`transport`]: base64url alphabet shared by every generation
//! - [`lzw`]: fixed-width 16-bit LZW (second generation)
//! - [`lz`]: variable-width LZ packed six bits per symbol (current generation)
//!
//! # Example
//!
//! ```
//! use escape_codec::{checksum, lz};
//!
//! let json = r#"{"v":1,"currentSceneId":"intro"}"#;
//! let payload = lz::compress(json);
//! assert_eq!(lz::decompress(&payload).unwrap(), json);
//! assert_eq!(checksum::checksum6(&payload).len(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod checksum;
pub mod lz;
pub mod lzw;
pub mod transport;

use thiserror::Error;

/// Largest text any decompressor will produce, in code units (bytes for
/// [`lzw`], UTF-16 units for [`lz`]). Real progress records are a few KiB.
pub const MAX_DECOMPRESSED_UNITS: usize = 256 * 1024;

/// Failure while unpacking a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// Payload was empty where a stream was expected.
    #[error("Empty payload")]
    Empty,

    /// Character outside the transport alphabet.
    #[error("Invalid symbol {0:?} in payload")]
    InvalidSymbol(char),

    /// Transport decoding failed.
    #[error("Invalid transport encoding: {0}")]
    Transport(String),

    /// Code stream ended without an end-of-stream marker.
    #[error("Truncated code stream")]
    Truncated,

    /// Byte stream cannot be split into 16-bit codes.
    #[error("Odd byte count {0} in code stream")]
    OddLength(usize),

    /// Dictionary index that is neither known nor the next to be assigned.
    #[error("Invalid dictionary code {code} (next free: {next})")]
    InvalidCode {
        /// Code read from the stream
        code: u32,
        /// Next code the dictionary would assign
        next: u32,
    },

    /// Output would exceed [`MAX_DECOMPRESSED_UNITS`].
    #[error("Decompressed data exceeds {limit} units")]
    TooLarge {
        /// The cap that was hit
        limit: usize,
    },

    /// Decompressed units are not valid text.
    #[error("Decompressed data is not valid text")]
    InvalidText,
}

/// Result type for codec operations.
pub type CompressionResult<T> = Result<T, CompressionError>;
