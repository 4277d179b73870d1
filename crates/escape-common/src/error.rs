//! Error types for progress codes.

use thiserror::Error;

/// Why a pasted progress code was rejected.
///
/// Every variant is terminal: the caller reports it and keeps its current
/// progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// The code does not have exactly three dot-separated segments.
    #[error("Malformed code: expected 3 segments, found {segments}")]
    Malformed {
        /// Number of segments found
        segments: usize,
    },

    /// The checksum segment does not match the payload.
    #[error("Checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch {
        /// Checksum recomputed over the payload
        expected: String,
        /// Checksum carried by the code
        found: String,
    },

    /// The generation tag is not one this build understands.
    #[error("Unsupported code version: {0}")]
    UnsupportedVersion(String),

    /// The payload could not be decompressed.
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    /// The payload decompressed but is not a usable progress record.
    #[error("Invalid progress state: {0}")]
    InvalidState(String),
}

/// Fieldless view of [`CodeError`] for callers matching on the category only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeErrorKind {
    /// Wrong segment count
    Malformed,
    /// Tamper or typo
    ChecksumMismatch,
    /// Unknown generation tag
    UnsupportedVersion,
    /// Decompression invariant violated
    CorruptPayload,
    /// Parsed structure is not a progress record
    InvalidState,
}

impl CodeError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> CodeErrorKind {
        match self {
            Self::Malformed { .. } => CodeErrorKind::Malformed,
            Self::ChecksumMismatch { .. } => CodeErrorKind::ChecksumMismatch,
            Self::UnsupportedVersion(_) => CodeErrorKind::UnsupportedVersion,
            Self::CorruptPayload(_) => CodeErrorKind::CorruptPayload,
            Self::InvalidState(_) => CodeErrorKind::InvalidState,
        }
    }
}

impl CodeErrorKind {
    /// Message suitable for showing to a player.
    #[must_use]
    pub const fn player_message(self) -> &'static str {
        match self {
            Self::Malformed => "That does not look like a progress code.",
            Self::ChecksumMismatch => "The code is damaged or was mistyped.",
            Self::UnsupportedVersion => "This code comes from an incompatible version.",
            Self::CorruptPayload => "The code is corrupt and cannot be read.",
            Self::InvalidState => "The code does not contain valid progress.",
        }
    }
}

/// Result type alias for progress-code operations.
pub type CodeResult<T> = Result<T, CodeError>;
