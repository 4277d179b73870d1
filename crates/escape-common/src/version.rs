//! Version types for the progress record and the progress-code format.

use std::fmt;

/// The only progress-record schema this build reads or writes.
pub const SCHEMA_VERSION: u32 = 1;

/// One historical generation of the progress-code format.
///
/// Every generation ever shipped stays decodable. Only the current one is
/// produced on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeGeneration {
    /// Full record, base64url text, no compression.
    Gen1,
    /// Minimal record, fixed-width 16-bit LZW, base64url bytes.
    Gen2,
    /// Minimal record, variable-width LZ packed straight into the alphabet.
    Gen3,
}

impl CodeGeneration {
    /// All generations, oldest first.
    pub const ALL: [Self; 3] = [Self::Gen1, Self::Gen2, Self::Gen3];

    /// The generation produced on export.
    pub const CURRENT: Self = Self::Gen3;

    /// Canonical tag written in the first code segment.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Gen1 => "GEN1",
            Self::Gen2 => "GEN2",
            Self::Gen3 => "GEN3",
        }
    }

    /// Tags accepted on import, canonical tag first.
    ///
    /// The first two generations went out as `EM1` and `EM2`, and those
    /// codes may still be printed on handouts.
    #[must_use]
    pub const fn accepted_tags(self) -> &'static [&'static str] {
        match self {
            Self::Gen1 => &["GEN1", "EM1"],
            Self::Gen2 => &["GEN2", "EM2"],
            Self::Gen3 => &["GEN3"],
        }
    }

    /// Looks up a generation by any of its accepted tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|generation| generation.accepted_tags().contains(&tag))
    }

    /// Whether this generation is the one produced on export.
    #[must_use]
    pub const fn is_current(self) -> bool {
        matches!(self, Self::Gen3)
    }

    /// Whether the payload carries the full record instead of the minimal one.
    #[must_use]
    pub const fn carries_full_state(self) -> bool {
        matches!(self, Self::Gen1)
    }
}

impl fmt::Display for CodeGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_accepts_legacy_spellings() {
        assert_eq!(CodeGeneration::from_tag("GEN1"), Some(CodeGeneration::Gen1));
        assert_eq!(CodeGeneration::from_tag("EM1"), Some(CodeGeneration::Gen1));
        assert_eq!(CodeGeneration::from_tag("EM2"), Some(CodeGeneration::Gen2));
        assert_eq!(CodeGeneration::from_tag("GEN3"), Some(CodeGeneration::Gen3));
    }

    #[test]
    fn test_from_tag_rejects_unknown() {
        assert_eq!(CodeGeneration::from_tag("GEN9"), None);
        assert_eq!(CodeGeneration::from_tag("gen3"), None);
        assert_eq!(CodeGeneration::from_tag(""), None);
    }

    #[test]
    fn test_current_generation() {
        assert!(CodeGeneration::CURRENT.is_current());
        assert!(!CodeGeneration::Gen1.is_current());
        assert_eq!(CodeGeneration::CURRENT.to_string(), "GEN3");
    }
}
