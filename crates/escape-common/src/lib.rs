//! # Escape Common
//!
//! Shared types for the Escape EM workspace.
//!
//! This crate provides the small vocabulary every other crate speaks:
//! - ID types (SceneId, ItemId, PuzzleId)
//! - Schema and progress-code generation versions
//! - The progress-code error taxonomy
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_compare_by_value() {
        assert_eq!(SceneId::new("intro"), SceneId::from("intro"));
        assert_ne!(ItemId::new("key"), ItemId::new("map"));
    }

    #[test]
    fn test_current_generation_is_unique() {
        let current: Vec<_> = CodeGeneration::ALL
            .iter()
            .filter(|generation| generation.is_current())
            .collect();
        assert_eq!(current, vec![&CodeGeneration::Gen3]);
    }

    #[test]
    fn test_error_kind_mapping() {
        let err = CodeError::UnsupportedVersion("GEN9".to_string());
        assert_eq!(err.kind(), CodeErrorKind::UnsupportedVersion);
        assert_eq!(CodeError::Malformed { segments: 1 }.kind(), CodeErrorKind::Malformed);
    }
}
