//! ID types for scenes, items and puzzles.
//!
//! Story content is authored as JSON, so every id is a string. The newtypes
//! keep scene, item and puzzle ids from being mixed up while serializing as
//! bare strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the raw ID value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a scene in the external scene table.
    SceneId
);

string_id!(
    /// Identifier of an inventory item.
    ItemId
);

string_id!(
    /// Identifier of a puzzle.
    PuzzleId
);

impl SceneId {
    /// Scene every new game starts in.
    pub const ENTRY: &'static str = "intro";

    /// Returns the entry scene ID.
    #[must_use]
    pub fn entry() -> Self {
        Self::new(Self::ENTRY)
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::entry()
    }
}
