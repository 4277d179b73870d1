//! # Escape Gameplay
//!
//! Progress handling for Escape EM.
//!
//! This crate provides everything above the raw codecs:
//! - Progress record, its code projection and rehydration
//! - Progress codes (export, import, legacy generations)
//! - Local persistence of the live record
//! - Game session tying record, codes and storage together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod progress;
pub mod progress_code;
pub mod session;
pub mod storage;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::progress::*;
    pub use crate::progress_code::{decode, decode_at, encode};
    pub use crate::session::*;
    pub use crate::storage::*;
}

pub use prelude::*;
