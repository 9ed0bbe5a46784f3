//! Shared types for Nyaya Kavach

pub mod error;

pub use error::{KavachError, Result};
