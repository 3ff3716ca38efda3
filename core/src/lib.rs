//! # Racah Core
//!
//! Shared error taxonomy and numeric tolerances for the Racah workspace.
//!
//! This crate deliberately stays small: it is consumed by [`racah_quantum`]
//! and exists only so the error type and the default comparison tolerance
//! have a single definition.

pub mod error;
pub mod tolerance;

pub use error::{RacahError, Result};
pub use tolerance::DEFAULT_TOLERANCE;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
