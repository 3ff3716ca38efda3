//! Shared numeric tolerances.
//!
//! Every comparison in the workspace (hermiticity, unitarity, normalization,
//! CG orthonormality, ...) is defined "within tolerance" against this one
//! constant unless a caller has a specific reason to override it.

/// Default absolute tolerance used throughout the workspace.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;
