//! Error types shared across the Racah workspace.

use thiserror::Error;

/// Result type for Racah operations.
pub type Result<T> = std::result::Result<T, RacahError>;

/// Error taxonomy for the quantum algebra kernel and everything built on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RacahError {
    /// Shape mismatch: state/operator dimensions, partial-trace dims, tensor factorization.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Invalid argument: j not half-integer >= 0, m out of range, dimension <= 0,
    /// probability outside [0,1], trace-out index out of range or duplicated.
    #[error("domain error: {0}")]
    Domain(String),

    /// Attempt to normalize a zero vector, or probabilities summing away from 1.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// A declared type (hermitian/unitary/projection/Kraus-complete) was violated.
    #[error("structural error: {0}")]
    Structural(String),

    /// Attempt to install or individually label a graph element already in a composite.
    #[error("composite conflict: {0}")]
    CompositeConflict(String),

    /// Relative entropy requested where support(rho) is not contained in support(sigma).
    #[error("support error: {0}")]
    Support(String),

    /// Non-finite values encountered, or an eigensolver failed to converge.
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl RacahError {
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::Dimension(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    pub fn composite_conflict(msg: impl Into<String>) -> Self {
        Self::CompositeConflict(msg.into())
    }

    pub fn support(msg: impl Into<String>) -> Self {
        Self::Support(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RacahError::dimension("state/operator mismatch");
        assert!(err.to_string().contains("dimension error"));

        let err = RacahError::structural("not hermitian");
        assert!(err.to_string().contains("structural error"));
    }
}
