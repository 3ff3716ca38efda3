use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::Result;

use crate::state::StateVector;

use super::{Operator, OperatorType};

/// An operator whose only nonzero entries lie on the diagonal, applied in
/// O(n) rather than via a full matrix-vector product.
#[derive(Debug, Clone)]
pub struct DiagonalOperator {
    entries: Vec<Complex64>,
}

impl DiagonalOperator {
    pub fn new(entries: Vec<Complex64>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Complex64] {
        &self.entries
    }
}

impl Operator for DiagonalOperator {
    fn dimension(&self) -> usize {
        self.entries.len()
    }

    fn type_tag(&self) -> OperatorType {
        OperatorType::Diagonal
    }

    fn to_matrix(&self) -> DMatrix<Complex64> {
        DMatrix::from_diagonal(&nalgebra::DVector::from_vec(self.entries.clone()))
    }

    fn apply(&self, state: &StateVector) -> Result<StateVector> {
        if state.dimension() != self.dimension() {
            return Err(racah_core::RacahError::dimension("operator/state dimension mismatch"));
        }
        let out: Vec<Complex64> = (0..self.dimension())
            .map(|i| self.entries[i] * state.get(i).expect("index within dimension"))
            .collect();
        StateVector::new(out)
    }
}
