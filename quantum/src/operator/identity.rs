use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::Result;

use crate::state::StateVector;

use super::{Operator, OperatorType};

/// The identity operator on a given dimension, applied without
/// materializing a matrix.
#[derive(Debug, Clone, Copy)]
pub struct IdentityOperator {
    dimension: usize,
}

impl IdentityOperator {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Operator for IdentityOperator {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn type_tag(&self) -> OperatorType {
        OperatorType::Identity
    }

    fn to_matrix(&self) -> DMatrix<Complex64> {
        DMatrix::identity(self.dimension, self.dimension)
    }

    fn apply(&self, state: &StateVector) -> Result<StateVector> {
        if state.dimension() != self.dimension {
            return Err(racah_core::RacahError::dimension("operator/state dimension mismatch"));
        }
        Ok(state.clone())
    }
}
