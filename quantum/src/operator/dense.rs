use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

use crate::matrix_util;

use super::{Operator, OperatorType};

/// An operator backed by a fully materialized dense matrix, with a declared
/// structural tag checked at construction time.
#[derive(Debug, Clone)]
pub struct DenseOperator {
    matrix: DMatrix<Complex64>,
    type_tag: OperatorType,
}

impl DenseOperator {
    /// Builds a dense operator, verifying that `matrix` actually satisfies
    /// the declared `type_tag` within [`DEFAULT_TOLERANCE`].
    pub fn new(matrix: DMatrix<Complex64>, type_tag: OperatorType) -> Result<Self> {
        if !matrix.is_square() {
            return Err(RacahError::dimension("operator matrix must be square"));
        }
        let ok = match type_tag {
            OperatorType::General => true,
            OperatorType::Hermitian => matrix_util::is_hermitian(&matrix, DEFAULT_TOLERANCE),
            OperatorType::Unitary => matrix_util::is_unitary(&matrix, DEFAULT_TOLERANCE),
            OperatorType::Projection => matrix_util::is_projection(&matrix, DEFAULT_TOLERANCE),
            OperatorType::Identity => {
                let n = matrix.nrows();
                (&matrix - DMatrix::<Complex64>::identity(n, n))
                    .iter()
                    .all(|c| c.norm() <= DEFAULT_TOLERANCE)
            }
            OperatorType::Diagonal => {
                let n = matrix.nrows();
                (0..n).all(|i| (0..n).all(|j| i == j || matrix[(i, j)].norm() <= DEFAULT_TOLERANCE))
            }
        };
        if !ok {
            return Err(RacahError::structural(format!(
                "matrix does not satisfy declared type {type_tag:?}"
            )));
        }
        Ok(Self { matrix, type_tag })
    }
}

impl Operator for DenseOperator {
    fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    fn type_tag(&self) -> OperatorType {
        self.type_tag
    }

    fn to_matrix(&self) -> DMatrix<Complex64> {
        self.matrix.clone()
    }
}
