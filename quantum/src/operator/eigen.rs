use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use racah_core::Result;

use crate::matrix_util;

use super::Operator;

/// Eigendecomposition of a Hermitian operator: real eigenvalues in
/// ascending order (the Hermitian solver sorts them; the relative ordering
/// of a general operator's eigenpairs, by contrast, is unspecified) paired
/// with an orthonormal eigenvector matrix.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: DMatrix<Complex64>,
}

/// Eigendecomposition of a general (possibly non-normal) operator via
/// Schur triangularization. Eigenpair ordering is whatever the Schur
/// decomposition produces and is not guaranteed to be sorted.
#[derive(Debug, Clone)]
pub struct GeneralEigenDecomposition {
    pub eigenvalues: DVector<Complex64>,
    pub eigenvectors: DMatrix<Complex64>,
}

pub fn hermitian(op: &dyn Operator) -> Result<EigenDecomposition> {
    let (eigenvalues, eigenvectors) = matrix_util::hermitian_eigen(&op.to_matrix())?;
    Ok(EigenDecomposition { eigenvalues, eigenvectors })
}

pub fn general(op: &dyn Operator) -> Result<GeneralEigenDecomposition> {
    let (eigenvalues, eigenvectors) = matrix_util::general_eigen(&op.to_matrix())?;
    Ok(GeneralEigenDecomposition { eigenvalues, eigenvectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::DenseOperator;
    use crate::operator::OperatorType;
    use approx::assert_relative_eq;

    #[test]
    fn pauli_z_spectrum_is_plus_minus_one() {
        let z = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-1.0, 0.0),
            ],
        );
        let op = DenseOperator::new(z, OperatorType::Hermitian).unwrap();
        let eig = hermitian(&op).unwrap();
        assert_relative_eq!(eig.eigenvalues[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(eig.eigenvalues[1], 1.0, epsilon = 1e-9);
    }
}
