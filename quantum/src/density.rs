//! Density matrices: mixed-state representations with purity, entropy, and
//! partial trace, built on [`DMatrix<Complex64>`] the same way the state
//! vector kernel is built on `DVector<Complex64>`.

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

use crate::matrix_util;
use crate::state::StateVector;

/// A density matrix (Hermitian, unit-trace, positive-semidefinite operator).
#[derive(Debug, Clone)]
pub struct DensityMatrix {
    matrix: DMatrix<Complex64>,
}

impl DensityMatrix {
    /// Wraps an arbitrary Hermitian unit-trace matrix, checking positivity
    /// via `purity() <= 1 + tol` (an indefinite matrix has `tr(rho^2) > 1`,
    /// since `tr(rho^2) <= tr(rho)^2 = 1` holds only for positive-semidefinite
    /// unit-trace matrices). This is a necessary, not sufficient, check for
    /// positive-semidefiniteness, but it is the cheap one spec'd for
    /// construction-time validation; a full eigenvalue-sign check would
    /// require the same eigensolve `von_neumann_entropy` already pays for.
    pub fn from_matrix(matrix: DMatrix<Complex64>) -> Result<Self> {
        if !matrix.is_square() {
            return Err(RacahError::dimension("density matrix must be square"));
        }
        if !matrix_util::is_hermitian(&matrix, DEFAULT_TOLERANCE) {
            return Err(RacahError::structural("density matrix must be hermitian"));
        }
        let trace = matrix.trace();
        if (trace.re - 1.0).abs() > 1e-6 || trace.im.abs() > 1e-6 {
            return Err(RacahError::normalization(format!(
                "density matrix trace must be 1, got {trace}"
            )));
        }
        let purity = (&matrix * &matrix).trace().re;
        if purity > 1.0 + DEFAULT_TOLERANCE {
            return Err(RacahError::structural(format!(
                "density matrix is not positive-semidefinite: purity {purity} > 1"
            )));
        }
        Ok(Self { matrix })
    }

    /// The pure-state density matrix `|psi><psi|`.
    pub fn from_pure_state(state: &StateVector) -> Result<Self> {
        let n = state.norm();
        if (n - 1.0).abs() > 1e-6 {
            return Err(RacahError::normalization("state must be normalized to form a density matrix"));
        }
        let v = state.amplitudes();
        Ok(Self { matrix: v * v.adjoint() })
    }

    /// A statistical mixture `sum_i p_i |psi_i><psi_i|`.
    pub fn mixed_state(states: &[StateVector], probabilities: &[f64]) -> Result<Self> {
        if states.len() != probabilities.len() {
            return Err(RacahError::dimension("states and probabilities must have equal length"));
        }
        if states.is_empty() {
            return Err(RacahError::dimension("mixed state requires at least one component"));
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(RacahError::normalization(format!("probabilities must sum to 1, got {sum}")));
        }
        if probabilities.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
            return Err(RacahError::domain("probabilities must lie in [0, 1]"));
        }
        let dim = states[0].dimension();
        let mut m = DMatrix::<Complex64>::zeros(dim, dim);
        for (state, &p) in states.iter().zip(probabilities) {
            if state.dimension() != dim {
                return Err(RacahError::dimension("all component states must share a dimension"));
            }
            let v = state.amplitudes();
            m += (v * v.adjoint()) * Complex64::new(p, 0.0);
        }
        Self::from_matrix(m)
    }

    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &DMatrix<Complex64> {
        &self.matrix
    }

    /// `tr(rho^2)`, in `(0, 1]`: 1 for a pure state, `1/d` for maximally mixed.
    pub fn purity(&self) -> f64 {
        (&self.matrix * &self.matrix).trace().re
    }

    /// `-tr(rho ln rho)` (natural log), clamping eigenvalues below
    /// [`DEFAULT_TOLERANCE`] to contribute zero (the `0 log 0 = 0` convention).
    pub fn von_neumann_entropy(&self) -> Result<f64> {
        let (eigenvalues, _) = matrix_util::hermitian_eigen(&self.matrix)?;
        Ok(-eigenvalues
            .iter()
            .filter(|&&l| l > DEFAULT_TOLERANCE)
            .map(|&l| l * l.ln())
            .sum::<f64>())
    }

    /// Partial trace over the subsystems in `trace_out`, given the
    /// per-factor dimensions this density matrix's space decomposes into.
    pub fn partial_trace(&self, factor_dimensions: &[usize], trace_out: &[usize]) -> Result<Self> {
        let reduced = crate::operator::partial_trace_matrix(&self.matrix, factor_dimensions, trace_out)?;
        Self::from_matrix(reduced.to_matrix())
    }

    /// Tensor product `rho (x) sigma`.
    pub fn tensor_product(&self, other: &Self) -> Result<Self> {
        Self::from_matrix(self.matrix.kronecker(&other.matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_state_has_unit_purity() {
        let s = StateVector::basis_state(2, 0).unwrap();
        let rho = DensityMatrix::from_pure_state(&s).unwrap();
        assert!((rho.purity() - 1.0).abs() < 1e-9);
        assert!(rho.von_neumann_entropy().unwrap().abs() < 1e-9);
    }

    #[test]
    fn maximally_mixed_qubit_has_half_purity() {
        let s0 = StateVector::basis_state(2, 0).unwrap();
        let s1 = StateVector::basis_state(2, 1).unwrap();
        let rho = DensityMatrix::mixed_state(&[s0, s1], &[0.5, 0.5]).unwrap();
        assert!((rho.purity() - 0.5).abs() < 1e-9);
        assert!((rho.von_neumann_entropy().unwrap() - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn indefinite_matrix_is_rejected() {
        let m = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.5, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-0.5, 0.0),
            ],
        );
        assert!(DensityMatrix::from_matrix(m).is_err());
    }
}
