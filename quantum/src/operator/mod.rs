//! The operator kernel: a common [`Operator`] trait plus four concrete
//! representations (dense, identity, diagonal, sparse) chosen by
//! [`optimize`] based on a matrix's actual structure, following the same
//! "one trait, several concrete backings selected by a factory" shape as
//! the teacher's gate/operator code.

mod dense;
mod diagonal;
mod eigen;
mod identity;
mod sparse;

pub use dense::DenseOperator;
pub use diagonal::DiagonalOperator;
pub use identity::IdentityOperator;
pub use sparse::SparseOperator;

pub use eigen::{EigenDecomposition, GeneralEigenDecomposition};

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

use crate::matrix_util;
use crate::state::StateVector;

/// The structural tag an operator is declared to satisfy. Declaring a tag
/// that the underlying matrix does not actually have is a
/// [`RacahError::Structural`] error at construction time, not a silent
/// downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorType {
    General,
    Hermitian,
    Unitary,
    Projection,
    Identity,
    Diagonal,
}

/// A linear operator on a finite-dimensional Hilbert space.
pub trait Operator {
    fn dimension(&self) -> usize;
    fn type_tag(&self) -> OperatorType;
    fn to_matrix(&self) -> DMatrix<Complex64>;

    /// Applies the operator to a state vector: `A|psi>`.
    fn apply(&self, state: &StateVector) -> Result<StateVector> {
        if state.dimension() != self.dimension() {
            return Err(RacahError::dimension("operator/state dimension mismatch"));
        }
        let result = self.to_matrix() * state.amplitudes();
        StateVector::new(result.iter().copied().collect())
    }

    /// Composition `self * other` (apply `other` first).
    fn compose(&self, other: &dyn Operator) -> Result<DenseOperator> {
        if self.dimension() != other.dimension() {
            return Err(RacahError::dimension("operator dimension mismatch in compose"));
        }
        DenseOperator::new(self.to_matrix() * other.to_matrix(), OperatorType::General)
    }

    fn adjoint(&self) -> DenseOperator {
        let adj = self.to_matrix().adjoint();
        let tag = match self.type_tag() {
            OperatorType::Hermitian
            | OperatorType::Projection
            | OperatorType::Identity
            | OperatorType::Diagonal
            | OperatorType::Unitary => self.type_tag(),
            OperatorType::General => OperatorType::General,
        };
        DenseOperator::new(adj, tag).expect("adjoint of a square matrix is square")
    }

    fn tensor_product(&self, other: &dyn Operator) -> DenseOperator {
        let m = self.to_matrix().kronecker(&other.to_matrix());
        DenseOperator::new(m, OperatorType::General).expect("kronecker product is square")
    }

    fn scale(&self, factor: Complex64) -> DenseOperator {
        let tag = if factor.im == 0.0 { self.type_tag() } else { OperatorType::General };
        DenseOperator::new(self.to_matrix() * factor, tag).expect("scaling preserves dimension")
    }

    fn add(&self, other: &dyn Operator) -> Result<DenseOperator> {
        if self.dimension() != other.dimension() {
            return Err(RacahError::dimension("operator dimension mismatch in add"));
        }
        DenseOperator::new(self.to_matrix() + other.to_matrix(), OperatorType::General)
    }

    /// Partial trace over the subsystem indices in `trace_out`, given the
    /// per-factor dimensions this operator's full space decomposes into.
    fn partial_trace(&self, factor_dimensions: &[usize], trace_out: &[usize]) -> Result<DenseOperator> {
        partial_trace_matrix(&self.to_matrix(), factor_dimensions, trace_out)
    }
}

fn flatten(indices: &[usize], dims: &[usize]) -> usize {
    indices.iter().zip(dims).fold(0, |acc, (&i, &d)| acc * d + i)
}

fn decompose(mut flat: usize, dims: &[usize]) -> Vec<usize> {
    let mut out = vec![0usize; dims.len()];
    for (slot, &d) in out.iter_mut().zip(dims.iter()).rev() {
        *slot = flat % d;
        flat /= d;
    }
    out
}

/// Partial trace of an operator matrix acting on a tensor-product space,
/// tracing out the named factor indices.
pub fn partial_trace_matrix(
    m: &DMatrix<Complex64>,
    factor_dimensions: &[usize],
    trace_out: &[usize],
) -> Result<DenseOperator> {
    let n = factor_dimensions.len();
    let dim: usize = factor_dimensions.iter().product();
    if m.nrows() != dim || m.ncols() != dim {
        return Err(RacahError::dimension("operator dimension does not match factor product"));
    }
    let mut seen = vec![false; n];
    for &idx in trace_out {
        if idx >= n {
            return Err(RacahError::domain(format!("trace-out index {idx} out of range")));
        }
        if seen[idx] {
            return Err(RacahError::domain(format!("duplicate trace-out index {idx}")));
        }
        seen[idx] = true;
    }
    let keep: Vec<usize> = (0..n).filter(|i| !seen[*i]).collect();
    let keep_dims: Vec<usize> = keep.iter().map(|&i| factor_dimensions[i]).collect();
    let trace_dims: Vec<usize> = trace_out.iter().map(|&i| factor_dimensions[i]).collect();
    let trace_total: usize = trace_dims.iter().product::<usize>().max(1);

    let keep_total: usize = keep_dims.iter().product::<usize>().max(1);
    let mut out = DMatrix::<Complex64>::zeros(keep_total, keep_total);

    for r in 0..keep_total {
        let r_keep = decompose(r, &keep_dims);
        for c in 0..keep_total {
            let c_keep = decompose(c, &keep_dims);
            let mut sum = Complex64::new(0.0, 0.0);
            for t in 0..trace_total {
                let t_idx = decompose(t, &trace_dims);
                let mut full_r = vec![0usize; n];
                let mut full_c = vec![0usize; n];
                for (pos, &i) in keep.iter().enumerate() {
                    full_r[i] = r_keep[pos];
                    full_c[i] = c_keep[pos];
                }
                for (pos, &i) in trace_out.iter().enumerate() {
                    full_r[i] = t_idx[pos];
                    full_c[i] = t_idx[pos];
                }
                let row = flatten(&full_r, factor_dimensions);
                let col = flatten(&full_c, factor_dimensions);
                sum += m[(row, col)];
            }
            out[(r, c)] = sum;
        }
    }
    DenseOperator::new(out, OperatorType::General)
}

/// Picks the cheapest representation for a dense matrix: identity if it's
/// exactly `I`, diagonal if all off-diagonal entries vanish within
/// [`DEFAULT_TOLERANCE`], sparse if fewer than 25% of entries are nonzero,
/// dense otherwise.
pub fn optimize(m: DMatrix<Complex64>) -> Result<Box<dyn Operator>> {
    if !m.is_square() {
        return Err(RacahError::dimension("operator matrix must be square"));
    }
    let n = m.nrows();
    let id = DMatrix::<Complex64>::identity(n, n);
    if (&m - &id).iter().all(|c| c.norm() <= DEFAULT_TOLERANCE) {
        return Ok(Box::new(IdentityOperator::new(n)));
    }
    let off_diagonal_zero = (0..n).all(|i| (0..n).all(|j| i == j || m[(i, j)].norm() <= DEFAULT_TOLERANCE));
    if off_diagonal_zero {
        let diag: Vec<Complex64> = (0..n).map(|i| m[(i, i)]).collect();
        return Ok(Box::new(DiagonalOperator::new(diag)));
    }
    let nonzero = m.iter().filter(|c| c.norm() > DEFAULT_TOLERANCE).count();
    if (nonzero as f64) < 0.25 * (n * n) as f64 {
        return Ok(Box::new(SparseOperator::from_dense(&m)));
    }
    Ok(Box::new(DenseOperator::new(m, OperatorType::General)?))
}

/// Hermitian eigendecomposition of an arbitrary operator's matrix form.
pub fn eigendecompose_hermitian(op: &dyn Operator) -> Result<EigenDecomposition> {
    eigen::hermitian(op)
}

/// General eigendecomposition of an arbitrary operator's matrix form.
pub fn eigendecompose_general(op: &dyn Operator) -> Result<GeneralEigenDecomposition> {
    eigen::general(op)
}

/// `f(A)` for a hermitian operator via spectral decomposition.
pub fn apply_function_hermitian(op: &dyn Operator, f: impl Fn(f64) -> Complex64) -> Result<DenseOperator> {
    let m = matrix_util::matrix_function_hermitian(&op.to_matrix(), f)?;
    DenseOperator::new(m, OperatorType::General)
}

/// `f(A)` for a general operator via Schur-based eigendecomposition.
pub fn apply_function_general(op: &dyn Operator, f: impl Fn(Complex64) -> Complex64) -> Result<DenseOperator> {
    let m = matrix_util::matrix_function_general(&op.to_matrix(), f)?;
    DenseOperator::new(m, OperatorType::General)
}

/// `exp(A)` via scaling-and-squaring Pade approximation.
pub fn exp(op: &dyn Operator) -> Result<DenseOperator> {
    let m = matrix_util::matrix_exp(&op.to_matrix())?;
    DenseOperator::new(m, OperatorType::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_picks_identity() {
        let id = DMatrix::<Complex64>::identity(3, 3);
        let op = optimize(id).unwrap();
        assert_eq!(op.type_tag(), OperatorType::Identity);
    }

    #[test]
    fn optimize_picks_diagonal() {
        let m = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(-1.0, 0.0),
        ]));
        let op = optimize(m).unwrap();
        assert_eq!(op.type_tag(), OperatorType::Diagonal);
    }

    #[test]
    fn partial_trace_of_identity_on_two_qubits_scales_identity() {
        let id4 = DMatrix::<Complex64>::identity(4, 4);
        let reduced = partial_trace_matrix(&id4, &[2, 2], &[1]).unwrap();
        let m = reduced.to_matrix();
        assert!((m[(0, 0)].re - 2.0).abs() < 1e-9);
        assert!((m[(1, 1)].re - 2.0).abs() < 1e-9);
    }
}
