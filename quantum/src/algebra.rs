//! Operator algebra: commutators, anticommutators, uncertainty relations,
//! and first-order Baker-Campbell-Hausdorff, working directly on
//! `DMatrix<Complex64>` so it composes freely with the operator kernel and
//! the angular-momentum module.

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result};

use crate::matrix_util;
use crate::state::StateVector;

fn require_same_shape(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> Result<()> {
    if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
        return Err(RacahError::dimension("operator shape mismatch"));
    }
    Ok(())
}

/// `[A, B] = AB - BA`.
pub fn commutator(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    require_same_shape(a, b)?;
    Ok(a * b - b * a)
}

/// `{A, B} = AB + BA`.
pub fn anticommutator(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    require_same_shape(a, b)?;
    Ok(a * b + b * a)
}

/// Nested commutator `[A_{i_k}, [... [A_{i_0}, A_{i_1}] ...]]` applied by
/// the given index sequence into `operators`, left to right.
pub fn nested_commutator(operators: &[DMatrix<Complex64>], indices: &[usize]) -> Result<DMatrix<Complex64>> {
    if indices.len() < 2 {
        return Err(RacahError::domain("nested commutator needs at least two indices"));
    }
    let get = |i: usize| -> Result<&DMatrix<Complex64>> {
        operators
            .get(i)
            .ok_or_else(|| RacahError::domain(format!("operator index {i} out of range")))
    };
    let mut acc = commutator(get(indices[0])?, get(indices[1])?)?;
    for &idx in &indices[2..] {
        acc = commutator(&acc, get(idx)?)?;
    }
    Ok(acc)
}

/// `true` if `[A, B] = 0` within `tol`.
pub fn commutes(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>, tol: f64) -> Result<bool> {
    let comm = commutator(a, b)?;
    Ok(comm.iter().all(|c| c.norm() <= tol))
}

/// `<psi| [A, B] |psi>`.
pub fn commutator_expectation(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>, state: &StateVector) -> Result<Complex64> {
    let comm = commutator(a, b)?;
    state.expectation(&comm)
}

/// The Robertson uncertainty bound: `dA * dB >= |<[A,B]>| / 2`, returning
/// `(dA, dB, bound)` where `dA`/`dB` are the standard deviations of `A`/`B`
/// in `state`.
pub fn uncertainty_product(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>, state: &StateVector) -> Result<(f64, f64, f64)> {
    let mean_a = state.expectation(a)?.re;
    let mean_b = state.expectation(b)?.re;
    let a_sq = a * a;
    let b_sq = b * b;
    let var_a = state.expectation(&a_sq)?.re - mean_a * mean_a;
    let var_b = state.expectation(&b_sq)?.re - mean_b * mean_b;
    let std_a = var_a.max(0.0).sqrt();
    let std_b = var_b.max(0.0).sqrt();
    let comm_exp = commutator_expectation(a, b, state)?;
    Ok((std_a, std_b, comm_exp.norm() / 2.0))
}

/// `true` if `A` is a normal operator (`[A, A^dagger] = 0`).
pub fn is_normal(a: &DMatrix<Complex64>, tol: f64) -> bool {
    matrix_util::is_normal(a, tol)
}

/// `U = exp(i * H)` for a Hermitian generator `H`.
pub fn unitary_from_generator(h: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    if !matrix_util::is_hermitian(h, racah_core::DEFAULT_TOLERANCE) {
        return Err(RacahError::structural("generator must be hermitian"));
    }
    let scaled = h * Complex64::new(0.0, 1.0);
    matrix_util::matrix_exp(&scaled)
}

/// First-order Baker-Campbell-Hausdorff: `log(e^A e^B) ~= A + B + [A,B]/2`.
pub fn bch_first_order(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    require_same_shape(a, b)?;
    let comm = commutator(a, b)?;
    Ok(a + b + comm * Complex64::new(0.5, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates;

    #[test]
    fn pauli_x_y_commutator_is_two_i_z() {
        let x = gates::pauli_x();
        let y = gates::pauli_y();
        let z = gates::pauli_z();
        let comm = commutator(&x, &y).unwrap();
        let expected = z * Complex64::new(0.0, 2.0);
        assert!((comm - expected).iter().all(|c| c.norm() < 1e-9));
    }

    #[test]
    fn pauli_matrices_anticommute() {
        let x = gates::pauli_x();
        let z = gates::pauli_z();
        let anti = anticommutator(&x, &z).unwrap();
        assert!(anti.iter().all(|c| c.norm() < 1e-9));
    }
}
