//! Constant unitary gates as dense matrices, grounded directly in the
//! teacher's `Gate` constructors (same matrix literals) but returned as
//! plain [`DMatrix<Complex64>`] rather than a flattened storage type, since
//! the rest of this crate consumes matrices directly.

use nalgebra::DMatrix;
use num_complex::Complex64;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

pub fn identity() -> DMatrix<Complex64> {
    DMatrix::identity(2, 2)
}

pub fn pauli_x() -> DMatrix<Complex64> {
    DMatrix::from_row_slice(2, 2, &[c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
}

pub fn pauli_y() -> DMatrix<Complex64> {
    DMatrix::from_row_slice(2, 2, &[c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)])
}

pub fn pauli_z() -> DMatrix<Complex64> {
    DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)])
}

pub fn hadamard() -> DMatrix<Complex64> {
    let h = 1.0 / std::f64::consts::SQRT_2;
    DMatrix::from_row_slice(2, 2, &[c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)])
}

/// The S (phase) gate: `diag(1, i)`.
pub fn phase() -> DMatrix<Complex64> {
    DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0)])
}

/// The T gate: `diag(1, e^{i*pi/4})`.
pub fn t_gate() -> DMatrix<Complex64> {
    let phase = Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4);
    DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), phase])
}

pub fn cnot() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::identity(4, 4);
    m[(2, 2)] = c(0.0, 0.0);
    m[(3, 3)] = c(0.0, 0.0);
    m[(2, 3)] = c(1.0, 0.0);
    m[(3, 2)] = c(1.0, 0.0);
    m
}

pub fn cy() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::identity(4, 4);
    m[(2, 2)] = c(0.0, 0.0);
    m[(3, 3)] = c(0.0, 0.0);
    m[(2, 3)] = c(0.0, -1.0);
    m[(3, 2)] = c(0.0, 1.0);
    m
}

pub fn cz() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::identity(4, 4);
    m[(3, 3)] = c(-1.0, 0.0);
    m
}

pub fn swap() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::zeros(4, 4);
    m[(0, 0)] = c(1.0, 0.0);
    m[(1, 2)] = c(1.0, 0.0);
    m[(2, 1)] = c(1.0, 0.0);
    m[(3, 3)] = c(1.0, 0.0);
    m
}

/// Three-qubit Toffoli (CCNOT) gate.
pub fn toffoli() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::identity(8, 8);
    m[(6, 6)] = c(0.0, 0.0);
    m[(7, 7)] = c(0.0, 0.0);
    m[(6, 7)] = c(1.0, 0.0);
    m[(7, 6)] = c(1.0, 0.0);
    m
}

/// Three-qubit Fredkin (CSWAP) gate.
pub fn fredkin() -> DMatrix<Complex64> {
    let mut m = DMatrix::<Complex64>::identity(8, 8);
    m[(5, 5)] = c(0.0, 0.0);
    m[(6, 6)] = c(0.0, 0.0);
    m[(5, 6)] = c(1.0, 0.0);
    m[(6, 5)] = c(1.0, 0.0);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix_util::is_unitary;
    use crate::state::StateVector;
    use racah_core::DEFAULT_TOLERANCE;

    #[test]
    fn all_named_gates_are_unitary() {
        for g in [
            identity(),
            pauli_x(),
            pauli_y(),
            pauli_z(),
            hadamard(),
            phase(),
            t_gate(),
            cnot(),
            cy(),
            cz(),
            swap(),
            toffoli(),
            fredkin(),
        ] {
            assert!(is_unitary(&g, DEFAULT_TOLERANCE));
        }
    }

    #[test]
    fn hadamard_on_zero_is_equal_superposition() {
        let zero = StateVector::basis_state(2, 0).unwrap();
        let out = hadamard() * zero.amplitudes();
        let h = 1.0 / std::f64::consts::SQRT_2;
        assert!((out[0].re - h).abs() < 1e-9);
        assert!((out[1].re - h).abs() < 1e-9);
    }

    #[test]
    fn cnot_flips_target_when_control_is_one() {
        // |10> is index 2 in the (control, target) = (q0, q1) big-endian convention.
        let ten = StateVector::basis_state(4, 2).unwrap();
        let out = cnot() * ten.amplitudes();
        // Expect |11> = index 3.
        assert!((out[3].re - 1.0).abs() < 1e-9);
        assert!(out[2].norm() < 1e-9);
    }
}
