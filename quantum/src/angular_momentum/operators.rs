//! Fixed-j angular-momentum operators in the reverse-index basis (index 0
//! at `m = +j`).

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::Result;

use super::{index_to_m, multiplet_dimension};
use crate::matrix_util::matrix_exp;
use crate::state::StateVector;

/// `J_z`, diagonal with entries `m` in the reverse-index basis.
pub fn j_z(j: f64) -> Result<DMatrix<Complex64>> {
    let dim = multiplet_dimension(j)?;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for i in 0..dim {
        m[(i, i)] = Complex64::new(index_to_m(j, i)?, 0.0);
    }
    Ok(m)
}

/// `J_+`, raising `m` by one (so lowering the basis index by one).
pub fn j_plus(j: f64) -> Result<DMatrix<Complex64>> {
    let dim = multiplet_dimension(j)?;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for i in 1..dim {
        let m_val = index_to_m(j, i)?;
        let coeff = (j * (j + 1.0) - m_val * (m_val + 1.0)).max(0.0).sqrt();
        m[(i - 1, i)] = Complex64::new(coeff, 0.0);
    }
    Ok(m)
}

/// `J_-`, lowering `m` by one (so raising the basis index by one).
pub fn j_minus(j: f64) -> Result<DMatrix<Complex64>> {
    let dim = multiplet_dimension(j)?;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for i in 0..dim - 1 {
        let m_val = index_to_m(j, i)?;
        let coeff = (j * (j + 1.0) - m_val * (m_val - 1.0)).max(0.0).sqrt();
        m[(i + 1, i)] = Complex64::new(coeff, 0.0);
    }
    Ok(m)
}

/// `J_x = (J_+ + J_-) / 2`.
pub fn j_x(j: f64) -> Result<DMatrix<Complex64>> {
    Ok((j_plus(j)? + j_minus(j)?) * Complex64::new(0.5, 0.0))
}

/// `J_y = (J_+ - J_-) / (2i)`.
pub fn j_y(j: f64) -> Result<DMatrix<Complex64>> {
    Ok((j_plus(j)? - j_minus(j)?) * Complex64::new(0.0, -0.5))
}

/// `J^2 = j(j+1) I`.
pub fn j_squared(j: f64) -> Result<DMatrix<Complex64>> {
    let dim = multiplet_dimension(j)?;
    Ok(DMatrix::identity(dim, dim) * Complex64::new(j * (j + 1.0), 0.0))
}

/// The rotation operator `exp(-i theta (n . J))` about the unit axis `n`
/// (not renormalized; callers should pass a unit vector).
pub fn rotation_operator(j: f64, axis: [f64; 3], theta: f64) -> Result<DMatrix<Complex64>> {
    let generator = (j_x(j)? * Complex64::new(axis[0], 0.0)
        + j_y(j)? * Complex64::new(axis[1], 0.0)
        + j_z(j)? * Complex64::new(axis[2], 0.0))
        * Complex64::new(0.0, -theta);
    matrix_exp(&generator)
}

/// A spin coherent state `|theta, phi>` built by rotating the highest-weight
/// state `|j, j>` (basis index 0) by polar angle `theta` about the y-axis
/// and azimuthal angle `phi` about the z-axis.
pub fn coherent_state(j: f64, theta: f64, phi: f64) -> Result<StateVector> {
    let highest = StateVector::basis_state(multiplet_dimension(j)?, 0)?;
    let rot_y = rotation_operator(j, [0.0, 1.0, 0.0], theta)?;
    let rot_z = rotation_operator(j, [0.0, 0.0, 1.0], phi)?;
    let combined = rot_z * rot_y;
    let out = combined * highest.amplitudes();
    StateVector::new(out.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix_util::is_hermitian;
    use racah_core::DEFAULT_TOLERANCE;

    #[test]
    fn spin_half_jz_has_plus_minus_half_spectrum() {
        let jz = j_z(0.5).unwrap();
        assert!((jz[(0, 0)].re - 0.5).abs() < 1e-12);
        assert!((jz[(1, 1)].re + 0.5).abs() < 1e-12);
    }

    #[test]
    fn angular_momentum_operators_are_hermitian() {
        for j in [0.5, 1.0, 1.5, 2.0] {
            assert!(is_hermitian(&j_x(j).unwrap(), DEFAULT_TOLERANCE));
            assert!(is_hermitian(&j_y(j).unwrap(), DEFAULT_TOLERANCE));
            assert!(is_hermitian(&j_z(j).unwrap(), DEFAULT_TOLERANCE));
        }
    }

    #[test]
    fn commutator_jx_jy_is_i_jz() {
        let jx = j_x(1.0).unwrap();
        let jy = j_y(1.0).unwrap();
        let jz = j_z(1.0).unwrap();
        let comm = &jx * &jy - &jy * &jx;
        let expected = jz * Complex64::new(0.0, 1.0);
        assert!((comm - expected).iter().all(|c| c.norm() < 1e-9));
    }

    #[test]
    fn j_squared_matches_eigenvalue_formula() {
        let j = 1.5;
        let jsq = j_squared(j).unwrap();
        assert!((jsq[(0, 0)].re - j * (j + 1.0)).abs() < 1e-9);
    }
}
