//! Complex dense-matrix utilities shared by the operator kernel, density
//! matrices, and angular-momentum modules: structural predicates and the
//! matrix-function machinery (exponential, log, sqrt, arbitrary scalar
//! functions via spectral decomposition).

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

/// `true` if `m` is square and `m == m.adjoint()` within `tol`.
pub fn is_hermitian(m: &DMatrix<Complex64>, tol: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    let diff = m - m.adjoint();
    diff.iter().all(|c| c.norm() <= tol)
}

/// `true` if `m` is square and `m * m.adjoint() == I` within `tol`.
pub fn is_unitary(m: &DMatrix<Complex64>, tol: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    let prod = m * m.adjoint();
    let id = DMatrix::<Complex64>::identity(m.nrows(), m.nrows());
    let diff = prod - id;
    diff.iter().all(|c| c.norm() <= tol)
}

/// `true` if `m` is square and `m * m.adjoint() == m.adjoint() * m` within `tol`.
pub fn is_normal(m: &DMatrix<Complex64>, tol: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    let a = m * m.adjoint();
    let b = m.adjoint() * m;
    (a - b).iter().all(|c| c.norm() <= tol)
}

/// `true` if `m` is hermitian and idempotent (`m * m == m`) within `tol`.
pub fn is_projection(m: &DMatrix<Complex64>, tol: f64) -> bool {
    if !is_hermitian(m, tol) {
        return false;
    }
    let sq = m * m;
    (sq - m).iter().all(|c| c.norm() <= tol)
}

/// Hermitian eigendecomposition: eigenvalues (ascending, real) and an
/// orthonormal matrix of eigenvectors as columns.
///
/// Eigenvector orthogonality is re-enforced via Gram-Schmidt on degenerate
/// clusters since `nalgebra`'s Jacobi solver does not guarantee it to full
/// precision for near-degenerate eigenvalues.
pub fn hermitian_eigen(m: &DMatrix<Complex64>) -> Result<(DVector<f64>, DMatrix<Complex64>)> {
    if !m.is_square() {
        return Err(RacahError::dimension("hermitian_eigen requires a square matrix"));
    }
    let n = m.nrows();
    let eig = m.clone().symmetric_eigen();
    let mut pairs: Vec<(f64, DVector<Complex64>)> = (0..n)
        .map(|i| (eig.eigenvalues[i], eig.eigenvectors.column(i).into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut vectors = DMatrix::<Complex64>::zeros(n, n);
    enforce_orthogonality(&mut pairs);
    for (col, (_, v)) in pairs.iter().enumerate() {
        vectors.set_column(col, v);
    }
    let values = DVector::from_iterator(n, pairs.iter().map(|(l, _)| *l));
    Ok((values, vectors))
}

/// Re-orthonormalizes eigenvectors within each degenerate cluster (values
/// equal within [`DEFAULT_TOLERANCE`]) via modified Gram-Schmidt, then
/// renormalizes every vector.
fn enforce_orthogonality(pairs: &mut [(f64, DVector<Complex64>)]) {
    let mut i = 0;
    while i < pairs.len() {
        let mut j = i + 1;
        while j < pairs.len() && (pairs[j].0 - pairs[i].0).abs() <= DEFAULT_TOLERANCE {
            j += 1;
        }
        if j - i > 1 {
            for k in i..j {
                let mut v = pairs[k].1.clone();
                for prev in &pairs[i..k] {
                    let proj = prev.1.dotc(&v);
                    v -= &prev.1 * proj;
                }
                let n = v.norm();
                if n > DEFAULT_TOLERANCE {
                    v /= Complex64::new(n, 0.0);
                }
                pairs[k].1 = v;
            }
        }
        i = j;
    }
    for (_, v) in pairs.iter_mut() {
        let n = v.norm();
        if n > DEFAULT_TOLERANCE {
            *v /= Complex64::new(n, 0.0);
        }
    }
}

/// General (possibly non-normal) eigendecomposition via Schur
/// triangularization followed by back-substitution for eigenvectors.
///
/// `nalgebra` has no turnkey complex-eigenvector routine for non-Hermitian
/// matrices, but its `schur()` fully triangularizes any matrix over the
/// complex field (algebraically closed), so the eigenvalues sit on the
/// diagonal of `t` and the eigenvectors of `a` are recovered column by
/// column from the upper-triangular system `(t - lambda_k I) y = 0` solved
/// against the already-found columns, then mapped back through `q`.
pub fn general_eigen(m: &DMatrix<Complex64>) -> Result<(DVector<Complex64>, DMatrix<Complex64>)> {
    if !m.is_square() {
        return Err(RacahError::dimension("general_eigen requires a square matrix"));
    }
    let n = m.nrows();
    let schur = m.clone().schur();
    let (q, t) = schur.unpack();

    let eigenvalues = DVector::from_iterator(n, (0..n).map(|i| t[(i, i)]));

    // Eigenvectors of T (upper triangular): for eigenvalue at index k,
    // solve (T - lambda I) y = 0 with y[k] = 1, y[k+1..] = 0, back-substituting
    // for y[0..k].
    let mut y_all = DMatrix::<Complex64>::zeros(n, n);
    for k in 0..n {
        let lambda = t[(k, k)];
        let mut y = DVector::<Complex64>::zeros(n);
        y[k] = Complex64::new(1.0, 0.0);
        for i in (0..k).rev() {
            let mut sum = Complex64::new(0.0, 0.0);
            for j in (i + 1)..=k {
                sum += t[(i, j)] * y[j];
            }
            let denom = t[(i, i)] - lambda;
            y[i] = if denom.norm() > 1e-13 {
                -sum / denom
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
        y_all.set_column(k, &y);
    }

    let mut vectors = &q * y_all;
    for mut col in vectors.column_iter_mut() {
        let n = col.norm();
        if n > DEFAULT_TOLERANCE {
            col /= Complex64::new(n, 0.0);
        }
    }
    Ok((eigenvalues, vectors))
}

/// Applies a scalar function to a hermitian matrix via its spectral
/// decomposition: `f(M) = V diag(f(lambda_i)) V*`.
pub fn matrix_function_hermitian(
    m: &DMatrix<Complex64>,
    f: impl Fn(f64) -> Complex64,
) -> Result<DMatrix<Complex64>> {
    let (values, vectors) = hermitian_eigen(m)?;
    let diag = DMatrix::from_diagonal(&values.map(f));
    Ok(&vectors * diag * vectors.adjoint())
}

/// Applies a scalar function to a general matrix via Schur-based
/// eigendecomposition: `f(M) = V diag(f(lambda_i)) V^{-1}`.
pub fn matrix_function_general(
    m: &DMatrix<Complex64>,
    f: impl Fn(Complex64) -> Complex64,
) -> Result<DMatrix<Complex64>> {
    let (values, vectors) = general_eigen(m)?;
    let diag = DMatrix::from_diagonal(&values.map(f));
    let inv = vectors
        .clone()
        .try_inverse()
        .ok_or_else(|| RacahError::numerical("eigenvector matrix is singular in matrix_function"))?;
    Ok(&vectors * diag * inv)
}

/// Matrix exponential `exp(M)` via scaling-and-squaring with a diagonal
/// Pade(6,6) approximant (the standard Higham construction): scale `M` down
/// by a power of two until its norm is small, apply the Pade approximant,
/// then square the result back up.
pub fn matrix_exp(m: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    if !m.is_square() {
        return Err(RacahError::dimension("matrix_exp requires a square matrix"));
    }
    let n = m.nrows();
    if n == 0 {
        return Ok(DMatrix::<Complex64>::zeros(0, 0));
    }

    let norm = m.iter().map(|c| c.norm()).fold(0.0_f64, f64::max) * n as f64;
    let mut squarings = 0u32;
    let mut scale = 1.0_f64;
    while norm * scale > 0.5 {
        scale *= 0.5;
        squarings += 1;
    }
    let a = m * Complex64::new(scale, 0.0);

    // Diagonal Pade(6,6) coefficients.
    const C: [f64; 7] = [
        1.0,
        1.0 / 2.0,
        1.0 / 10.0,
        1.0 / 120.0,
        1.0 / 1_680.0,
        1.0 / 30_240.0,
        1.0 / 665_280.0,
    ];

    let id = DMatrix::<Complex64>::identity(n, n);
    let a2 = &a * &a;
    let a4 = &a2 * &a2;
    let a6 = &a2 * &a4;

    let u = &a
        * (&id * Complex64::new(C[1], 0.0)
            + &a2 * Complex64::new(C[3], 0.0)
            + &a4 * Complex64::new(C[5], 0.0));
    let v = &id * Complex64::new(C[0], 0.0) + &a2 * Complex64::new(C[2], 0.0) + &a4 * Complex64::new(C[4], 0.0)
        + &a6 * Complex64::new(C[6], 0.0);

    let num = &v + &u;
    let den = &v - &u;
    let mut result = den
        .try_inverse()
        .ok_or_else(|| RacahError::numerical("Pade denominator is singular in matrix_exp"))?
        * num;

    for _ in 0..squarings {
        result = &result * &result;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn pauli_z_is_hermitian_and_unitary() {
        let z = DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)]);
        assert!(is_hermitian(&z, DEFAULT_TOLERANCE));
        assert!(is_unitary(&z, DEFAULT_TOLERANCE));
    }

    #[test]
    fn hermitian_eigen_of_pauli_z() {
        let z = DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)]);
        let (values, _) = hermitian_eigen(&z).unwrap();
        assert_relative_eq!(values[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn exp_of_zero_is_identity() {
        let zero = DMatrix::<Complex64>::zeros(2, 2);
        let e = matrix_exp(&zero).unwrap();
        assert_relative_eq!(e[(0, 0)].re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(e[(1, 1)].re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(e[(0, 1)].norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn exp_of_i_pi_z_over_2_is_i_times_z() {
        // exp(i * (pi/2) * diag(1,-1)) = diag(i, -i)
        let z = DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)]);
        let gen = &z * Complex64::new(0.0, std::f64::consts::FRAC_PI_2);
        let e = matrix_exp(&gen).unwrap();
        assert_relative_eq!(e[(0, 0)].re, 0.0, epsilon = 1e-6);
        assert_relative_eq!(e[(0, 0)].im, 1.0, epsilon = 1e-6);
        assert_relative_eq!(e[(1, 1)].re, 0.0, epsilon = 1e-6);
        assert_relative_eq!(e[(1, 1)].im, -1.0, epsilon = 1e-6);
    }
}
