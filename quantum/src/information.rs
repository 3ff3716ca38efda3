//! Entanglement and distinguishability measures: Schmidt decomposition,
//! fidelity, trace distance, relative entropy, entanglement entropy,
//! concurrence, negativity, Bures distance, quantum angle, and quantum
//! Fisher information.
//!
//! Two choices here are pinned by explicit design decisions rather than
//! left to convention: trace distance is `(1/2) tr|rho - sigma|` (not the
//! un-halved trace norm), and relative entropy returns `+infinity` when
//! `support(rho)` is not contained in `support(sigma)`, rather than erroring.

use nalgebra::{DMatrix, SVD};
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

use crate::density::DensityMatrix;
use crate::matrix_util;
use crate::state::StateVector;

/// Schmidt decomposition of a bipartite pure state: Schmidt coefficients
/// (descending, non-negative) and the corresponding bases on each factor.
pub struct SchmidtDecomposition {
    pub coefficients: Vec<f64>,
    pub basis_a: Vec<StateVector>,
    pub basis_b: Vec<StateVector>,
}

/// Computes the Schmidt decomposition of `state` across a bipartition into
/// factors of dimension `dim_a` and `dim_b` (`dim_a * dim_b == state.dimension()`).
pub fn schmidt_decomposition(state: &StateVector, dim_a: usize, dim_b: usize) -> Result<SchmidtDecomposition> {
    if dim_a * dim_b != state.dimension() {
        return Err(RacahError::dimension("factor dimensions must multiply to the state dimension"));
    }
    let mut coeff_matrix = DMatrix::<Complex64>::zeros(dim_a, dim_b);
    for i in 0..dim_a {
        for j in 0..dim_b {
            coeff_matrix[(i, j)] = state.get(i * dim_b + j)?;
        }
    }
    let svd = SVD::new(coeff_matrix, true, true);
    let coefficients: Vec<f64> = svd.singular_values.iter().copied().collect();
    let u = svd.u.ok_or_else(|| RacahError::numerical("SVD failed to produce U"))?;
    let v_t = svd.v_t.ok_or_else(|| RacahError::numerical("SVD failed to produce V*"))?;

    let rank = coefficients.iter().filter(|&&s| s > DEFAULT_TOLERANCE).count().max(1);
    let mut basis_a = Vec::with_capacity(rank);
    let mut basis_b = Vec::with_capacity(rank);
    for k in 0..rank {
        basis_a.push(StateVector::new(u.column(k).iter().copied().collect())?);
        basis_b.push(StateVector::new(v_t.row(k).iter().copied().collect())?);
    }
    Ok(SchmidtDecomposition {
        coefficients: coefficients.into_iter().take(rank).collect(),
        basis_a,
        basis_b,
    })
}

/// Mixed-state fidelity `F(rho, sigma) = (tr sqrt(sqrt(rho) sigma sqrt(rho)))^2`.
pub fn fidelity(rho: &DensityMatrix, sigma: &DensityMatrix) -> Result<f64> {
    if rho.dimension() != sigma.dimension() {
        return Err(RacahError::dimension("fidelity requires matching dimensions"));
    }
    let sqrt_rho = matrix_util::matrix_function_hermitian(rho.matrix(), |l| Complex64::new(l.max(0.0).sqrt(), 0.0))?;
    let inner = &sqrt_rho * sigma.matrix() * &sqrt_rho;
    let sqrt_inner = matrix_util::matrix_function_hermitian(&inner, |l| Complex64::new(l.max(0.0).sqrt(), 0.0))?;
    let trace = sqrt_inner.trace().re;
    Ok((trace * trace).clamp(0.0, 1.0))
}

/// Trace distance `(1/2) tr|rho - sigma|`, computed as half the sum of the
/// absolute eigenvalues of `rho - sigma`.
pub fn trace_distance(rho: &DensityMatrix, sigma: &DensityMatrix) -> Result<f64> {
    if rho.dimension() != sigma.dimension() {
        return Err(RacahError::dimension("trace distance requires matching dimensions"));
    }
    let diff = rho.matrix() - sigma.matrix();
    let (eigenvalues, _) = matrix_util::hermitian_eigen(&diff)?;
    Ok(0.5 * eigenvalues.iter().map(|l| l.abs()).sum::<f64>())
}

/// Quantum relative entropy `S(rho || sigma) = tr(rho ln rho) - tr(rho ln sigma)`
/// (natural log, matching [`DensityMatrix::von_neumann_entropy`]).
/// Returns `+infinity` when `support(rho)` is not contained in `support(sigma)`,
/// per the pinned design decision rather than erroring.
pub fn relative_entropy(rho: &DensityMatrix, sigma: &DensityMatrix) -> Result<f64> {
    if rho.dimension() != sigma.dimension() {
        return Err(RacahError::dimension("relative entropy requires matching dimensions"));
    }
    let (rho_values, rho_vectors) = matrix_util::hermitian_eigen(rho.matrix())?;
    let (sigma_values, sigma_vectors) = matrix_util::hermitian_eigen(sigma.matrix())?;

    for (i, &r) in rho_values.iter().enumerate() {
        if r <= DEFAULT_TOLERANCE {
            continue;
        }
        let psi = rho_vectors.column(i);
        for (j, &s) in sigma_values.iter().enumerate() {
            if s <= DEFAULT_TOLERANCE {
                let phi = sigma_vectors.column(j);
                let overlap = psi.dotc(&phi).norm_sqr();
                if overlap > DEFAULT_TOLERANCE {
                    return Ok(f64::INFINITY);
                }
            }
        }
    }

    let term_rho: f64 = rho_values.iter().filter(|&&r| r > DEFAULT_TOLERANCE).map(|&r| r * r.ln()).sum();
    let sigma_log = matrix_util::matrix_function_hermitian(sigma.matrix(), |l| {
        Complex64::new(if l > DEFAULT_TOLERANCE { l.ln() } else { 0.0 }, 0.0)
    })?;
    let term_sigma = (rho.matrix() * sigma_log).trace().re;
    Ok(term_rho - term_sigma)
}

/// Entanglement entropy of a bipartite pure state: the von Neumann entropy
/// of either reduced density matrix (equal for both by construction).
pub fn entanglement_entropy(schmidt: &SchmidtDecomposition) -> f64 {
    -schmidt
        .coefficients
        .iter()
        .map(|&s| s * s)
        .filter(|&p| p > DEFAULT_TOLERANCE)
        .map(|p| p * p.ln())
        .sum::<f64>()
}

/// Quantum mutual information `I(A:B) = S(rho_A) + S(rho_B) - S(rho_AB)`.
pub fn mutual_information(rho_a: &DensityMatrix, rho_b: &DensityMatrix, rho_ab: &DensityMatrix) -> Result<f64> {
    Ok(rho_a.von_neumann_entropy()? + rho_b.von_neumann_entropy()? - rho_ab.von_neumann_entropy()?)
}

/// Wootters concurrence of a two-qubit density matrix:
/// `C(rho) = max(0, l1 - l2 - l3 - l4)` where `l_i` are the decreasing
/// square roots of the eigenvalues of `rho * rho_tilde`, and
/// `rho_tilde = (Y (x) Y) rho* (Y (x) Y)`.
pub fn concurrence(rho: &DensityMatrix) -> Result<f64> {
    if rho.dimension() != 4 {
        return Err(RacahError::dimension("concurrence is defined for two-qubit states only"));
    }
    let y = crate::gates::pauli_y();
    let yy = y.kronecker(&y);
    let rho_star = rho.matrix().map(|c| c.conj());
    let rho_tilde = &yy * rho_star * &yy;
    let product = rho.matrix() * &rho_tilde;
    let (eigenvalues, _) = matrix_util::general_eigen(&product)?;
    let mut sqrts: Vec<f64> = eigenvalues.iter().map(|l| l.re.max(0.0).sqrt()).collect();
    sqrts.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let c = sqrts[0] - sqrts[1..].iter().sum::<f64>();
    Ok(c.max(0.0))
}

/// Negativity `N(rho) = (||rho^{T_B}||_1 - 1) / 2`, the sum of the absolute
/// values of the negative eigenvalues of the partial transpose over the
/// subsystem in `dims.1`.
pub fn negativity(rho: &DensityMatrix, dim_a: usize, dim_b: usize) -> Result<f64> {
    if dim_a * dim_b != rho.dimension() {
        return Err(RacahError::dimension("factor dimensions must multiply to the density-matrix dimension"));
    }
    let m = rho.matrix();
    let mut transposed = DMatrix::<Complex64>::zeros(rho.dimension(), rho.dimension());
    for a1 in 0..dim_a {
        for b1 in 0..dim_b {
            for a2 in 0..dim_a {
                for b2 in 0..dim_b {
                    let row = a1 * dim_b + b1;
                    let col = a2 * dim_b + b2;
                    let src_row = a1 * dim_b + b2;
                    let src_col = a2 * dim_b + b1;
                    transposed[(row, col)] = m[(src_row, src_col)];
                }
            }
        }
    }
    let (eigenvalues, _) = matrix_util::hermitian_eigen(&transposed)?;
    Ok(eigenvalues.iter().filter(|&&l| l < 0.0).map(|l| l.abs()).sum())
}

/// Bures distance `D_B(rho, sigma) = sqrt(2(1 - sqrt(F(rho, sigma))))`.
pub fn bures_distance(rho: &DensityMatrix, sigma: &DensityMatrix) -> Result<f64> {
    let f = fidelity(rho, sigma)?;
    Ok((2.0 * (1.0 - f.sqrt())).max(0.0).sqrt())
}

/// Quantum angle `arccos(sqrt(F(rho, sigma)))`.
pub fn quantum_angle(rho: &DensityMatrix, sigma: &DensityMatrix) -> Result<f64> {
    let f = fidelity(rho, sigma)?.sqrt().clamp(0.0, 1.0);
    Ok(f.acos())
}

/// Quantum Fisher information for a pure-state parametrized family at
/// `state`, generated by Hermitian `h` (`|psi(theta)> = exp(-i h theta)|psi>`):
/// `F_Q = 4 (<h^2> - <h>^2)`.
pub fn quantum_fisher_information(state: &StateVector, h: &DMatrix<Complex64>) -> Result<f64> {
    let mean = state.expectation(h)?.re;
    let h_sq = h * h;
    let mean_sq = state.expectation(&h_sq)?.re;
    Ok(4.0 * (mean_sq - mean * mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_state() -> StateVector {
        let h = 1.0 / std::f64::consts::SQRT_2;
        let mut s = StateVector::zeros(4).unwrap();
        s.set(0, Complex64::new(h, 0.0)).unwrap();
        s.set(3, Complex64::new(h, 0.0)).unwrap();
        s
    }

    #[test]
    fn bell_state_schmidt_coefficients_are_equal() {
        let s = bell_state();
        let schmidt = schmidt_decomposition(&s, 2, 2).unwrap();
        assert_eq!(schmidt.coefficients.len(), 2);
        assert!((schmidt.coefficients[0] - schmidt.coefficients[1]).abs() < 1e-9);
        assert!((schmidt.coefficients[0] - 1.0 / std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn bell_state_is_maximally_entangled() {
        let s = bell_state();
        let schmidt = schmidt_decomposition(&s, 2, 2).unwrap();
        let entropy = entanglement_entropy(&schmidt);
        assert!((entropy - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn bell_state_has_unit_concurrence() {
        let s = bell_state();
        let rho = DensityMatrix::from_pure_state(&s).unwrap();
        let c = concurrence(&rho).unwrap();
        assert!((c - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fidelity_of_identical_states_is_one() {
        let s = StateVector::basis_state(2, 0).unwrap();
        let rho = DensityMatrix::from_pure_state(&s).unwrap();
        let f = fidelity(&rho, &rho).unwrap();
        assert!((f - 1.0).abs() < 1e-6);
    }

    #[test]
    fn trace_distance_of_orthogonal_pure_states_is_one() {
        let rho = DensityMatrix::from_pure_state(&StateVector::basis_state(2, 0).unwrap()).unwrap();
        let sigma = DensityMatrix::from_pure_state(&StateVector::basis_state(2, 1).unwrap()).unwrap();
        let d = trace_distance(&rho, &sigma).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
    }
}
