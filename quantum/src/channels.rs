//! Quantum channels as Kraus operator collections, plus factories for the
//! standard noise channels. Grounds the Kraus-completeness check that the
//! teacher's noise module only approximated on pure states.

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result};

use crate::density::DensityMatrix;

/// A quantum channel given by a set of Kraus operators `{K_i}` satisfying
/// `sum_i K_i^dagger K_i = I`.
#[derive(Debug, Clone)]
pub struct KrausChannel {
    operators: Vec<DMatrix<Complex64>>,
    dimension: usize,
}

impl KrausChannel {
    /// Builds a channel, checking the Kraus completeness relation within
    /// [`DEFAULT_TOLERANCE`].
    pub fn new(operators: Vec<DMatrix<Complex64>>) -> Result<Self> {
        if operators.is_empty() {
            return Err(RacahError::dimension("a Kraus channel needs at least one operator"));
        }
        let dimension = operators[0].nrows();
        for k in &operators {
            if k.nrows() != dimension || k.ncols() != dimension {
                return Err(RacahError::dimension("all Kraus operators must share the channel dimension"));
            }
        }
        let mut sum = DMatrix::<Complex64>::zeros(dimension, dimension);
        for k in &operators {
            sum += k.adjoint() * k;
        }
        let id = DMatrix::<Complex64>::identity(dimension, dimension);
        if (&sum - &id).iter().any(|c| c.norm() > 1e-6) {
            return Err(RacahError::structural(
                "Kraus operators are not complete: sum(K_i^dagger K_i) != I",
            ));
        }
        Ok(Self { operators, dimension })
    }

    pub fn operators(&self) -> &[DMatrix<Complex64>] {
        &self.operators
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Applies the channel: `rho -> sum_i K_i rho K_i^dagger`.
    pub fn apply(&self, rho: &DensityMatrix) -> Result<DensityMatrix> {
        if rho.dimension() != self.dimension {
            return Err(RacahError::dimension("channel/state dimension mismatch"));
        }
        let mut out = DMatrix::<Complex64>::zeros(self.dimension, self.dimension);
        for k in &self.operators {
            out += k * rho.matrix() * k.adjoint();
        }
        DensityMatrix::from_matrix(out)
    }

    /// The depolarizing channel with error probability `p`: with
    /// probability `1-p` the state is untouched, otherwise replaced by the
    /// maximally mixed state. Only defined for qubits (dimension 2).
    pub fn depolarizing(p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(RacahError::domain("depolarizing probability must lie in [0, 1]"));
        }
        let i = pauli_matrix('i');
        let x = pauli_matrix('x');
        let y = pauli_matrix('y');
        let z = pauli_matrix('z');
        let k0 = &i * Complex64::new((1.0 - 3.0 * p / 4.0).sqrt(), 0.0);
        let k1 = &x * Complex64::new((p / 4.0).sqrt(), 0.0);
        let k2 = &y * Complex64::new((p / 4.0).sqrt(), 0.0);
        let k3 = &z * Complex64::new((p / 4.0).sqrt(), 0.0);
        Self::new(vec![k0, k1, k2, k3])
    }

    /// Amplitude damping with decay probability `gamma` (spontaneous
    /// |1> -> |0> decay).
    pub fn amplitude_damping(gamma: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(RacahError::domain("amplitude damping probability must lie in [0, 1]"));
        }
        let k0 = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new((1.0 - gamma).sqrt(), 0.0),
            ],
        );
        let k1 = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(0.0, 0.0),
                Complex64::new(gamma.sqrt(), 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
            ],
        );
        Self::new(vec![k0, k1])
    }

    /// Phase damping with dephasing probability `lambda`.
    pub fn phase_damping(lambda: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(RacahError::domain("phase damping probability must lie in [0, 1]"));
        }
        let k0 = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new((1.0 - lambda).sqrt(), 0.0),
            ],
        );
        let k1 = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(lambda.sqrt(), 0.0),
            ],
        );
        Self::new(vec![k0, k1])
    }

    /// Bit-flip channel: `X` applied with probability `p`.
    pub fn bit_flip(p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(RacahError::domain("bit-flip probability must lie in [0, 1]"));
        }
        let k0 = pauli_matrix('i') * Complex64::new((1.0 - p).sqrt(), 0.0);
        let k1 = pauli_matrix('x') * Complex64::new(p.sqrt(), 0.0);
        Self::new(vec![k0, k1])
    }

    /// Phase-flip channel: `Z` applied with probability `p`.
    pub fn phase_flip(p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(RacahError::domain("phase-flip probability must lie in [0, 1]"));
        }
        let k0 = pauli_matrix('i') * Complex64::new((1.0 - p).sqrt(), 0.0);
        let k1 = pauli_matrix('z') * Complex64::new(p.sqrt(), 0.0);
        Self::new(vec![k0, k1])
    }
}

fn pauli_matrix(which: char) -> DMatrix<Complex64> {
    let (re, im): ([f64; 4], [f64; 4]) = match which {
        'i' => ([1.0, 0.0, 0.0, 1.0], [0.0; 4]),
        'x' => ([0.0, 1.0, 1.0, 0.0], [0.0; 4]),
        'y' => ([0.0, 0.0, 0.0, 0.0], [0.0, -1.0, 1.0, 0.0]),
        'z' => ([1.0, 0.0, 0.0, -1.0], [0.0; 4]),
        _ => unreachable!("internal pauli_matrix selector"),
    };
    DMatrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(re[0], im[0]),
            Complex64::new(re[1], im[1]),
            Complex64::new(re[2], im[2]),
            Complex64::new(re[3], im[3]),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateVector;

    #[test]
    fn depolarizing_at_zero_is_identity_channel() {
        let channel = KrausChannel::depolarizing(0.0).unwrap();
        let s = StateVector::basis_state(2, 0).unwrap();
        let rho = DensityMatrix::from_pure_state(&s).unwrap();
        let out = channel.apply(&rho).unwrap();
        assert!((out.matrix()[(0, 0)].re - 1.0).abs() < 1e-9);
    }

    #[test]
    fn amplitude_damping_drains_excited_state() {
        let channel = KrausChannel::amplitude_damping(1.0).unwrap();
        let s = StateVector::basis_state(2, 1).unwrap();
        let rho = DensityMatrix::from_pure_state(&s).unwrap();
        let out = channel.apply(&rho).unwrap();
        assert!((out.matrix()[(0, 0)].re - 1.0).abs() < 1e-9);
        assert!(out.matrix()[(1, 1)].norm() < 1e-9);
    }

    #[test]
    fn incomplete_kraus_set_is_rejected() {
        let bad = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(0.5, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.5, 0.0),
            ],
        );
        assert!(KrausChannel::new(vec![bad]).is_err());
    }
}
