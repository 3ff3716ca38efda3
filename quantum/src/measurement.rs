//! Projective measurement: Born-rule sampling with collapse, and the
//! projector-based general measurement contract, grounded in the teacher's
//! `QuantumRegister::measure`/`measure_all` cumulative-distribution sampler.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::Rng;
use racah_core::{RacahError, Result};

use crate::state::StateVector;

/// The outcome of a measurement: the sampled basis index and the
/// post-measurement (collapsed, renormalized) state.
#[derive(Debug, Clone)]
pub struct MeasurementOutcome {
    pub index: usize,
    pub probability: f64,
    pub collapsed_state: StateVector,
}

/// Samples a computational-basis outcome from `state` using the Born rule
/// and returns the collapsed post-measurement state.
pub fn measure(state: &StateVector, rng: &mut impl Rng) -> Result<MeasurementOutcome> {
    let probabilities = state.probabilities();
    let total: f64 = probabilities.iter().sum();
    if total <= 1e-12 {
        return Err(RacahError::normalization("cannot measure the zero state"));
    }
    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut chosen = probabilities.len() - 1;
    for (i, &p) in probabilities.iter().enumerate() {
        cumulative += p;
        if target <= cumulative {
            chosen = i;
            break;
        }
    }
    let collapsed = StateVector::basis_state(state.dimension(), chosen)?;
    Ok(MeasurementOutcome {
        index: chosen,
        probability: probabilities[chosen] / total,
        collapsed_state: collapsed,
    })
}

/// General projective measurement against an arbitrary set of orthogonal
/// projectors `{P_i}` (caller-supplied, summing to the identity). Returns
/// the index of the outcome sampled and the renormalized post-measurement
/// state `P_i |psi> / ||P_i |psi>||`.
pub fn projective_measurement(
    state: &StateVector,
    projectors: &[DMatrix<Complex64>],
    rng: &mut impl Rng,
) -> Result<MeasurementOutcome> {
    let mut probabilities = Vec::with_capacity(projectors.len());
    for p in projectors {
        if p.nrows() != state.dimension() || p.ncols() != state.dimension() {
            return Err(RacahError::dimension("projector dimension does not match state"));
        }
        let projected = p * state.amplitudes();
        probabilities.push(projected.norm_sqr());
    }
    let total: f64 = probabilities.iter().sum();
    if total <= 1e-12 {
        return Err(RacahError::normalization("no projector has support on this state"));
    }
    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut chosen = probabilities.len() - 1;
    for (i, &p) in probabilities.iter().enumerate() {
        cumulative += p;
        if target <= cumulative {
            chosen = i;
            break;
        }
    }
    let projected = &projectors[chosen] * state.amplitudes();
    let norm = projected.norm();
    if norm <= 1e-12 {
        return Err(RacahError::normalization("sampled projector annihilates the state"));
    }
    let collapsed = StateVector::new((projected / Complex64::new(norm, 0.0)).iter().copied().collect())?;
    Ok(MeasurementOutcome {
        index: chosen,
        probability: probabilities[chosen] / total,
        collapsed_state: collapsed,
    })
}

/// The rank-1 projector `|psi><psi|` for a normalized state.
pub fn projector_from_state(state: &StateVector) -> DMatrix<Complex64> {
    let v = state.amplitudes();
    v * v.adjoint()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn measuring_a_basis_state_is_deterministic() {
        let state = StateVector::basis_state(2, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = measure(&state, &mut rng).unwrap();
        assert_eq!(outcome.index, 1);
        assert!((outcome.probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn projective_measurement_with_computational_projectors_matches_measure() {
        let state = StateVector::basis_state(2, 0).unwrap();
        let p0 = projector_from_state(&StateVector::basis_state(2, 0).unwrap());
        let p1 = projector_from_state(&StateVector::basis_state(2, 1).unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = projective_measurement(&state, &[p0, p1], &mut rng).unwrap();
        assert_eq!(outcome.index, 0);
    }
}
