//! Angular-momentum coupling: combining two states' amplitudes into a
//! single coupled state carrying J-component metadata, plus the sequential
//! basis-vector recoupling used by the intertwiner construction.

use std::collections::HashMap;

use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

use super::clebsch_gordan::clebsch_gordan;
use super::{index_to_m, multiplet_dimension};
use crate::state::StateVector;

/// One step of sequential coupling recorded in a [`CoupledState`]'s history.
#[derive(Debug, Clone)]
pub struct CouplingStep {
    pub j_a: f64,
    pub j_b: f64,
    pub resulting_js: Vec<f64>,
}

/// Where a surviving total-`J` component lives within a coupled state's
/// amplitude vector, plus the factor that renormalizes that block to unit
/// norm on extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JBlock {
    pub start_index: usize,
    pub dimension: usize,
    pub normalization_factor: f64,
}

/// The result of coupling two angular momenta: the joint amplitude vector
/// (J-blocks laid out contiguously, descending from `j1+j2` to `|j1-j2|`),
/// the metadata for every J-component whose aggregate magnitude survived
/// pruning, and the coupling history.
#[derive(Debug, Clone)]
pub struct CoupledState {
    pub state: StateVector,
    pub j_components: HashMap<i64, JBlock>,
    pub history: Vec<CouplingStep>,
}

impl CoupledState {
    /// The metadata block for total angular momentum `j`, if it survived
    /// pruning.
    pub fn component(&self, j: f64) -> Option<&JBlock> {
        self.j_components.get(&j_key(j))
    }

    /// The surviving `J` values, descending.
    pub fn component_js(&self) -> Vec<f64> {
        let mut js: Vec<f64> = self.j_components.keys().map(|&k| k as f64 / 2.0).collect();
        js.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        js
    }
}

fn j_key(j: f64) -> i64 {
    (2.0 * j).round() as i64
}

/// Couples two angular-momentum states `(psi1, j1)` and `(psi2, j2)` into a
/// single state on dimension `(2 j1 + 1)(2 j2 + 1)`:
/// `amp(J,M) = sum_{m1+m2=M} C^{JM}_{j1 m1 j2 m2} psi1[index(j1,m1)] psi2[index(j2,m2)]`.
/// J-blocks are laid out contiguously for J descending from `j1+j2` to
/// `|j1-j2|`; components whose aggregate magnitude falls at or below
/// [`DEFAULT_TOLERANCE`] are dropped from the metadata, though their
/// (all-zero) amplitude slots remain in place.
pub fn add_angular_momenta(psi1: &StateVector, j1: f64, psi2: &StateVector, j2: f64) -> Result<CoupledState> {
    let dim1 = multiplet_dimension(j1)?;
    let dim2 = multiplet_dimension(j2)?;
    if psi1.dimension() != dim1 {
        return Err(RacahError::dimension(format!(
            "psi1 dimension {} does not match the j1 = {j1} multiplet dimension {dim1}",
            psi1.dimension()
        )));
    }
    if psi2.dimension() != dim2 {
        return Err(RacahError::dimension(format!(
            "psi2 dimension {} does not match the j2 = {j2} multiplet dimension {dim2}",
            psi2.dimension()
        )));
    }

    let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim1 * dim2];
    let mut j_components = HashMap::new();
    let mut resulting_js = Vec::new();

    let j_max = j1 + j2;
    let j_min = (j1 - j2).abs();
    let mut start_index = 0usize;
    let mut j = j_max;
    while j >= j_min - 1e-9 {
        let dim_j = multiplet_dimension(j)?;
        let mut block = vec![Complex64::new(0.0, 0.0); dim_j];
        for (m_index, slot) in block.iter_mut().enumerate() {
            let m = index_to_m(j, m_index)?;
            let mut acc = Complex64::new(0.0, 0.0);
            for m1_index in 0..dim1 {
                let m1 = index_to_m(j1, m1_index)?;
                for m2_index in 0..dim2 {
                    let m2 = index_to_m(j2, m2_index)?;
                    if (m1 + m2 - m).abs() > 1e-9 {
                        continue;
                    }
                    let coeff = clebsch_gordan(j1, m1, j2, m2, j, m)?;
                    if coeff.abs() <= DEFAULT_TOLERANCE {
                        continue;
                    }
                    acc += Complex64::new(coeff, 0.0) * psi1.get(m1_index)? * psi2.get(m2_index)?;
                }
            }
            *slot = acc;
        }
        for (i, &c) in block.iter().enumerate() {
            amplitudes[start_index + i] = c;
        }
        let block_norm = block.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if block_norm > DEFAULT_TOLERANCE {
            j_components.insert(
                j_key(j),
                JBlock { start_index, dimension: dim_j, normalization_factor: 1.0 / block_norm },
            );
            resulting_js.push(j);
        }
        start_index += dim_j;
        j -= 1.0;
    }

    let state = StateVector::new(amplitudes)?;
    let history = vec![CouplingStep { j_a: j1, j_b: j2, resulting_js }];
    Ok(CoupledState { state, j_components, history })
}

/// Couples a further spin `(psi2, j2)` onto the `J`-component `j` already
/// present in `previous`, prepending `previous`'s history to the result's —
/// the recursive composition path for higher-order couplings.
pub fn couple_further(previous: &CoupledState, j: f64, psi2: &StateVector, j2: f64) -> Result<CoupledState> {
    let component = extract_j_component(previous, j)?;
    let mut next = add_angular_momenta(&component, j, psi2, j2)?;
    let mut history = previous.history.clone();
    history.append(&mut next.history);
    next.history = history;
    Ok(next)
}

/// Extracts the normalized state on `2J+1` dimensions held in the `J`-block
/// of `coupled`, using the block's recorded start index, dimension, and
/// normalization factor.
pub fn extract_j_component(coupled: &CoupledState, j: f64) -> Result<StateVector> {
    let block = coupled
        .component(j)
        .ok_or_else(|| RacahError::domain(format!("J = {j} is not present in this coupled state")))?;
    let mut amplitudes = Vec::with_capacity(block.dimension);
    for i in 0..block.dimension {
        amplitudes.push(coupled.state.get(block.start_index + i)? * Complex64::new(block.normalization_factor, 0.0));
    }
    StateVector::new(amplitudes)
}

/// One total-`J` block of basis vectors produced by [`recoupling_basis`],
/// expressed in the full tensor-product space of the coupled spins.
#[derive(Debug, Clone)]
pub struct JComponentBasis {
    pub j: f64,
    pub basis: Vec<StateVector>,
}

/// Sequential recoupling of a list of spins into total-`J` basis vectors,
/// used by the intertwiner construction (`crate::intertwiner`). Unlike
/// [`add_angular_momenta`], which couples the amplitudes of two existing
/// states, this builds the change-of-basis vectors themselves — one
/// computational basis state per input spin, recoupled pairwise.
pub fn recoupling_basis(spins: &[f64]) -> Result<Vec<JComponentBasis>> {
    if spins.len() < 2 {
        return Err(RacahError::domain("recoupling requires at least two spins"));
    }
    for &j in spins {
        multiplet_dimension(j)?;
    }

    let mut components: Vec<JComponentBasis> = {
        let dim = multiplet_dimension(spins[0])?;
        let basis = (0..dim).map(|i| StateVector::basis_state(dim, i)).collect::<Result<Vec<_>>>()?;
        vec![JComponentBasis { j: spins[0], basis }]
    };

    for &j_b in &spins[1..] {
        let dim_b = multiplet_dimension(j_b)?;
        let mut next_components: Vec<JComponentBasis> = Vec::new();

        for component in &components {
            let j_a = component.j;
            let j_min = (j_a - j_b).abs();
            let j_max = j_a + j_b;
            let mut j = j_min;
            while j <= j_max + 1e-9 {
                let dim_j = multiplet_dimension(j)?;
                let mut basis = Vec::with_capacity(dim_j);
                for m_index in 0..dim_j {
                    let m = index_to_m(j, m_index)?;
                    let mut acc = StateVector::zeros(component.basis[0].dimension() * dim_b)?;
                    for (ma_index, a_vec) in component.basis.iter().enumerate() {
                        let m_a = index_to_m(j_a, ma_index)?;
                        for mb_index in 0..dim_b {
                            let m_b = index_to_m(j_b, mb_index)?;
                            if (m_a + m_b - m).abs() > 1e-9 {
                                continue;
                            }
                            let coeff = clebsch_gordan(j_a, m_a, j_b, m_b, j, m)?;
                            if coeff.abs() <= DEFAULT_TOLERANCE {
                                continue;
                            }
                            let b_vec = StateVector::basis_state(dim_b, mb_index)?;
                            let term = a_vec.tensor_product(&b_vec).scale(Complex64::new(coeff, 0.0));
                            acc = acc.add(&term)?;
                        }
                    }
                    basis.push(acc);
                }
                if basis.iter().any(|v| !v.is_zero(DEFAULT_TOLERANCE)) {
                    next_components.push(JComponentBasis { j, basis });
                }
                j += 1.0;
            }
        }
        components = next_components;
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_spin_half_coupling_matches_the_pinned_scenario() {
        let psi1 = StateVector::basis_state(2, 0).unwrap(); // |1/2, +1/2>
        let psi2 = StateVector::basis_state(2, 1).unwrap(); // |1/2, -1/2>
        let coupled = add_angular_momenta(&psi1, 0.5, &psi2, 0.5).unwrap();

        assert_eq!(coupled.state.dimension(), 4);
        let mut js = coupled.component_js();
        js.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(js, vec![0.0, 1.0]);

        let h = 1.0 / std::f64::consts::SQRT_2;
        let singlet = extract_j_component(&coupled, 0.0).unwrap();
        assert_eq!(singlet.dimension(), 1);
        assert!((singlet.get(0).unwrap().re - 1.0).abs() < 1e-9);

        let triplet_block = coupled.component(1.0).unwrap();
        assert!((coupled.state.get(triplet_block.start_index + 1).unwrap().re - h).abs() < 1e-9);

        let singlet_block = coupled.component(0.0).unwrap();
        assert!((coupled.state.get(singlet_block.start_index).unwrap().re - h).abs() < 1e-9);
    }

    #[test]
    fn extracting_an_absent_j_component_errors() {
        let psi1 = StateVector::basis_state(2, 0).unwrap();
        let psi2 = StateVector::basis_state(2, 0).unwrap();
        let coupled = add_angular_momenta(&psi1, 0.5, &psi2, 0.5).unwrap();
        assert!(extract_j_component(&coupled, 0.0).is_err());
    }

    #[test]
    fn couple_further_appends_to_history() {
        let psi1 = StateVector::basis_state(2, 0).unwrap();
        let psi2 = StateVector::basis_state(2, 0).unwrap();
        let first = add_angular_momenta(&psi1, 0.5, &psi2, 0.5).unwrap(); // J=1 triplet only
        let psi3 = StateVector::basis_state(2, 1).unwrap();
        let second = couple_further(&first, 1.0, &psi3, 0.5).unwrap();
        assert_eq!(second.history.len(), 2);
        let mut js = second.component_js();
        js.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(js, vec![0.5, 1.5]);
    }

    #[test]
    fn recoupling_basis_of_two_spin_half_gives_singlet_and_triplet() {
        let components = recoupling_basis(&[0.5, 0.5]).unwrap();
        let mut js: Vec<f64> = components.iter().map(|c| c.j).collect();
        js.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(js, vec![0.0, 1.0]);
        let triplet = components.iter().find(|c| (c.j - 1.0).abs() < 1e-9).unwrap();
        assert_eq!(triplet.basis.len(), 3);
        let singlet = components.iter().find(|c| c.j.abs() < 1e-9).unwrap();
        assert_eq!(singlet.basis.len(), 1);
        assert!((singlet.basis[0].norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recoupling_basis_of_three_spin_half_gives_doublets_and_a_quartet() {
        let components = recoupling_basis(&[0.5, 0.5, 0.5]).unwrap();
        let mut js: Vec<f64> = components.iter().map(|c| c.j).collect();
        js.sort_by(|a, b| a.partial_cmp(b).unwrap());
        // 1/2 (x) 1/2 (x) 1/2 = 3/2 + 1/2 + 1/2
        assert_eq!(js, vec![0.5, 0.5, 1.5]);
    }
}
