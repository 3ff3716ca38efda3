//! Angular-momentum recoupling: fixed-j operators, Clebsch-Gordan
//! coefficients, Wigner 3j/6j symbols, and multi-spin coupling with
//! coupling-history metadata.
//!
//! Basis convention (pinned, matching spec): within a fixed-j multiplet of
//! dimension `2j+1`, basis index `0` corresponds to `m = +j` and index
//! `2j` corresponds to `m = -j` (the reverse of the usual ascending-m
//! convention) — every function in this module that takes or returns a
//! basis index follows that convention.

mod clebsch_gordan;
mod coupling;
mod operators;
mod wigner;

pub use clebsch_gordan::{clebsch_gordan, ClebschGordanTable};
pub use coupling::{
    add_angular_momenta, couple_further, extract_j_component, recoupling_basis, CoupledState,
    CouplingStep, JBlock, JComponentBasis,
};
pub use operators::{j_minus, j_plus, j_squared, j_x, j_y, j_z, rotation_operator, coherent_state};
pub use wigner::{wigner_3j, wigner_6j};

use racah_core::{RacahError, Result};

/// `true` if `j` is a non-negative half-integer (0, 1/2, 1, 3/2, ...).
pub fn is_valid_j(j: f64) -> bool {
    j >= 0.0 && ((2.0 * j).round() - 2.0 * j).abs() < 1e-9
}

/// Validates that `j` is a legal angular-momentum quantum number, returning
/// the multiplet dimension `2j+1` on success.
pub fn multiplet_dimension(j: f64) -> Result<usize> {
    if !is_valid_j(j) {
        return Err(RacahError::domain(format!("j = {j} is not a non-negative half-integer")));
    }
    Ok((2.0 * j).round() as usize + 1)
}

/// Converts a basis index (0 at `m = +j`) to its `m` value.
pub fn index_to_m(j: f64, index: usize) -> Result<f64> {
    let dim = multiplet_dimension(j)?;
    if index >= dim {
        return Err(RacahError::domain(format!("index {index} out of range for j = {j}")));
    }
    Ok(j - index as f64)
}

/// Converts an `m` value to its basis index (0 at `m = +j`).
pub fn m_to_index(j: f64, m: f64) -> Result<usize> {
    let dim = multiplet_dimension(j)?;
    let idx = (j - m).round();
    if idx < 0.0 || idx as usize >= dim || (j - m - idx).abs() > 1e-6 {
        return Err(RacahError::domain(format!("m = {m} is not a valid projection for j = {j}")));
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_integer_j_values_are_valid() {
        assert!(is_valid_j(0.0));
        assert!(is_valid_j(0.5));
        assert!(is_valid_j(1.0));
        assert!(is_valid_j(2.5));
        assert!(!is_valid_j(0.3));
        assert!(!is_valid_j(-0.5));
    }

    #[test]
    fn index_m_roundtrip() {
        assert_eq!(index_to_m(1.0, 0).unwrap(), 1.0);
        assert_eq!(index_to_m(1.0, 1).unwrap(), 0.0);
        assert_eq!(index_to_m(1.0, 2).unwrap(), -1.0);
        assert_eq!(m_to_index(1.0, -1.0).unwrap(), 2);
    }
}
