//! Intertwiner spaces: the invariant (total angular momentum `j = 0`)
//! subspace of a tensor product of spins, `Inv(j1, ..., jn)`, built by
//! running the angular-momentum coupling chain and keeping only the
//! `j = 0` blocks.

use racah_core::Result;

use crate::angular_momentum::recoupling_basis;
use crate::state::StateVector;

/// `true` if three spins satisfy the triangle inequality
/// (`|j1-j2| <= j3 <= j1+j2`) with integer perimeter, i.e. a 3-valent
/// intertwiner exists between them.
pub fn triangle_inequality(j1: f64, j2: f64, j3: f64) -> bool {
    let sum = j1 + j2 + j3;
    j3 >= (j1 - j2).abs() - 1e-9 && j3 <= j1 + j2 + 1e-9 && (sum.round() - sum).abs() < 1e-6
}

/// The dimension of `Inv(j1, ..., jn)`: the number of independent `j = 0`
/// components produced by coupling the spins in order.
pub fn dimension(spins: &[f64]) -> Result<usize> {
    if spins.len() < 2 {
        return Ok(0);
    }
    if spins.len() == 2 {
        return Ok(if (spins[0] - spins[1]).abs() < 1e-9 { 1 } else { 0 });
    }
    let components = recoupling_basis(spins)?;
    Ok(components.iter().filter(|c| c.j.abs() < 1e-9).count())
}

/// An orthonormal basis for `Inv(j1, ..., jn)`, each vector expressed in the
/// full tensor-product space of the input spins.
pub fn basis(spins: &[f64]) -> Result<Vec<StateVector>> {
    if spins.len() < 2 {
        return Ok(Vec::new());
    }
    let components = recoupling_basis(spins)?;
    Ok(components
        .into_iter()
        .filter(|c| c.j.abs() < 1e-9)
        .flat_map(|c| c.basis)
        .collect())
}

/// The full tensor-form representation of the intertwiner space: each basis
/// vector's raw amplitude array in the tensor-product space, useful for
/// feeding into a graph node's label.
pub fn tensor_form(spins: &[f64]) -> Result<Vec<Vec<num_complex::Complex64>>> {
    Ok(basis(spins)?.into_iter().map(|v| v.amplitudes().iter().copied().collect()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_spin_half_intertwiner_is_one_dimensional() {
        assert_eq!(dimension(&[0.5, 0.5]).unwrap(), 1);
        assert_eq!(basis(&[0.5, 0.5]).unwrap().len(), 1);
    }

    #[test]
    fn mismatched_pair_has_no_intertwiner() {
        assert_eq!(dimension(&[0.5, 1.0]).unwrap(), 0);
    }

    #[test]
    fn triangle_inequality_rejects_non_triangle() {
        assert!(triangle_inequality(1.0, 1.0, 1.0));
        assert!(!triangle_inequality(1.0, 1.0, 5.0));
    }

    #[test]
    fn four_spin_half_intertwiner_is_two_dimensional() {
        assert_eq!(dimension(&[0.5, 0.5, 0.5, 0.5]).unwrap(), 2);
    }
}
