//! Hilbert space composition and decomposition: tensor products of state
//! vectors, partial trace on pure states via Schmidt-style reduction to a
//! density matrix, and basis-state convenience constructors.

use num_complex::Complex64;
use racah_core::{RacahError, Result};

use crate::density::DensityMatrix;
use crate::state::StateVector;

/// A tensor-product Hilbert space over a fixed list of factor dimensions.
#[derive(Debug, Clone)]
pub struct HilbertSpace {
    factor_dimensions: Vec<usize>,
}

impl HilbertSpace {
    pub fn new(factor_dimensions: Vec<usize>) -> Result<Self> {
        if factor_dimensions.is_empty() || factor_dimensions.iter().any(|&d| d == 0) {
            return Err(RacahError::dimension("factor dimensions must be non-empty and positive"));
        }
        Ok(Self { factor_dimensions })
    }

    pub fn factor_dimensions(&self) -> &[usize] {
        &self.factor_dimensions
    }

    /// Total dimension: the product of factor dimensions.
    pub fn dimension(&self) -> usize {
        self.factor_dimensions.iter().product()
    }

    /// Tensor product of state vectors, one per factor, in order.
    pub fn tensor_product(&self, states: &[StateVector]) -> Result<StateVector> {
        if states.len() != self.factor_dimensions.len() {
            return Err(RacahError::dimension(format!(
                "expected {} factor states, got {}",
                self.factor_dimensions.len(),
                states.len()
            )));
        }
        for (state, &dim) in states.iter().zip(&self.factor_dimensions) {
            if state.dimension() != dim {
                return Err(RacahError::dimension(format!(
                    "factor state dimension {} does not match expected {dim}",
                    state.dimension()
                )));
            }
        }
        let mut acc = states[0].clone();
        for s in &states[1..] {
            acc = acc.tensor_product(s);
        }
        Ok(acc)
    }

    /// Computational basis state `|i1, i2, ..., in>` given one index per
    /// factor.
    pub fn computational_basis_state(&self, indices: &[usize]) -> Result<StateVector> {
        if indices.len() != self.factor_dimensions.len() {
            return Err(RacahError::dimension("one index required per factor"));
        }
        let flat = indices
            .iter()
            .zip(&self.factor_dimensions)
            .fold(0usize, |acc, (&i, &d)| acc * d + i);
        StateVector::basis_state(self.dimension(), flat)
    }

    /// All computational basis states of the full space, in lexicographic
    /// factor-index order.
    pub fn computational_basis(&self) -> Result<Vec<StateVector>> {
        (0..self.dimension())
            .map(|i| StateVector::basis_state(self.dimension(), i))
            .collect()
    }

    /// The normalized equal superposition of all basis states.
    pub fn equal_superposition(&self) -> Result<StateVector> {
        StateVector::equal_superposition(self.dimension())
    }

    /// `true` if `state`'s dimension matches this space's total dimension.
    pub fn contains_state(&self, state: &StateVector) -> bool {
        state.dimension() == self.dimension()
    }

    /// Splits a flat index into per-factor indices.
    pub fn decompose_index(&self, mut flat: usize) -> Vec<usize> {
        let mut indices = vec![0usize; self.factor_dimensions.len()];
        for (slot, &dim) in indices.iter_mut().zip(self.factor_dimensions.iter()).rev() {
            *slot = flat % dim;
            flat /= dim;
        }
        indices
    }

    /// Partial trace of a pure state over the subsystems named in `trace_out`
    /// (0-indexed into `factor_dimensions`), returning a [`DensityMatrix`] on
    /// the remaining subsystems in their original relative order.
    pub fn partial_trace(&self, state: &StateVector, trace_out: &[usize]) -> Result<DensityMatrix> {
        if !self.contains_state(state) {
            return Err(RacahError::dimension("state does not belong to this Hilbert space"));
        }
        let n = self.factor_dimensions.len();
        let mut seen = vec![false; n];
        for &idx in trace_out {
            if idx >= n {
                return Err(RacahError::domain(format!("trace-out index {idx} out of range")));
            }
            if seen[idx] {
                return Err(RacahError::domain(format!("duplicate trace-out index {idx}")));
            }
            seen[idx] = true;
        }
        let keep: Vec<usize> = (0..n).filter(|i| !seen[*i]).collect();

        let keep_dim: usize = keep.iter().map(|&i| self.factor_dimensions[i]).product();
        let trace_dim: usize = trace_out.iter().map(|&i| self.factor_dimensions[i]).product();
        let _ = trace_dim;

        let mut rho = nalgebra::DMatrix::<Complex64>::zeros(keep_dim, keep_dim);
        let dim = self.dimension();
        for a in 0..dim {
            let idx_a = self.decompose_index(a);
            for b in 0..dim {
                let idx_b = self.decompose_index(b);
                if trace_out.iter().any(|&t| idx_a[t] != idx_b[t]) {
                    continue;
                }
                let row = Self::flatten_subset(&idx_a, &keep, &self.factor_dimensions);
                let col = Self::flatten_subset(&idx_b, &keep, &self.factor_dimensions);
                rho[(row, col)] += state.get(a)? * state.get(b)?.conj();
            }
        }
        DensityMatrix::from_matrix(rho)
    }

    fn flatten_subset(indices: &[usize], keep: &[usize], dims: &[usize]) -> usize {
        keep.iter().fold(0usize, |acc, &i| acc * dims[i] + indices[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_trace_of_bell_state_is_maximally_mixed() {
        let space = HilbertSpace::new(vec![2, 2]).unwrap();
        let h = 1.0 / std::f64::consts::SQRT_2;
        let mut bell = StateVector::zeros(4).unwrap();
        bell.set(0, Complex64::new(h, 0.0)).unwrap();
        bell.set(3, Complex64::new(h, 0.0)).unwrap();

        let reduced = space.partial_trace(&bell, &[1]).unwrap();
        let m = reduced.matrix();
        assert!((m[(0, 0)].re - 0.5).abs() < 1e-9);
        assert!((m[(1, 1)].re - 0.5).abs() < 1e-9);
        assert!(m[(0, 1)].norm() < 1e-9);
    }

    #[test]
    fn computational_basis_state_roundtrip() {
        let space = HilbertSpace::new(vec![2, 3]).unwrap();
        let state = space.computational_basis_state(&[1, 2]).unwrap();
        assert_eq!(state.dimension(), 6);
        assert!((state.get(5).unwrap().re - 1.0).abs() < 1e-12);
    }
}
