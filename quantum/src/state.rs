//! State vectors: finite-dimensional complex vectors representing pure
//! quantum states, with an explicit property bag for graph-node/edge
//! labelling metadata.
//!
//! State vectors are deliberately **not** auto-normalized on construction
//! or mutation: callers normalize explicitly via [`StateVector::normalize`].

use std::collections::HashMap;

use nalgebra::DVector;
use num_complex::Complex64;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

/// A complex state vector in a finite-dimensional Hilbert space.
#[derive(Debug, Clone)]
pub struct StateVector {
    amplitudes: DVector<Complex64>,
    label: Option<String>,
    properties: HashMap<String, String>,
}

impl StateVector {
    /// Builds a state vector from raw amplitudes.
    pub fn new(amplitudes: Vec<Complex64>) -> Result<Self> {
        if amplitudes.is_empty() {
            return Err(RacahError::dimension("state vector dimension must be >= 1"));
        }
        Ok(Self {
            amplitudes: DVector::from_vec(amplitudes),
            label: None,
            properties: HashMap::new(),
        })
    }

    /// The zero vector of the given dimension (not a valid physical state
    /// until populated and normalized).
    pub fn zeros(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RacahError::dimension("state vector dimension must be >= 1"));
        }
        Ok(Self {
            amplitudes: DVector::from_element(dimension, Complex64::new(0.0, 0.0)),
            label: None,
            properties: HashMap::new(),
        })
    }

    /// The computational basis state `|index>` in the given dimension.
    pub fn basis_state(dimension: usize, index: usize) -> Result<Self> {
        if index >= dimension {
            return Err(RacahError::domain(format!(
                "basis index {index} out of range for dimension {dimension}"
            )));
        }
        let mut v = Self::zeros(dimension)?;
        v.amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(v)
    }

    /// An equal-superposition state over all basis states of the given
    /// dimension, normalized.
    pub fn equal_superposition(dimension: usize) -> Result<Self> {
        let mut v = Self::zeros(dimension)?;
        let amp = Complex64::new(1.0 / (dimension as f64).sqrt(), 0.0);
        v.amplitudes.fill(amp);
        Ok(v)
    }

    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &DVector<Complex64> {
        &self.amplitudes
    }

    pub fn get(&self, index: usize) -> Result<Complex64> {
        self.amplitudes
            .get(index)
            .copied()
            .ok_or_else(|| RacahError::domain(format!("index {index} out of range")))
    }

    pub fn set(&mut self, index: usize, value: Complex64) -> Result<()> {
        if index >= self.dimension() {
            return Err(RacahError::domain(format!("index {index} out of range")));
        }
        self.amplitudes[index] = value;
        Ok(())
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// The Euclidean (L2) norm of the amplitude vector.
    pub fn norm(&self) -> f64 {
        self.amplitudes.norm()
    }

    pub fn is_zero(&self, tol: f64) -> bool {
        self.norm() <= tol
    }

    /// Scales the state so its norm is 1. Errors if the state is the zero
    /// vector (within [`DEFAULT_TOLERANCE`]).
    pub fn normalize(&mut self) -> Result<()> {
        let n = self.norm();
        if n <= DEFAULT_TOLERANCE {
            return Err(RacahError::normalization("cannot normalize the zero vector"));
        }
        self.amplitudes /= Complex64::new(n, 0.0);
        Ok(())
    }

    /// Returns a normalized copy, leaving `self` untouched.
    pub fn normalized(&self) -> Result<Self> {
        let mut clone = self.clone();
        clone.normalize()?;
        Ok(clone)
    }

    /// `<self|other>`.
    pub fn inner_product(&self, other: &Self) -> Result<Complex64> {
        self.require_same_dimension(other)?;
        Ok(self.amplitudes.dotc(&other.amplitudes))
    }

    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            amplitudes: &self.amplitudes * factor,
            label: None,
            properties: HashMap::new(),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.require_same_dimension(other)?;
        Ok(Self {
            amplitudes: &self.amplitudes + &other.amplitudes,
            label: None,
            properties: HashMap::new(),
        })
    }

    /// Kronecker (tensor) product `self ⊗ other`.
    pub fn tensor_product(&self, other: &Self) -> Self {
        let mut out = DVector::<Complex64>::zeros(self.dimension() * other.dimension());
        for i in 0..self.dimension() {
            for j in 0..other.dimension() {
                out[i * other.dimension() + j] = self.amplitudes[i] * other.amplitudes[j];
            }
        }
        Self {
            amplitudes: out,
            label: None,
            properties: HashMap::new(),
        }
    }

    /// Per-basis-state Born-rule probabilities `|amplitude_i|^2`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Expectation value `<self|A|self>` of a Hermitian-agnostic operator
    /// matrix (callers are responsible for any Hermiticity assumption).
    pub fn expectation(&self, matrix: &nalgebra::DMatrix<Complex64>) -> Result<Complex64> {
        if matrix.nrows() != self.dimension() || matrix.ncols() != self.dimension() {
            return Err(RacahError::dimension("operator dimension does not match state dimension"));
        }
        Ok(self.amplitudes.dotc(&(matrix * &self.amplitudes)))
    }

    /// Pure-state fidelity `|<self|other>|^2`.
    pub fn fidelity(&self, other: &Self) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Equality within `tol` on every amplitude.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.dimension() != other.dimension() {
            return false;
        }
        (&self.amplitudes - &other.amplitudes).iter().all(|c| c.norm() <= tol)
    }

    fn require_same_dimension(&self, other: &Self) -> Result<()> {
        if self.dimension() != other.dimension() {
            return Err(RacahError::dimension(format!(
                "dimension mismatch: {} vs {}",
                self.dimension(),
                other.dimension()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basis_state_has_unit_norm() {
        let s = StateVector::basis_state(4, 2).unwrap();
        assert_relative_eq!(s.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.get(2).unwrap().re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn is_not_auto_normalized() {
        let s = StateVector::new(vec![Complex64::new(3.0, 0.0), Complex64::new(4.0, 0.0)]).unwrap();
        assert_relative_eq!(s.norm(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_zero_vector_errors() {
        let mut z = StateVector::zeros(2).unwrap();
        assert!(z.normalize().is_err());
    }

    #[test]
    fn tensor_product_dimension() {
        let a = StateVector::basis_state(2, 0).unwrap();
        let b = StateVector::basis_state(2, 1).unwrap();
        let ab = a.tensor_product(&b);
        assert_eq!(ab.dimension(), 4);
        assert_relative_eq!(ab.get(1).unwrap().re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hadamard_superposition_probabilities() {
        let h = 1.0 / std::f64::consts::SQRT_2;
        let s = StateVector::new(vec![Complex64::new(h, 0.0), Complex64::new(h, 0.0)]).unwrap();
        let p = s.probabilities();
        assert_relative_eq!(p[0], 0.5, epsilon = 1e-9);
        assert_relative_eq!(p[1], 0.5, epsilon = 1e-9);
    }
}
