use std::collections::HashMap;

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{Result, DEFAULT_TOLERANCE};

use crate::state::StateVector;

use super::{Operator, OperatorType};

/// A coordinate-list (row, col) -> value sparse operator, used when a
/// matrix's nonzero fraction is small enough that materializing a dense
/// matrix for `apply` would be wasteful.
#[derive(Debug, Clone)]
pub struct SparseOperator {
    dimension: usize,
    entries: HashMap<(usize, usize), Complex64>,
}

impl SparseOperator {
    pub fn new(dimension: usize, entries: HashMap<(usize, usize), Complex64>) -> Self {
        Self { dimension, entries }
    }

    pub fn from_dense(m: &DMatrix<Complex64>) -> Self {
        let mut entries = HashMap::new();
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                if m[(i, j)].norm() > DEFAULT_TOLERANCE {
                    entries.insert((i, j), m[(i, j)]);
                }
            }
        }
        Self {
            dimension: m.nrows(),
            entries,
        }
    }

    pub fn entries(&self) -> &HashMap<(usize, usize), Complex64> {
        &self.entries
    }
}

impl Operator for SparseOperator {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn type_tag(&self) -> OperatorType {
        OperatorType::General
    }

    fn to_matrix(&self) -> DMatrix<Complex64> {
        let mut m = DMatrix::<Complex64>::zeros(self.dimension, self.dimension);
        for (&(i, j), &v) in &self.entries {
            m[(i, j)] = v;
        }
        m
    }

    fn apply(&self, state: &StateVector) -> Result<StateVector> {
        if state.dimension() != self.dimension {
            return Err(racah_core::RacahError::dimension("operator/state dimension mismatch"));
        }
        let mut out = vec![Complex64::new(0.0, 0.0); self.dimension];
        for (&(i, j), &v) in &self.entries {
            out[i] += v * state.get(j)?;
        }
        StateVector::new(out)
    }
}
