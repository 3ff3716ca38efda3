//! Discrete-time coined quantum walk on a 2-D lattice with reflecting
//! boundaries: at the edge of the grid, a step that would leave the
//! lattice instead reflects the walker's direction in place (the pinned
//! boundary policy), which is what keeps the coin+shift evolution unitary
//! without needing a periodic or absorbing boundary.
//!
//! Builds on the same "stateful driver wrapping a `QuantumState`" shape as
//! the teacher's continuous-time walk, but the coin/shift mechanics
//! themselves come from the discrete walk literature since the teacher has
//! no discrete-time analog.

use nalgebra::DMatrix;
use num_complex::Complex64;
use racah_core::{RacahError, Result};

use crate::hilbert::HilbertSpace;
use crate::state::StateVector;

/// The four coin directions, in index order `[up, down, left, right]`.
const DIRECTIONS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// A coined quantum walk over a `width x height` grid.
pub struct QuantumWalk {
    width: usize,
    height: usize,
    space: HilbertSpace,
    state: StateVector,
}

impl QuantumWalk {
    /// Builds a walk starting at `position` with the given coin state
    /// (dimension 4, one amplitude per direction in [`DIRECTIONS`] order).
    pub fn new(width: usize, height: usize, position: (usize, usize), coin_state: StateVector) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RacahError::dimension("grid dimensions must be >= 1"));
        }
        if coin_state.dimension() != 4 {
            return Err(RacahError::dimension("coin state must have dimension 4"));
        }
        if position.0 >= width || position.1 >= height {
            return Err(RacahError::domain("initial position is outside the grid"));
        }
        let space = HilbertSpace::new(vec![4, width * height])?;
        let position_index = position.1 * width + position.0;
        let position_state = StateVector::basis_state(width * height, position_index)?;
        let state = space.tensor_product(&[coin_state, position_state])?;
        Ok(Self { width, height, space, state })
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn position_of(&self, x: isize, y: isize) -> (usize, usize) {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        (cx, cy)
    }

    /// The reflecting conditional shift: for each coin direction `d` and
    /// position `p`, moves to `p + direction(d)` unless that step would
    /// leave the grid, in which case the walker stays at `p` but the coin
    /// direction is reversed (up<->down, left<->right) so the walk remains
    /// a permutation of the joint basis -- and hence unitary.
    fn shift_operator(&self) -> DMatrix<Complex64> {
        let dim = 4 * self.width * self.height;
        let mut m = DMatrix::<Complex64>::zeros(dim, dim);
        for coin in 0..4 {
            let (dx, dy) = DIRECTIONS[coin];
            for y in 0..self.height {
                for x in 0..self.width {
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    let in_bounds = nx >= 0 && nx < self.width as isize && ny >= 0 && ny < self.height as isize;
                    let (out_coin, out_x, out_y) = if in_bounds {
                        (coin, nx as usize, ny as usize)
                    } else {
                        (reflect(coin), x, y)
                    };
                    let src = coin * (self.width * self.height) + y * self.width + x;
                    let dst = out_coin * (self.width * self.height) + out_y * self.width + out_x;
                    m[(dst, src)] = Complex64::new(1.0, 0.0);
                }
            }
        }
        m
    }

    /// Advances the walk by one step: applies `coin_operator` (dimension 4)
    /// to the coin register, tensored with identity on position, then the
    /// reflecting shift.
    pub fn step(&mut self, coin_operator: &DMatrix<Complex64>) -> Result<()> {
        if coin_operator.nrows() != 4 || coin_operator.ncols() != 4 {
            return Err(RacahError::dimension("coin operator must be 4x4"));
        }
        let position_dim = self.width * self.height;
        let full_coin = coin_operator.kronecker(&DMatrix::<Complex64>::identity(position_dim, position_dim));
        let after_coin = &full_coin * self.state.amplitudes();
        let shift = self.shift_operator();
        let after_shift = &shift * after_coin;
        self.state = StateVector::new(after_shift.iter().copied().collect())?;
        Ok(())
    }

    /// Advances the walk by `steps` applications of `coin_operator`.
    pub fn evolve(&mut self, steps: usize, coin_operator: &DMatrix<Complex64>) -> Result<()> {
        for _ in 0..steps {
            self.step(coin_operator)?;
        }
        Ok(())
    }

    /// The marginal probability distribution over grid positions, summed
    /// over the coin register.
    pub fn position_distribution(&self) -> Result<Vec<f64>> {
        let rho = self.space.partial_trace(&self.state, &[0])?;
        Ok((0..self.width * self.height).map(|i| rho.matrix()[(i, i)].re).collect())
    }
}

fn reflect(coin: usize) -> usize {
    match coin {
        0 => 1,
        1 => 0,
        2 => 3,
        3 => 2,
        _ => unreachable!("coin index must be in 0..4"),
    }
}

/// The Grover coin: the 4x4 unitary `2|s><s| - I` for the equal
/// superposition `|s>`, the standard isotropic coin for a 2-D walk.
pub fn grover_coin() -> DMatrix<Complex64> {
    let n = 4.0;
    let base = Complex64::new(2.0 / n, 0.0);
    let mut m = DMatrix::from_element(4, 4, base);
    for i in 0..4 {
        m[(i, i)] -= Complex64::new(1.0, 0.0);
    }
    m
}

/// The Hadamard-4 coin: the tensor product `H (x) H` of two single-qubit
/// Hadamard gates, the default coin for the 2-D walk.
pub fn hadamard_4() -> DMatrix<Complex64> {
    let h = crate::gates::hadamard();
    h.kronecker(&h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix_util::is_unitary;
    use racah_core::DEFAULT_TOLERANCE;

    #[test]
    fn grover_coin_is_unitary() {
        assert!(is_unitary(&grover_coin(), DEFAULT_TOLERANCE));
    }

    #[test]
    fn hadamard_4_coin_is_unitary() {
        assert!(is_unitary(&hadamard_4(), DEFAULT_TOLERANCE));
    }

    #[test]
    fn walk_preserves_norm_with_hadamard_4_coin_on_a_5x5_lattice() {
        let coin = StateVector::basis_state(4, 0).unwrap();
        let mut walk = QuantumWalk::new(5, 5, (2, 2), coin).unwrap();
        let op = hadamard_4();
        for _ in 0..20 {
            walk.step(&op).unwrap();
            assert!((walk.state().norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn walk_preserves_norm_over_many_steps_at_the_boundary() {
        let coin = StateVector::basis_state(4, 0).unwrap();
        let mut walk = QuantumWalk::new(3, 3, (0, 0), coin).unwrap();
        let op = grover_coin();
        walk.evolve(20, &op).unwrap();
        assert!((walk.state().norm() - 1.0).abs() < 1e-7);
    }

    #[test]
    fn position_distribution_sums_to_one() {
        let coin = StateVector::equal_superposition(4).unwrap();
        let mut walk = QuantumWalk::new(4, 4, (1, 1), coin).unwrap();
        walk.evolve(5, &grover_coin()).unwrap();
        let dist = walk.position_distribution().unwrap();
        let total: f64 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-7);
    }
}
