//! Clebsch-Gordan coefficients: the closed-form Racah formula, a fast path
//! for coupling two spin-1/2 systems, and a sparse coefficient table that
//! can be loaded from the external JSON format (`"j1,m1,j2,m2,j,m"` ->
//! coefficient) and memoizes coefficients it has already computed.

use std::cell::RefCell;
use std::collections::HashMap;

use racah_core::{RacahError, Result};

use super::is_valid_j;

fn factorial(n: i64) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    (2..=n).fold(1.0_f64, |acc, k| acc * k as f64)
}

/// The Clebsch-Gordan coefficient `<j1 m1 j2 m2 | j m>`, computed directly
/// from the closed-form Racah formula (no caching; see
/// [`ClebschGordanTable`] for a memoized, loadable variant).
pub fn clebsch_gordan(j1: f64, m1: f64, j2: f64, m2: f64, j: f64, m: f64) -> Result<f64> {
    for (label, value) in [("j1", j1), ("j2", j2), ("j", j)] {
        if !is_valid_j(value) {
            return Err(RacahError::domain(format!("{label} = {value} is not a non-negative half-integer")));
        }
    }
    if m1.abs() > j1 + 1e-9 {
        return Err(RacahError::domain(format!("m1 = {m1} out of range for j1 = {j1}")));
    }
    if m2.abs() > j2 + 1e-9 {
        return Err(RacahError::domain(format!("m2 = {m2} out of range for j2 = {j2}")));
    }
    if m.abs() > j + 1e-9 {
        return Err(RacahError::domain(format!("m = {m} out of range for j = {j}")));
    }

    if (m1 + m2 - m).abs() > 1e-9 {
        return Ok(0.0);
    }
    if j > j1 + j2 + 1e-9 || j < (j1 - j2).abs() - 1e-9 {
        return Ok(0.0);
    }

    // Shortcut for coupling two spin-1/2 systems: avoids factorial overflow
    // concerns entirely and matches the textbook table exactly.
    if (j1 - 0.5).abs() < 1e-9 && (j2 - 0.5).abs() < 1e-9 {
        return Ok(spin_half_shortcut(m1, m2, j, m));
    }

    let triangle_num = factorial(rint(j1 + j2 - j))
        * factorial(rint(j1 - j2 + j))
        * factorial(rint(-j1 + j2 + j))
        / factorial(rint(j1 + j2 + j) + 1);

    let norm = ((2.0 * j + 1.0) * triangle_num).sqrt()
        * (factorial(rint(j + m)) * factorial(rint(j - m)) * factorial(rint(j1 - m1)) * factorial(rint(j1 + m1))
            * factorial(rint(j2 - m2)) * factorial(rint(j2 + m2)))
        .sqrt();

    let k_min = [0, rint(-(j - j2 + m1)), rint(-(j - j1 - m2))].into_iter().max().unwrap_or(0).max(0);
    let k_max = [rint(j1 + j2 - j), rint(j1 - m1), rint(j2 + m2)].into_iter().min().unwrap_or(0);

    let mut sum = 0.0_f64;
    let mut k = k_min;
    while k <= k_max {
        let denom = factorial(k)
            * factorial(rint(j1 + j2 - j) - k)
            * factorial(rint(j1 - m1) - k)
            * factorial(rint(j2 + m2) - k)
            * factorial(rint(j - j2 + m1) + k)
            * factorial(rint(j - j1 - m2) + k);
        if denom.abs() > 0.0 {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            sum += sign / denom;
        }
        k += 1;
    }

    Ok(norm * sum)
}

fn spin_half_shortcut(m1: f64, m2: f64, j: f64, m: f64) -> f64 {
    let h = 1.0 / std::f64::consts::SQRT_2;
    if (j - 1.0).abs() < 1e-9 {
        if m1 > 0.0 && m2 > 0.0 {
            return 1.0;
        }
        if m1 < 0.0 && m2 < 0.0 {
            return 1.0;
        }
        return h; // |1,0> = (|+-> + |-+>)/sqrt2
    }
    // singlet j = 0
    if m.abs() < 1e-9 {
        if m1 > 0.0 && m2 < 0.0 {
            return h;
        }
        if m1 < 0.0 && m2 > 0.0 {
            return -h;
        }
    }
    0.0
}

fn rint(x: f64) -> i64 {
    x.round() as i64
}

/// A memoizing, loadable Clebsch-Gordan coefficient table. Misses fall back
/// to the closed-form [`clebsch_gordan`] computation and are cached;
/// memoization never changes the value returned for a given key, only how
/// quickly it's produced.
pub struct ClebschGordanTable {
    cache: RefCell<HashMap<String, f64>>,
}

impl ClebschGordanTable {
    pub fn new() -> Self {
        Self { cache: RefCell::new(HashMap::new()) }
    }

    /// Loads coefficients from the external sparse JSON format: an object
    /// whose keys are `"j1,m1,j2,m2,j,m"` and whose values are the
    /// coefficients. Loaded entries take precedence over computed ones.
    pub fn load_json(&self, json: &str) -> Result<()> {
        let parsed: HashMap<String, f64> = serde_json::from_str(json)
            .map_err(|e| RacahError::domain(format!("invalid Clebsch-Gordan JSON: {e}")))?;
        let mut cache = self.cache.borrow_mut();
        for (key, value) in parsed {
            cache.insert(key, value);
        }
        Ok(())
    }

    fn key(j1: f64, m1: f64, j2: f64, m2: f64, j: f64, m: f64) -> String {
        format!("{j1},{m1},{j2},{m2},{j},{m}")
    }

    /// Looks up or computes `<j1 m1 j2 m2 | j m>`.
    pub fn get(&self, j1: f64, m1: f64, j2: f64, m2: f64, j: f64, m: f64) -> Result<f64> {
        let key = Self::key(j1, m1, j2, m2, j, m);
        if let Some(&v) = self.cache.borrow().get(&key) {
            return Ok(v);
        }
        let v = clebsch_gordan(j1, m1, j2, m2, j, m)?;
        self.cache.borrow_mut().insert(key, v);
        Ok(v)
    }
}

impl Default for ClebschGordanTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_spin_half_triplet_stretched_state() {
        let c = clebsch_gordan(0.5, 0.5, 0.5, 0.5, 1.0, 1.0).unwrap();
        assert_relative_eq!(c, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn two_spin_half_triplet_zero_state() {
        let c = clebsch_gordan(0.5, 0.5, 0.5, -0.5, 1.0, 0.0).unwrap();
        assert_relative_eq!(c, 1.0 / std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn two_spin_half_singlet_state() {
        let c = clebsch_gordan(0.5, 0.5, 0.5, -0.5, 0.0, 0.0).unwrap();
        assert_relative_eq!(c, 1.0 / std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn coefficient_vanishes_when_m_does_not_add() {
        let c = clebsch_gordan(0.5, 0.5, 0.5, 0.5, 1.0, 0.0).unwrap();
        assert_relative_eq!(c, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn table_memoizes_and_matches_direct_computation() {
        let table = ClebschGordanTable::new();
        let direct = clebsch_gordan(1.0, 1.0, 1.0, -1.0, 1.0, 0.0).unwrap();
        let cached = table.get(1.0, 1.0, 1.0, -1.0, 1.0, 0.0).unwrap();
        assert_relative_eq!(direct, cached, epsilon = 1e-9);
        let cached_again = table.get(1.0, 1.0, 1.0, -1.0, 1.0, 0.0).unwrap();
        assert_relative_eq!(cached_again, cached, epsilon = 1e-12);
    }
}
