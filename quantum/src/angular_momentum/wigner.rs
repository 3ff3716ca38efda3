//! Wigner 3j and 6j symbols, built from the Clebsch-Gordan coefficient and
//! the standard Racah triangle-delta sum respectively.

use racah_core::{RacahError, Result};

use super::clebsch_gordan::clebsch_gordan;
use super::is_valid_j;

fn factorial(n: i64) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    (2..=n).fold(1.0_f64, |acc, k| acc * k as f64)
}

fn rint(x: f64) -> i64 {
    x.round() as i64
}

/// `true` if `(a, b, c)` satisfy the triangle inequality with half-integer
/// perimeter parity (`a+b+c` an integer).
fn triangle_ok(a: f64, b: f64, c: f64) -> bool {
    a + b >= c - 1e-9 && b + c >= a - 1e-9 && c + a >= b - 1e-9 && ((a + b + c).round() - (a + b + c)).abs() < 1e-6
}

fn triangle_delta(a: f64, b: f64, c: f64) -> Result<f64> {
    if !triangle_ok(a, b, c) {
        return Ok(0.0);
    }
    Ok((factorial(rint(a + b - c)) * factorial(rint(a - b + c)) * factorial(rint(-a + b + c))
        / factorial(rint(a + b + c) + 1))
    .sqrt())
}

/// The Wigner 3j symbol `(j1 j2 j3; m1 m2 m3)`, via its relation to the
/// Clebsch-Gordan coefficient:
/// `(j1 j2 j3; m1 m2 m3) = (-1)^(j1-j2-m3) / sqrt(2 j3 + 1) * <j1 m1 j2 m2 | j3 -m3>`.
pub fn wigner_3j(j1: f64, j2: f64, j3: f64, m1: f64, m2: f64, m3: f64) -> Result<f64> {
    for (label, value) in [("j1", j1), ("j2", j2), ("j3", j3)] {
        if !is_valid_j(value) {
            return Err(RacahError::domain(format!("{label} = {value} is not a non-negative half-integer")));
        }
    }
    if (m1 + m2 + m3).abs() > 1e-9 {
        return Ok(0.0);
    }
    if !triangle_ok(j1, j2, j3) {
        return Ok(0.0);
    }
    let cg = clebsch_gordan(j1, m1, j2, m2, j3, -m3)?;
    let sign = if rint(j1 - j2 - m3).rem_euclid(2) == 0 { 1.0 } else { -1.0 };
    Ok(sign * cg / (2.0 * j3 + 1.0).sqrt())
}

/// The Wigner 6j symbol `{j1 j2 j3; j4 j5 j6}` via the Racah formula:
/// a product of four triangle-delta factors times a finite alternating sum.
pub fn wigner_6j(j1: f64, j2: f64, j3: f64, j4: f64, j5: f64, j6: f64) -> Result<f64> {
    for (label, value) in [("j1", j1), ("j2", j2), ("j3", j3), ("j4", j4), ("j5", j5), ("j6", j6)] {
        if !is_valid_j(value) {
            return Err(RacahError::domain(format!("{label} = {value} is not a non-negative half-integer")));
        }
    }
    let triads = [(j1, j2, j3), (j1, j5, j6), (j4, j2, j6), (j4, j5, j3)];
    if triads.iter().any(|&(a, b, c)| !triangle_ok(a, b, c)) {
        return Ok(0.0);
    }
    let deltas: f64 = {
        let mut product = 1.0;
        for &(a, b, c) in &triads {
            product *= triangle_delta(a, b, c)?;
        }
        product
    };

    let t_min = [
        rint(j1 + j2 + j3),
        rint(j1 + j5 + j6),
        rint(j4 + j2 + j6),
        rint(j4 + j5 + j3),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);
    let t_max = [
        rint(j1 + j2 + j4 + j5),
        rint(j2 + j3 + j5 + j6),
        rint(j3 + j1 + j6 + j4),
    ]
    .into_iter()
    .min()
    .unwrap_or(0);

    let mut sum = 0.0;
    let mut t = t_min;
    while t <= t_max {
        let denom = factorial(t - rint(j1 + j2 + j3))
            * factorial(t - rint(j1 + j5 + j6))
            * factorial(t - rint(j4 + j2 + j6))
            * factorial(t - rint(j4 + j5 + j3))
            * factorial(rint(j1 + j2 + j4 + j5) - t)
            * factorial(rint(j2 + j3 + j5 + j6) - t)
            * factorial(rint(j3 + j1 + j6 + j4) - t);
        if denom.abs() > 0.0 {
            let sign = if t % 2 == 0 { 1.0 } else { -1.0 };
            sum += sign * factorial(t + 1) / denom;
        }
        t += 1;
    }

    Ok(deltas * sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn three_j_vanishes_when_m_sum_nonzero() {
        let v = wigner_3j(1.0, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(v, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn three_j_of_two_spin_half_singlet() {
        // (1/2 1/2 0; 1/2 -1/2 0) = 1/sqrt(2) up to sign convention.
        let v = wigner_3j(0.5, 0.5, 0.0, 0.5, -0.5, 0.0).unwrap();
        assert!((v.abs() - 1.0 / std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn six_j_vanishes_outside_triangle() {
        let v = wigner_6j(1.0, 1.0, 5.0, 1.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(v, 0.0, epsilon = 1e-12);
    }
}
