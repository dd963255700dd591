//! Gamma function for real arguments
//!
//! Lanczos approximation (g = 7, 9 terms) with the reflection formula for
//! arguments below one half. Relative error is around 1e-15 over the range
//! the moment estimator needs (1 < x ≤ 2).
//!
//! # References
//! - Lanczos, C. (1964). "A Precision Approximation of the Gamma Function"
//!   SIAM Journal on Numerical Analysis, 1(1), 86-96

use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;

#[allow(clippy::excessive_precision)]
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Γ(x)
///
/// Poles (zero and negative integers) yield an infinite or NaN value.
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Γ(x)·Γ(1−x) = π / sin(πx)
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let mut series = LANCZOS_COEFFICIENTS[0];
    for (i, &coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        series += coefficient / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}
