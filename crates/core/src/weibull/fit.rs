//! Two-parameter Weibull estimation from speed-class histograms
//!
//! Each histogram bin `k` stands for the speeds in `[k, k+1)` and is
//! represented by its center `k + 0.5`. The distribution has location zero:
//!
//! ```text
//! F(v) = 1 − exp(−(v/λ)^k)
//! ```
//!
//! # Degenerate rows
//! - All-zero row (no interpolated sample): sentinel fit `(0, 0)`.
//! - All mass in one bin (zero variance): point mass `(MAX_SHAPE, center)`.
//!
//! # References
//! - Justus, C.G. et al. (1978). "Methods for Estimating Wind Speed Frequency
//!   Distributions" Journal of Applied Meteorology, 17(3), 350-353
//! - Seguro, J.V. & Lambert, T.W. (2000). "Modern estimation of the parameters
//!   of the Weibull wind speed distribution for wind energy analysis"
//!   Journal of Wind Engineering and Industrial Aerodynamics, 85(1), 75-84

use super::gamma::gamma;
use serde::{Deserialize, Serialize};

/// Largest shape reported; stands in for a zero-variance (point mass) row
pub const MAX_SHAPE: f64 = 50.0;

const SHAPE_TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;

/// Center of histogram bin `class` (m/s)
#[inline]
pub fn bin_center(class: usize) -> f64 {
    class as f64 + 0.5
}

/// Fitted Weibull parameters of one cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeibullFit {
    /// Shape parameter k (dimensionless)
    pub shape: f64,
    /// Scale parameter λ (m/s)
    pub scale: f64,
}

impl WeibullFit {
    /// Fit used for cells without data
    pub const SENTINEL: WeibullFit = WeibullFit {
        shape: 0.0,
        scale: 0.0,
    };

    pub fn new(shape: f64, scale: f64) -> Self {
        Self { shape, scale }
    }

    /// Whether both parameters describe a proper distribution
    pub fn is_valid(&self) -> bool {
        self.shape > 0.0 && self.scale > 0.0 && self.shape.is_finite() && self.scale.is_finite()
    }

    /// Cumulative probability of a speed below `speed`
    ///
    /// Invalid fits have no probability mass anywhere.
    #[inline]
    pub fn cdf(&self, speed: f64) -> f64 {
        if !self.is_valid() || speed <= 0.0 {
            return 0.0;
        }
        1.0 - (-(speed / self.scale).powf(self.shape)).exp()
    }

    /// Mean speed of the distribution: λ·Γ(1 + 1/k)
    pub fn mean(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.scale * gamma(1.0 + 1.0 / self.shape)
    }
}

/// Count-weighted view over the non-empty bins of a histogram row
struct BinnedSample {
    /// (center, count) of every non-empty bin
    bins: Vec<(f64, f64)>,
    total: f64,
}

impl BinnedSample {
    fn from_row(histogram_row: &[u32]) -> Option<Self> {
        let bins: Vec<(f64, f64)> = histogram_row
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(class, &count)| (bin_center(class), f64::from(count)))
            .collect();
        let total: f64 = bins.iter().map(|&(_, count)| count).sum();
        if total > 0.0 {
            Some(Self { bins, total })
        } else {
            None
        }
    }

    fn point_mass(&self) -> Option<WeibullFit> {
        match self.bins.as_slice() {
            [(center, _)] => Some(WeibullFit::new(MAX_SHAPE, *center)),
            _ => None,
        }
    }
}

/// Maximum-likelihood fit with location fixed at zero
///
/// Equivalent to fitting the sample that repeats every bin center as many
/// times as the bin count, computed through count-weighted sums. The shape
/// solves the profile likelihood equation
///
/// ```text
/// Σ x^k ln x / Σ x^k − 1/k − mean(ln x) = 0
/// ```
///
/// with a Newton iteration safeguarded by bisection; then
/// `λ = (Σ x^k / n)^(1/k)`.
pub fn fit_mle(histogram_row: &[u32]) -> WeibullFit {
    let Some(sample) = BinnedSample::from_row(histogram_row) else {
        return WeibullFit::SENTINEL;
    };
    if let Some(fit) = sample.point_mass() {
        return fit;
    }

    // Work on x / x_max so x^k cannot overflow for large shapes
    let x_max = sample
        .bins
        .iter()
        .map(|&(center, _)| center)
        .fold(0.0, f64::max);
    let scaled: Vec<(f64, f64)> = sample
        .bins
        .iter()
        .map(|&(center, count)| ((center / x_max).ln(), count))
        .collect();
    let mean_log = scaled.iter().map(|&(ln_y, count)| ln_y * count).sum::<f64>() / sample.total;

    // Value and derivative of the profile equation at shape k
    let profile = |k: f64| -> (f64, f64) {
        let mut s0 = 0.0;
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for &(ln_y, count) in &scaled {
            let w = count * (k * ln_y).exp();
            s0 += w;
            s1 += w * ln_y;
            s2 += w * ln_y * ln_y;
        }
        let ratio = s1 / s0;
        let value = ratio - 1.0 / k - mean_log;
        let derivative = s2 / s0 - ratio * ratio + 1.0 / (k * k);
        (value, derivative)
    };

    // The profile function increases from −∞ (k → 0) to −mean(ln y) > 0
    let mut lo = 1e-3;
    let mut hi = 1.0;
    while profile(hi).0 < 0.0 {
        lo = hi;
        hi *= 2.0;
        if hi > MAX_SHAPE {
            return mle_scale(&scaled, sample.total, x_max, MAX_SHAPE);
        }
    }

    let mut k = (lo + hi) / 2.0;
    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = profile(k);
        if value.abs() < SHAPE_TOLERANCE {
            break;
        }
        if value < 0.0 {
            lo = k;
        } else {
            hi = k;
        }
        let newton = k - value / derivative;
        k = if newton > lo && newton < hi && newton.is_finite() {
            newton
        } else {
            (lo + hi) / 2.0
        };
        if hi - lo < SHAPE_TOLERANCE {
            break;
        }
    }

    mle_scale(&scaled, sample.total, x_max, k.min(MAX_SHAPE))
}

fn mle_scale(scaled: &[(f64, f64)], total: f64, x_max: f64, shape: f64) -> WeibullFit {
    let moment = scaled
        .iter()
        .map(|&(ln_y, count)| count * (shape * ln_y).exp())
        .sum::<f64>()
        / total;
    WeibullFit::new(shape, x_max * moment.powf(1.0 / shape))
}

/// Method-of-moments fit
///
/// Mean, variance, skewness and excess kurtosis are taken over the bin
/// centers weighted by count. Shape comes from `(kurtosis + 3) / skewness²`
/// and scale from the gamma form `mean / Γ(1 + 1/k)^(1/k)`. A symmetric row
/// (zero skewness) saturates at [`MAX_SHAPE`].
pub fn fit_moments(histogram_row: &[u32]) -> WeibullFit {
    let Some(sample) = BinnedSample::from_row(histogram_row) else {
        return WeibullFit::SENTINEL;
    };
    if let Some(fit) = sample.point_mass() {
        return fit;
    }

    let n = sample.total;
    let mean = sample.bins.iter().map(|&(x, c)| x * c).sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &(x, c) in &sample.bins {
        let d = x - mean;
        let d2 = d * d;
        m2 += c * d2;
        m3 += c * d2 * d;
        m4 += c * d2 * d2;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;

    let skewness = m3 / m2.powf(1.5);
    let excess_kurtosis = m4 / (m2 * m2) - 3.0;

    let raw_shape = (excess_kurtosis + 3.0) / (skewness * skewness);
    let shape = if raw_shape.is_finite() && raw_shape > 0.0 {
        raw_shape.min(MAX_SHAPE)
    } else {
        MAX_SHAPE
    };

    let scale = mean / gamma(1.0 + 1.0 / shape).powf(1.0 / shape);
    WeibullFit::new(shape, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SPEED_CLASSES;

    fn row(entries: &[(usize, u32)]) -> Vec<u32> {
        let mut counts = vec![0; SPEED_CLASSES];
        for &(class, count) in entries {
            counts[class] = count;
        }
        counts
    }

    #[test]
    fn test_all_zero_row_is_sentinel() {
        let empty = vec![0; SPEED_CLASSES];
        assert_eq!(fit_mle(&empty), WeibullFit::SENTINEL);
        assert_eq!(fit_moments(&empty), WeibullFit::SENTINEL);
        assert!(!WeibullFit::SENTINEL.is_valid());
        assert_eq!(WeibullFit::SENTINEL.cdf(10.0), 0.0);
    }

    #[test]
    fn test_single_bin_is_point_mass() {
        let counts = row(&[(8, 744)]);
        for fit in [fit_mle(&counts), fit_moments(&counts)] {
            assert_eq!(fit.shape, MAX_SHAPE);
            assert_eq!(fit.scale, 8.5);
            assert!(fit.is_valid());
        }
    }

    #[test]
    fn test_fits_are_positive_for_any_populated_row() {
        let rows = [
            row(&[(0, 1), (39, 1)]),
            row(&[(3, 10), (4, 30), (5, 50), (6, 20), (9, 2)]),
            row(&[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]),
            row(&[(0, 1000), (1, 1)]),
        ];
        for counts in &rows {
            let mle = fit_mle(counts);
            let moments = fit_moments(counts);
            assert!(mle.is_valid(), "MLE fit {mle:?} for {counts:?}");
            assert!(moments.is_valid(), "moment fit {moments:?} for {counts:?}");
            assert!(mle.shape <= MAX_SHAPE && moments.shape <= MAX_SHAPE);
        }
    }

    #[test]
    fn test_mle_solves_profile_equation() {
        let counts = row(&[(2, 5), (4, 20), (6, 30), (8, 20), (11, 5)]);
        let fit = fit_mle(&counts);

        let n: f64 = counts.iter().map(|&c| f64::from(c)).sum();
        let weighted = |f: &dyn Fn(f64) -> f64| -> f64 {
            counts
                .iter()
                .enumerate()
                .map(|(k, &c)| f64::from(c) * f(bin_center(k)))
                .sum()
        };
        let s0 = weighted(&|x| x.powf(fit.shape));
        let s1 = weighted(&|x| x.powf(fit.shape) * x.ln());
        let mean_log = weighted(&f64::ln) / n;

        assert!((s1 / s0 - 1.0 / fit.shape - mean_log).abs() < 1e-8);
        assert!((fit.scale - (s0 / n).powf(1.0 / fit.shape)).abs() < 1e-9);
    }

    #[test]
    fn test_cdf_bounds() {
        let fit = WeibullFit::new(2.0, 8.0);
        assert_eq!(fit.cdf(0.0), 0.0);
        assert!((fit.cdf(8.0) - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert!(fit.cdf(100.0) > 0.999_999);
        assert!((fit.mean() - 8.0 * 0.886_226_925_452_758).abs() < 1e-9);
    }
}
