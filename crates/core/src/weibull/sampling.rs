//! Synthetic Weibull samples for validating the estimators

use crate::history::{speed_class, SPEED_CLASSES};
use rand::Rng;

/// Draw `n` speeds from a Weibull distribution by inverting its CDF
///
/// `x = λ·(−ln(1 − u))^(1/k)` with `u` uniform on `[0, 1)`.
pub fn sample_weibull<R: Rng + ?Sized>(shape: f64, scale: f64, n: usize, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u: f64 = rng.random();
            scale * (-(1.0 - u).ln()).powf(1.0 / shape)
        })
        .collect()
}

/// Speed-class histogram of raw speeds, binned like the aggregator
pub fn bin_speeds(speeds: &[f64]) -> Vec<u32> {
    let mut counts = vec![0; SPEED_CLASSES];
    for &speed in speeds {
        counts[speed_class(speed).0] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weibull::{fit_mle, fit_moments};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mle_recovers_known_parameters() {
        let mut rng = StdRng::seed_from_u64(42);
        for (shape, scale) in [(2.0, 8.0), (2.5, 10.0), (1.6, 6.0)] {
            let counts = bin_speeds(&sample_weibull(shape, scale, 200_000, &mut rng));
            let fit = fit_mle(&counts);
            assert!(
                (fit.shape - shape).abs() < 0.1,
                "shape {} vs {shape}",
                fit.shape
            );
            assert!(
                (fit.scale - scale).abs() < 0.2,
                "scale {} vs {scale}",
                fit.scale
            );
        }
    }

    #[test]
    fn test_moment_scale_tracks_sample_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let speeds = sample_weibull(2.0, 8.0, 50_000, &mut rng);
        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        let fit = fit_moments(&bin_speeds(&speeds));

        assert!(fit.is_valid());
        // Γ(1 + 1/k)^(1/k) is close to one for the shapes the moment relation yields
        assert!((fit.scale - mean).abs() / mean < 0.1, "{fit:?} vs mean {mean}");
    }

    #[test]
    fn test_samples_are_non_negative_and_seeded() {
        let a = sample_weibull(2.0, 8.0, 100, &mut StdRng::seed_from_u64(3));
        let b = sample_weibull(2.0, 8.0, 100, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| v >= 0.0));
    }
}
