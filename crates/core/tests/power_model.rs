use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wind_site_core::weibull::{bin_speeds, sample_weibull, MAX_SHAPE};
use wind_site_core::{fit_mle, fit_moments, WeibullFactors, WeibullFit, Windmill};

#[test]
fn test_produced_power_non_decreasing_up_to_30_ms() {
    for blade_length in [10.0, 40.0, 75.0] {
        let windmill = Windmill::new(100.0, blade_length, 4.0, 20.0).unwrap();
        let powers: Vec<f64> = (0..=3000)
            .map(|step| windmill.produced_power(f64::from(step) * 0.01))
            .collect();
        assert!(powers.windows(2).all(|pair| pair[1] >= pair[0]));
    }
}

#[test]
fn test_fits_positive_or_sentinel() {
    let mut rng = StdRng::seed_from_u64(2024);
    for (shape, scale) in [(1.2, 4.0), (2.0, 7.0), (3.5, 12.0)] {
        let counts = bin_speeds(&sample_weibull(shape, scale, 5_000, &mut rng));
        for fit in [fit_mle(&counts), fit_moments(&counts)] {
            assert!(fit.shape > 0.0 && fit.scale > 0.0);
            assert!(fit.shape <= MAX_SHAPE);
        }
    }

    let empty = vec![0u32; 40];
    assert_eq!(fit_mle(&empty), WeibullFit::SENTINEL);
    assert_eq!(fit_moments(&empty), WeibullFit::SENTINEL);
}

#[test]
fn test_theoretical_power_matches_closed_form() {
    // E[v³] = λ³·Γ(1 + 3/k); for k = 2: Γ(2.5) = 1.329340388
    let windmill = Windmill::with_default_speeds(90.0, 45.0).unwrap();
    let fit = WeibullFit::new(2.0, 7.0);
    let expected = windmill.produced_power(1.0) * 7.0f64.powi(3) * 1.329_340_388;

    let factors = WeibullFactors::uniform(1, 1, fit);
    let power = windmill.theoretical_power(&factors);
    assert_relative_eq!(power[(0, 0)], expected, max_relative = 0.01);
}
