use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use tracing::debug;

use super::error::{Result, invalid, require_finite, require_len};
use super::random::{RandomSource, derive_seed, generate_normal};
use super::stats::{mean, percentile, population_std_dev};
use super::types::{ConfidenceInterval, Percentiles, SimulationParameters, SimulationResult};

const MIN_HISTORY: usize = 2;

/// Compounds `params.time_horizon_months` normal monthly returns onto the
/// historical mean, once per iteration, and summarises the outcomes.
pub fn monte_carlo_simulation<S: RandomSource + ?Sized>(
    historical_data: &[f64],
    params: &SimulationParameters,
    source: &mut S,
) -> Result<SimulationResult> {
    let (start, volatility) = prepare(historical_data, params)?;
    debug!(
        iterations = params.iterations,
        horizon = params.time_horizon_months,
        history = historical_data.len(),
        "running monte carlo simulation"
    );

    let mut scenarios = Vec::with_capacity(params.iterations as usize);
    for _ in 0..params.iterations {
        scenarios.push(simulate_path(
            start,
            volatility,
            params.time_horizon_months,
            source,
        ));
    }

    summarize(scenarios, params.confidence_level)
}

/// Parallel variant: trial `k` draws from its own generator seeded from
/// `(seed, k)`, so the result depends only on `seed`, not on thread count.
pub fn monte_carlo_simulation_seeded(
    historical_data: &[f64],
    params: &SimulationParameters,
    seed: u64,
) -> Result<SimulationResult> {
    let (start, volatility) = prepare(historical_data, params)?;
    debug!(
        iterations = params.iterations,
        horizon = params.time_horizon_months,
        history = historical_data.len(),
        seed,
        "running seeded monte carlo simulation"
    );

    let scenarios = (0..params.iterations)
        .into_par_iter()
        .map(|trial| {
            let mut rng = SmallRng::seed_from_u64(derive_seed(seed, trial as u64));
            simulate_path(start, volatility, params.time_horizon_months, &mut rng)
        })
        .collect::<Vec<_>>();

    summarize(scenarios, params.confidence_level)
}

fn prepare(historical_data: &[f64], params: &SimulationParameters) -> Result<(f64, f64)> {
    require_len("monte carlo simulation", historical_data.len(), MIN_HISTORY)?;
    validate_params(params)?;
    for &value in historical_data {
        require_finite("historical value", value)?;
    }

    let start = mean(historical_data);
    let volatility = params
        .volatility
        .unwrap_or_else(|| population_std_dev(historical_data));
    Ok((start, volatility))
}

fn validate_params(params: &SimulationParameters) -> Result<()> {
    if params.iterations == 0 {
        return Err(invalid("iterations must be positive"));
    }
    if params.time_horizon_months == 0 {
        return Err(invalid("timeHorizonMonths must be positive"));
    }
    if let Some(volatility) = params.volatility {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(invalid(format!(
                "volatility must be a non-negative number, got {volatility}"
            )));
        }
    }
    let cl = params.confidence_level;
    if !(cl > 0.0 && cl < 1.0) {
        return Err(invalid(format!(
            "confidenceLevel must be within (0, 1), got {cl}"
        )));
    }
    Ok(())
}

fn simulate_path<S: RandomSource + ?Sized>(
    start: f64,
    volatility: f64,
    months: u32,
    source: &mut S,
) -> f64 {
    let mut value = start;
    for _ in 0..months {
        let r = generate_normal(source, 0.0, volatility);
        value *= 1.0 + r;
    }
    value
}

fn summarize(mut scenarios: Vec<f64>, confidence_level: f64) -> Result<SimulationResult> {
    scenarios.sort_by(|a, b| a.total_cmp(b));

    let tail = (1.0 - confidence_level) / 2.0;
    let percentiles = Percentiles {
        p10: percentile(&scenarios, 0.10)?,
        p25: percentile(&scenarios, 0.25)?,
        p75: percentile(&scenarios, 0.75)?,
        p90: percentile(&scenarios, 0.90)?,
        p95: percentile(&scenarios, 0.95)?,
        p99: percentile(&scenarios, 0.99)?,
    };
    let confidence_interval = ConfidenceInterval {
        lower: percentile(&scenarios, tail)?,
        upper: percentile(&scenarios, 1.0 - tail)?,
    };

    Ok(SimulationResult {
        mean: mean(&scenarios),
        median: percentile(&scenarios, 0.5)?,
        percentiles,
        confidence_interval,
        scenarios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ForecastError;
    use crate::core::random::CyclingSource;
    use proptest::collection::vec;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};
    use rand::rngs::StdRng;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn history() -> Vec<f64> {
        vec![10_000.0, 10_400.0, 9_800.0, 10_900.0, 11_200.0, 10_700.0]
    }

    #[test]
    fn rejects_short_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = monte_carlo_simulation(&[100.0], &SimulationParameters::new(10, 12), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 2,
                actual: 1,
                ..
            }
        ));
        assert!(monte_carlo_simulation_seeded(&[], &SimulationParameters::new(10, 12), 1).is_err());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = history();
        for params in [
            SimulationParameters::new(0, 12),
            SimulationParameters::new(10, 0),
            SimulationParameters::new(10, 12).with_volatility(-0.1),
            SimulationParameters::new(10, 12).with_confidence_level(1.0),
            SimulationParameters::new(10, 12).with_confidence_level(0.0),
        ] {
            let err = monte_carlo_simulation(&data, &params, &mut rng).unwrap_err();
            assert!(
                matches!(err, ForecastError::InvalidParameter(_)),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn constant_history_with_zero_volatility_is_degenerate() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = SimulationParameters::new(50, 24).with_volatility(0.0);
        let result = monte_carlo_simulation(&[250.0, 250.0, 250.0], &params, &mut rng).unwrap();

        assert_eq!(result.scenarios.len(), 50);
        assert!(result.scenarios.iter().all(|&v| v == 250.0));
        assert_eq!(result.mean, 250.0);
        assert_eq!(result.median, 250.0);
        assert_eq!(result.confidence_interval.lower, 250.0);
        assert_eq!(result.percentiles.p99, 250.0);
    }

    #[test]
    fn fixed_uniform_sequence_gives_hand_calculated_paths() {
        // Each normal draw is exactly +1 (r = 1, cos 0 = 1), so each month
        // multiplies by 1 + volatility.
        let mut source = CyclingSource::new(&[(-0.5_f64).exp(), 0.0]);
        let params = SimulationParameters::new(3, 2).with_volatility(0.1);
        let result = monte_carlo_simulation(&[90.0, 110.0], &params, &mut source).unwrap();

        for &v in &result.scenarios {
            assert_approx_tol(v, 100.0 * 1.1 * 1.1, 1e-9);
        }
        assert_approx_tol(result.mean, 121.0, 1e-9);
    }

    #[test]
    fn volatility_defaults_to_population_std_dev_of_history() {
        // History std dev is 10 → monthly r = ±10 with the same draw sequence.
        let mut source = CyclingSource::new(&[(-0.5_f64).exp(), 0.5]);
        let params = SimulationParameters::new(1, 1);
        let result = monte_carlo_simulation(&[90.0, 110.0], &params, &mut source).unwrap();
        assert_approx_tol(result.scenarios[0], 100.0 * (1.0 - 10.0), 1e-9);
    }

    #[test]
    fn summary_statistics_are_ordered() {
        let mut rng = StdRng::seed_from_u64(77);
        let params = SimulationParameters::new(2_000, 12).with_volatility(0.03);
        let result = monte_carlo_simulation(&history(), &params, &mut rng).unwrap();
        let p = result.percentiles;

        assert!(p.p10 <= p.p25 && p.p25 <= result.median && result.median <= p.p75);
        assert!(p.p75 <= p.p90 && p.p90 <= p.p95 && p.p95 <= p.p99);
        assert!(result.confidence_interval.lower <= result.median);
        assert!(result.confidence_interval.upper >= result.median);
        assert!(result.confidence_interval.lower >= result.scenarios[0]);
    }

    #[test]
    fn small_volatility_keeps_mean_near_history_mean() {
        let mut rng = StdRng::seed_from_u64(11);
        let data = history();
        let params = SimulationParameters::new(4_000, 6).with_volatility(0.01);
        let result = monte_carlo_simulation(&data, &params, &mut rng).unwrap();
        let start = mean(&data);
        assert_approx_tol(result.mean, start, start * 0.01);
    }

    #[test]
    fn confidence_interval_follows_confidence_level() {
        let params = SimulationParameters::new(1_000, 12)
            .with_volatility(0.05)
            .with_confidence_level(0.8);
        let result = monte_carlo_simulation_seeded(&history(), &params, 3).unwrap();
        let tail = (1.0 - 0.8) / 2.0;
        assert_eq!(
            result.confidence_interval.lower,
            percentile(&result.scenarios, tail).unwrap()
        );
        assert_eq!(
            result.confidence_interval.upper,
            percentile(&result.scenarios, 1.0 - tail).unwrap()
        );
        let spread = result.scenarios[result.scenarios.len() - 1] - result.scenarios[0];
        assert_approx_tol(
            result.confidence_interval.lower,
            percentile(&result.scenarios, 0.1).unwrap(),
            spread * 1e-9,
        );
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let params = SimulationParameters::new(500, 12).with_volatility(0.04);
        let a = monte_carlo_simulation_seeded(&history(), &params, 42).unwrap();
        let b = monte_carlo_simulation_seeded(&history(), &params, 42).unwrap();
        let c = monte_carlo_simulation_seeded(&history(), &params, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.scenarios, c.scenarios);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_scenarios_have_requested_count_and_are_sorted(
            data in vec(1.0f64..50_000.0, 2..24),
            iterations in 1u32..300,
            horizon in 1u32..36,
            vol_bp in 0u32..800,
            seed in any::<u64>(),
        ) {
            let params = SimulationParameters::new(iterations, horizon)
                .with_volatility(vol_bp as f64 / 10_000.0);
            let result = monte_carlo_simulation_seeded(&data, &params, seed).unwrap();

            prop_assert_eq!(result.scenarios.len(), iterations as usize);
            prop_assert!(result.scenarios.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(result.scenarios.iter().all(|v| v.is_finite()));
        }
    }
}
