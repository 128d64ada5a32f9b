//! Common test utilities: small study configurations and simulated pools.

#![allow(dead_code)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use collinsim::prelude::*;

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small but complete configuration: 6 predictors in tiers of 2, three
/// regimes with well-separated shapes, compact pools, a short penalty grid.
pub fn small_config() -> StudyConfig {
    StudyConfig::builder()
        .tier_sizes(2, 2, 2)
        .regimes(vec![
            RegimeShapeSpec {
                label: RegimeLabel::Low,
                shape: 0.0,
            },
            RegimeShapeSpec {
                label: RegimeLabel::Moderate,
                shape: 1.7,
            },
            RegimeShapeSpec {
                label: RegimeLabel::High,
                shape: 4.0,
            },
        ])
        .training_pool(6, 40)
        .testing_pool(4, 12)
        .k_folds(4)
        .penalty_grid(vec![1e-3, 1e-2, 1e-1])
        .build()
        .expect("small config is valid")
}

/// Generate one regime's pools directly, without running the full study.
pub fn regime_pools(
    shape: f64,
    label: RegimeLabel,
    config: &StudyConfig,
    seed: u64,
) -> RegimePools {
    let n_predictors = config.n_predictors();

    let mut generation_rng = ChaCha8Rng::seed_from_u64(seed);
    let correlation = generate_correlation(
        shape,
        n_predictors,
        config.max_generation_attempts,
        config.correlation_decimals,
        &mut generation_rng,
    )
    .expect("correlation generation should succeed");

    let mut coefficient_rng = ChaCha8Rng::seed_from_u64(seed ^ 0xc0ffee);
    let coefficients = CoefficientVector::generate(
        config.n_large_negative,
        config.n_small,
        config.n_large_positive,
        config.intercept,
        &mut coefficient_rng,
    );

    let specs = vec![RegimeSpec {
        regime: Regime {
            label,
            shape,
            correlation,
        },
        train_count: config.train_replicates,
        train_rows: config.train_rows,
        test_count: config.test_replicates,
        test_rows: config.test_rows,
    }];

    let mut train_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x7ea);
    let mut test_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x7e57);
    build_pools(specs, &coefficients, &mut train_rng, &mut test_rng)
        .expect("pool construction should succeed")
        .remove(0)
}

/// Find a strategy by name in the registry.
pub fn strategy_named(config: &StudyConfig, name: &str) -> Strategy {
    registry(config)
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("strategy {name} should exist"))
}
