//! Replicate simulation and pool construction integration tests.

mod common;

use faer::Col;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use collinsim::prelude::*;
use common::small_config;

// ============================================================================
// The baseline scenario: 3 predictors, 50 rows, known coefficients
// ============================================================================

#[test]
fn test_fifty_row_replicate_from_three_predictors() {
    let mut generation_rng = ChaCha8Rng::seed_from_u64(123);
    let correlation =
        generate_correlation(0.0, 3, 100, 6, &mut generation_rng).expect("generates");

    let betas = CoefficientVector::from_values(Col::from_fn(3, |j| [0.8, -0.1, 0.6][j]), 1.0);

    let mut sample_rng = ChaCha8Rng::seed_from_u64(123);
    let replicate =
        simulate_replicate(50, &correlation, &betas, &mut sample_rng).expect("simulates");

    // 50 rows; one response column plus three named predictors.
    assert_eq!(replicate.n_rows(), 50);
    assert_eq!(replicate.n_predictors(), 3);
    assert_eq!(replicate.column_names(), ["X1", "X2", "X3"]);

    let response = replicate.response();
    assert!(response.iter().all(|v| v.is_finite()));
    let first = response[0];
    assert!((1..50).any(|i| (response[i] - first).abs() > 1e-12));
}

#[test]
fn test_same_seed_gives_bit_identical_replicates() {
    let mut generation_rng = ChaCha8Rng::seed_from_u64(31);
    let correlation =
        generate_correlation(1.7, 5, 100, 6, &mut generation_rng).expect("generates");
    let mut coefficient_rng = ChaCha8Rng::seed_from_u64(32);
    let betas = CoefficientVector::generate(1, 3, 1, 1.0, &mut coefficient_rng);

    let mut first_rng = ChaCha8Rng::seed_from_u64(99);
    let mut second_rng = ChaCha8Rng::seed_from_u64(99);
    let first = simulate_replicate(40, &correlation, &betas, &mut first_rng).expect("simulates");
    let second = simulate_replicate(40, &correlation, &betas, &mut second_rng).expect("simulates");

    for i in 0..40 {
        assert_eq!(first.response()[i], second.response()[i]);
        for j in 0..5 {
            assert_eq!(first.predictors()[(i, j)], second.predictors()[(i, j)]);
        }
    }
}

#[test]
fn test_dimension_mismatch_is_fatal() {
    let mut generation_rng = ChaCha8Rng::seed_from_u64(5);
    let correlation =
        generate_correlation(0.0, 4, 100, 6, &mut generation_rng).expect("generates");
    let betas = CoefficientVector::from_values(Col::zeros(7), 1.0);

    let mut sample_rng = ChaCha8Rng::seed_from_u64(5);
    let result = simulate_replicate(10, &correlation, &betas, &mut sample_rng);

    assert!(matches!(
        result,
        Err(SimulationError::DimensionMismatch {
            matrix_dim: 4,
            n_coefficients: 7
        })
    ));
}

// ============================================================================
// Pools
// ============================================================================

#[test]
fn test_pools_follow_the_study_dimensions() {
    let config = small_config();
    let pools = common::regime_pools(1.7, RegimeLabel::Moderate, &config, 8);

    assert_eq!(pools.training.len(), config.train_replicates);
    assert_eq!(pools.training.rows_per_replicate(), config.train_rows);
    assert_eq!(pools.testing.len(), config.test_replicates);
    assert_eq!(pools.testing.rows_per_replicate(), config.test_rows);
    assert_eq!(pools.training.label(), RegimeLabel::Moderate);

    for replicate in pools.training.replicates() {
        assert_eq!(replicate.n_rows(), config.train_rows);
        assert_eq!(replicate.n_predictors(), config.n_predictors());
    }
    for replicate in pools.testing.replicates() {
        assert_eq!(replicate.n_rows(), config.test_rows);
    }
}

#[test]
fn test_replicates_within_a_pool_are_independent_draws() {
    let config = small_config();
    let pools = common::regime_pools(0.0, RegimeLabel::Low, &config, 21);
    let replicates = pools.training.replicates();

    // Two replicates from the same pool must differ.
    let a = &replicates[0];
    let b = &replicates[1];
    let identical = (0..a.n_rows()).all(|i| a.response()[i] == b.response()[i]);
    assert!(!identical, "distinct replicates should not repeat draws");
}
