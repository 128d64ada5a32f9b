//! Aggregation integration tests: t-interval summaries and the degeneracy
//! fallback.

mod common;

use collinsim::prelude::*;

#[test]
fn test_zero_variance_vector_reports_the_constant_exactly() {
    // The designed degeneracy policy: when the interval cannot be computed,
    // the summary is the plain mean, and for a constant vector that mean is
    // the constant itself, exactly.
    let values = [3.25; 50];
    let summary = summarize(&values, 0.99);

    assert!(summary.fell_back);
    assert!(summary.interval.is_none());
    assert_eq!(summary.mean, 3.25);
    assert_eq!(summary.n, 50);
}

#[test]
fn test_varying_vector_gets_an_interval() {
    let values: Vec<f64> = (0..40).map(|i| 1.0 + (i as f64) * 0.1).collect();
    let summary = summarize(&values, 0.99);

    assert!(!summary.fell_back);
    let (lower, upper) = summary.interval.expect("interval computed");
    assert!(lower < summary.mean && summary.mean < upper);
}

#[test]
fn test_interval_narrows_with_more_observations() {
    let few: Vec<f64> = (0..8).map(|i| (i as f64 * 0.77).sin()).collect();
    let many: Vec<f64> = (0..200).map(|i| (i as f64 * 0.77).sin()).collect();

    let few_summary = summarize(&few, 0.99);
    let many_summary = summarize(&many, 0.99);

    let width = |s: &MetricSummary| {
        let (lower, upper) = s.interval.expect("interval computed");
        upper - lower
    };
    assert!(width(&many_summary) < width(&few_summary));
}

#[test]
fn test_strategy_summary_collapses_per_replicate_vectors() {
    let records = vec![
        MetricRecord {
            replicate_index: 0,
            train_rmse: 0.9,
            test_rmse: vec![1.0, 1.2, 1.4],
            parameter_count: 4,
            strict_parameter_count: 2,
        },
        MetricRecord {
            replicate_index: 1,
            train_rmse: 1.1,
            test_rmse: vec![1.3, 1.5, 1.1],
            parameter_count: 6,
            strict_parameter_count: 3,
        },
    ];

    let summary = summarize_strategy("lasso", &records, 0.99);

    assert_eq!(summary.strategy, "lasso");
    assert_eq!(summary.train_rmse.n, 2);
    // Test RMSE pools the full cross-evaluation.
    assert_eq!(summary.test_rmse.n, 6);
    assert!((summary.train_rmse.mean - 1.0).abs() < 1e-12);
    assert!((summary.parameter_count.mean - 5.0).abs() < 1e-12);
    assert!((summary.strict_parameter_count.mean - 2.5).abs() < 1e-12);
}
