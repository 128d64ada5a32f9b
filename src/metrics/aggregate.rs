//! Aggregation of per-replicate metrics into summary statistics.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::core::RegimeLabel;
use crate::metrics::MetricRecord;

/// Summary of one metric vector: the mean, and a Student-t confidence
/// interval on the mean when one could be computed.
///
/// When the interval computation fails (zero variance, a single observation,
/// or a degenerate t quantile), the summary falls back to the plain mean with
/// `fell_back` set. The fallback is provenance, not an error.
#[derive(Debug, Clone, Copy)]
pub struct MetricSummary {
    pub mean: f64,
    pub interval: Option<(f64, f64)>,
    pub fell_back: bool,
    pub n: usize,
}

/// Per-strategy metric summaries for one regime.
#[derive(Debug, Clone)]
pub struct StrategySummary {
    pub strategy: &'static str,
    pub train_rmse: MetricSummary,
    pub test_rmse: MetricSummary,
    pub parameter_count: MetricSummary,
    pub strict_parameter_count: MetricSummary,
}

/// All strategy summaries of one regime, in registry order.
#[derive(Debug, Clone)]
pub struct RegimeSummary {
    pub label: RegimeLabel,
    pub strategies: Vec<StrategySummary>,
}

/// Summarize a metric vector with a mean confidence interval at the given
/// level, falling back to the plain mean when the interval is not computable.
///
/// A zero-variance vector returns its constant value exactly.
pub fn summarize(values: &[f64], confidence_level: f64) -> MetricSummary {
    let n = values.len();
    if n == 0 {
        return MetricSummary {
            mean: f64::NAN,
            interval: None,
            fell_back: true,
            n,
        };
    }

    let first = values[0];
    if values.iter().all(|&v| v == first) {
        // Degenerate vector: report the constant itself.
        return MetricSummary {
            mean: first,
            interval: None,
            fell_back: true,
            n,
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 || !mean.is_finite() {
        return MetricSummary {
            mean,
            interval: None,
            fell_back: true,
            n,
        };
    }

    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_error = (variance / n as f64).sqrt();
    if !(std_error > 0.0) || !std_error.is_finite() {
        return MetricSummary {
            mean,
            interval: None,
            fell_back: true,
            n,
        };
    }

    let df = (n - 1) as f64;
    let interval = StudentsT::new(0.0, 1.0, df).ok().and_then(|t_dist| {
        let alpha = 1.0 - confidence_level;
        let t_crit = t_dist.inverse_cdf(1.0 - alpha / 2.0);
        if t_crit.is_finite() {
            Some((mean - t_crit * std_error, mean + t_crit * std_error))
        } else {
            None
        }
    });

    MetricSummary {
        mean,
        fell_back: interval.is_none(),
        interval,
        n,
    }
}

/// Collapse one strategy's records into display summaries.
///
/// Train RMSE and parameter counts summarize one value per training
/// replicate; test RMSE summarizes the flattened cross-evaluation (every
/// fitted model against every test replicate).
pub fn summarize_strategy(
    strategy: &'static str,
    records: &[MetricRecord],
    confidence_level: f64,
) -> StrategySummary {
    let train: Vec<f64> = records.iter().map(|r| r.train_rmse).collect();
    let test: Vec<f64> = records
        .iter()
        .flat_map(|r| r.test_rmse.iter().copied())
        .collect();
    let parameters: Vec<f64> = records.iter().map(|r| r.parameter_count as f64).collect();
    let strict: Vec<f64> = records
        .iter()
        .map(|r| r.strict_parameter_count as f64)
        .collect();

    StrategySummary {
        strategy,
        train_rmse: summarize(&train, confidence_level),
        test_rmse: summarize(&test, confidence_level),
        parameter_count: summarize(&parameters, confidence_level),
        strict_parameter_count: summarize(&strict, confidence_level),
    }
}
