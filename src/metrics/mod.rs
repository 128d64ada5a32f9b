//! Metric evaluation for batches of fitted models.

mod aggregate;

pub use aggregate::{
    summarize, summarize_strategy, MetricSummary, RegimeSummary, StrategySummary,
};

use faer::Col;
use rayon::prelude::*;

use crate::fit::BatchFit;
use crate::simulate::ReplicatePool;

/// Metrics for one (strategy, replicate) fit.
#[derive(Debug, Clone)]
pub struct MetricRecord {
    /// Index of the training replicate this model was fit on.
    pub replicate_index: usize,
    /// RMSE against the fitting replicate itself.
    pub train_rmse: f64,
    /// RMSE against every replicate of the regime's testing pool, in pool
    /// order. Means are taken at aggregation time, not here.
    pub test_rmse: Vec<f64>,
    /// Parameter count at the relaxed significance level (non-zero count for
    /// penalized fits).
    pub parameter_count: usize,
    /// Parameter count at the strict significance level (same non-zero count
    /// for penalized fits).
    pub strict_parameter_count: usize,
}

/// Root mean squared error: sqrt(Σ(yᵢ − ŷᵢ)² / n).
pub fn rmse(observed: &Col<f64>, predicted: &Col<f64>) -> f64 {
    let n = observed.nrows();
    if n == 0 {
        return f64::NAN;
    }
    let sum_sq: f64 = (0..n).map(|i| (observed[i] - predicted[i]).powi(2)).sum();
    (sum_sq / n as f64).sqrt()
}

/// Score every successful fit of a batch.
///
/// Each fitted model is evaluated against its own training replicate and
/// against **every** replicate of the testing pool: a model fit on training
/// replicate i is scored for generality across the whole held-out pool, not
/// only a matched index. Scoring is independent per model and runs in
/// parallel; record order follows replicate order.
pub fn evaluate_batch(
    batch: &BatchFit,
    training: &ReplicatePool,
    testing: &ReplicatePool,
    relaxed_significance: f64,
    strict_significance: f64,
) -> Vec<MetricRecord> {
    batch
        .models
        .par_iter()
        .enumerate()
        .filter_map(|(index, model)| {
            let model = model.as_ref()?;
            let train_replicate = &training.replicates()[index];

            let train_predictions = model.predict(train_replicate.predictors());
            let train_rmse = rmse(train_replicate.response(), &train_predictions);

            let test_rmse = testing
                .replicates()
                .iter()
                .map(|test_replicate| {
                    let predictions = model.predict(test_replicate.predictors());
                    rmse(test_replicate.response(), &predictions)
                })
                .collect();

            Some(MetricRecord {
                replicate_index: index,
                train_rmse,
                test_rmse,
                parameter_count: model.parameter_count(relaxed_significance),
                strict_parameter_count: model.parameter_count(strict_significance),
            })
        })
        .collect()
}
