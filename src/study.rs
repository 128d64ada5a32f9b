//! End-to-end orchestration of a simulation study.
//!
//! Wires the components together: regime generation, coefficient generation,
//! pool construction, batch fitting of every strategy against every regime,
//! metric evaluation, and aggregation. Every stochastic stage draws from its
//! own generator supplied by the execution context, so a run is fully
//! reproducible from its seed.

use thiserror::Error;

use crate::core::{ConfigError, ExecutionContext, RegimeLabel, Stage, StudyConfig};
use crate::diagnostics::variance_inflation_factor;
use crate::fit::{fit_all, FitFailure};
use crate::metrics::{
    evaluate_batch, summarize_strategy, MetricRecord, RegimeSummary, StrategySummary,
};
use crate::simulate::{
    build_pools, generate_correlation, CoefficientVector, Regime, RegimeSpec, SimulationError,
};
use crate::strategies::{registry, Strategy};

/// Errors that abort a study run. Per-replicate fit failures are not here:
/// they are isolated into the per-strategy failure reports.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Documentation data for one simulated regime: the raw off-diagonal
/// correlations (for histograms), their mean magnitude, and the variance
/// inflation factors of one representative training replicate.
#[derive(Debug, Clone)]
pub struct RegimeDiagnostics {
    pub off_diagonal: Vec<f64>,
    pub mean_absolute_correlation: f64,
    pub variance_inflation: Vec<f64>,
}

/// Everything one strategy produced under one regime: the per-replicate
/// metric records (raw vectors, for custom plotting), the isolated fit
/// failures, and the aggregated display summary.
#[derive(Debug)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub records: Vec<MetricRecord>,
    pub failures: Vec<FitFailure>,
    pub summary: StrategySummary,
}

/// All strategy outcomes of one regime.
#[derive(Debug)]
pub struct RegimeReport {
    pub label: RegimeLabel,
    pub shape: f64,
    pub diagnostics: RegimeDiagnostics,
    pub strategies: Vec<StrategyOutcome>,
}

/// The full output of a study run, regime by regime in configuration order.
#[derive(Debug)]
pub struct StudyReport {
    pub regimes: Vec<RegimeReport>,
}

impl StudyReport {
    /// The regime × strategy summary tables.
    pub fn summaries(&self) -> Vec<RegimeSummary> {
        self.regimes
            .iter()
            .map(|regime| RegimeSummary {
                label: regime.label,
                strategies: regime
                    .strategies
                    .iter()
                    .map(|outcome| outcome.summary.clone())
                    .collect(),
            })
            .collect()
    }

    /// Mean test RMSE by regime and strategy, flattened for plotting.
    pub fn test_rmse_means(&self) -> Vec<(RegimeLabel, &'static str, f64)> {
        self.regimes
            .iter()
            .flat_map(|regime| {
                regime.strategies.iter().map(move |outcome| {
                    (regime.label, outcome.strategy.name, outcome.summary.test_rmse.mean)
                })
            })
            .collect()
    }
}

/// Run the full study described by `config`.
pub fn run_study(
    config: &StudyConfig,
    ctx: &ExecutionContext,
) -> Result<StudyReport, StudyError> {
    config.validate()?;

    let p = config.n_predictors();

    let mut correlation_rng = ctx.stage_rng(Stage::Correlation);
    let mut regimes = Vec::with_capacity(config.regimes.len());
    for spec in &config.regimes {
        let correlation = generate_correlation(
            spec.shape,
            p,
            config.max_generation_attempts,
            config.correlation_decimals,
            &mut correlation_rng,
        )?;
        log::info!(
            "regime {} (shape {}): mean |r| = {:.3}",
            spec.label,
            spec.shape,
            correlation.mean_absolute_correlation()
        );
        regimes.push(Regime {
            label: spec.label,
            shape: spec.shape,
            correlation,
        });
    }

    let mut coefficient_rng = ctx.stage_rng(Stage::Coefficients);
    let coefficients = CoefficientVector::generate(
        config.n_large_negative,
        config.n_small,
        config.n_large_positive,
        config.intercept,
        &mut coefficient_rng,
    );

    let specs = regimes
        .into_iter()
        .map(|regime| RegimeSpec {
            regime,
            train_count: config.train_replicates,
            train_rows: config.train_rows,
            test_count: config.test_replicates,
            test_rows: config.test_rows,
        })
        .collect();

    let mut train_rng = ctx.stage_rng(Stage::Training);
    let mut test_rng = ctx.stage_rng(Stage::Testing);
    let pools = build_pools(specs, &coefficients, &mut train_rng, &mut test_rng)?;
    log::info!(
        "built {} training / {} testing replicates for {} regimes",
        config.train_replicates,
        config.test_replicates,
        pools.len()
    );

    let strategies = registry(config);

    let mut reports = Vec::with_capacity(pools.len());
    for (regime_index, regime_pools) in pools.iter().enumerate() {
        let regime = &regime_pools.regime;

        let diagnostics = RegimeDiagnostics {
            off_diagonal: regime.correlation.off_diagonal(),
            mean_absolute_correlation: regime.correlation.mean_absolute_correlation(),
            variance_inflation: regime_diagnostic_vif(regime_pools),
        };

        let mut outcomes = Vec::with_capacity(strategies.len());
        for (strategy_index, strategy) in strategies.iter().enumerate() {
            let fold_seed = ctx.derived_seed(
                Stage::Folds,
                (regime_index * strategies.len() + strategy_index) as u64,
            );

            let batch =
                ctx.install(|| fit_all(&regime_pools.training, strategy, config, fold_seed));
            let records = ctx.install(|| {
                evaluate_batch(
                    &batch,
                    &regime_pools.training,
                    &regime_pools.testing,
                    config.relaxed_significance,
                    config.strict_significance,
                )
            });
            let summary = summarize_strategy(strategy.name, &records, config.confidence_level);

            log::info!(
                "{} / {}: train {:.3}, test {:.3}, parameters {:.1}, {} failures",
                regime.label,
                strategy.name,
                summary.train_rmse.mean,
                summary.test_rmse.mean,
                summary.parameter_count.mean,
                batch.failures.len()
            );

            outcomes.push(StrategyOutcome {
                strategy: *strategy,
                records,
                failures: batch.failures,
                summary,
            });
        }

        reports.push(RegimeReport {
            label: regime.label,
            shape: regime.shape,
            diagnostics,
            strategies: outcomes,
        });
    }

    Ok(StudyReport { regimes: reports })
}

/// VIFs of the regime's first training replicate, as a representative
/// measurement of the collinearity the fitted models actually see.
fn regime_diagnostic_vif(pools: &crate::simulate::RegimePools) -> Vec<f64> {
    match pools.training.replicates().first() {
        Some(replicate) => {
            let vif = variance_inflation_factor(replicate.predictors());
            (0..vif.nrows()).map(|j| vif[j]).collect()
        }
        None => Vec::new(),
    }
}
