//! A Monte Carlo simulation study of regression strategies under
//! multicollinearity.
//!
//! The crate simulates datasets from a known linear model under controlled
//! predictor-correlation regimes, fits seven competing modeling strategies
//! (plain and L1-regularized least squares over identity, principal-component,
//! and partial-least-squares feature representations), and aggregates
//! train/test RMSE and parameter-count metrics into per-regime comparison
//! tables.
//!
//! # Example
//!
//! ```rust,ignore
//! use collinsim::prelude::*;
//!
//! let config = StudyConfig::builder().build()?;
//! let ctx = ExecutionContext::new(20240117)?;
//! let report = run_study(&config, &ctx)?;
//!
//! for regime in &report.regimes {
//!     for outcome in &regime.strategies {
//!         println!(
//!             "{} / {}: test RMSE {:.3}",
//!             regime.label,
//!             outcome.strategy.name,
//!             outcome.summary.test_rmse.mean
//!         );
//!     }
//! }
//! ```

pub mod core;
pub mod diagnostics;
pub mod fit;
pub mod metrics;
pub mod simulate;
pub mod strategies;
pub mod study;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        default_penalty_grid, ConfigError, ContextError, ExecutionContext, RegimeShapeSpec, Stage,
        StudyConfig,
    };
    pub use crate::diagnostics::variance_inflation_factor;
    pub use crate::fit::{
        fit_all, BatchFit, FitError, FitFailure, FittedEstimator, FittedModel,
        FittedRepresentation,
    };
    pub use crate::metrics::{
        evaluate_batch, rmse, summarize, summarize_strategy, MetricRecord, MetricSummary,
        RegimeSummary, StrategySummary,
    };
    pub use crate::simulate::{
        build_pools, generate_correlation, simulate_replicate, CoefficientVector,
        CorrelationMatrix, Regime, RegimeLabel, RegimePools, RegimeSpec, Replicate, ReplicatePool,
        SimulationError,
    };
    pub use crate::strategies::{
        registry, Estimator, PartialLeastSquares, PrincipalComponents, Representation,
        RepresentationError, Strategy,
    };
    pub use crate::study::{
        run_study, RegimeDiagnostics, RegimeReport, StrategyOutcome, StudyError, StudyReport,
    };
}
