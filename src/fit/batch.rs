//! Batch fitting: one strategy applied to every replicate in a pool.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::StudyConfig;
use crate::fit::{
    fit_least_squares, fit_tuned, FitError, FitFailure, FittedEstimator, FittedModel,
    FittedRepresentation,
};
use crate::simulate::{Replicate, ReplicatePool};
use crate::strategies::{
    Estimator, PartialLeastSquares, PrincipalComponents, Representation, Strategy,
};

/// The outcome of fitting a strategy across a pool: one slot per replicate,
/// index-aligned with the pool, plus the isolated failures.
#[derive(Debug)]
pub struct BatchFit {
    pub strategy: Strategy,
    /// `models[i]` is the fit of replicate `i`, or `None` when it failed.
    pub models: Vec<Option<FittedModel>>,
    pub failures: Vec<FitFailure>,
}

impl BatchFit {
    /// Successful fits with their replicate indices, in pool order.
    pub fn successes(&self) -> impl Iterator<Item = (usize, &FittedModel)> {
        self.models
            .iter()
            .enumerate()
            .filter_map(|(index, model)| model.as_ref().map(|m| (index, m)))
    }
}

/// Fit `strategy` to every replicate of the pool.
///
/// Replicates are independent, so fitting runs in parallel; results are
/// collected index-stable. A replicate whose representation or estimation
/// fails is recorded as a `FitFailure` and never aborts its siblings.
/// `fold_seed` feeds the per-replicate fold-assignment generators of
/// cross-validated strategies.
pub fn fit_all(
    pool: &ReplicatePool,
    strategy: &Strategy,
    config: &StudyConfig,
    fold_seed: u64,
) -> BatchFit {
    let results: Vec<Result<FittedModel, FitFailure>> = pool
        .replicates()
        .par_iter()
        .enumerate()
        .map(|(index, replicate)| {
            fit_one(replicate, strategy, config, fold_seed, index).map_err(|cause| FitFailure {
                replicate_index: index,
                cause,
            })
        })
        .collect();

    let mut models = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(model) => models.push(Some(model)),
            Err(failure) => {
                log::warn!("{}: {}", strategy.name, failure);
                models.push(None);
                failures.push(failure);
            }
        }
    }

    BatchFit {
        strategy: *strategy,
        models,
        failures,
    }
}

fn fit_one(
    replicate: &Replicate,
    strategy: &Strategy,
    config: &StudyConfig,
    fold_seed: u64,
    index: usize,
) -> Result<FittedModel, FitError> {
    let x = replicate.predictors();
    let y = replicate.response();

    let (representation, scores) = match strategy.representation {
        Representation::Identity => (FittedRepresentation::Identity, x.clone()),
        Representation::PrincipalComponents { variance_threshold } => {
            let pca = PrincipalComponents::fit(x, variance_threshold)?;
            let scores = pca.transform(x);
            (FittedRepresentation::PrincipalComponents(pca), scores)
        }
        Representation::PartialLeastSquares { n_components } => {
            let pls = PartialLeastSquares::fit(x, y, n_components)?;
            let scores = pls.transform(x);
            (FittedRepresentation::PartialLeastSquares(pls), scores)
        }
    };

    let estimator = match strategy.estimator {
        Estimator::LeastSquares => FittedEstimator::LeastSquares(fit_least_squares(&scores, y)?),
        Estimator::CrossValidatedLasso => {
            // seed_from_u64 mixes, so nearby per-replicate seeds give
            // independent fold streams.
            let mut rng = ChaCha8Rng::seed_from_u64(fold_seed.wrapping_add(index as u64));
            FittedEstimator::Lasso(fit_tuned(
                &scores,
                y,
                &config.penalty_grid,
                config.k_folds,
                config.lasso_max_iterations,
                config.lasso_tolerance,
                &mut rng,
            )?)
        }
    };

    Ok(FittedModel::new(*strategy, representation, estimator))
}
