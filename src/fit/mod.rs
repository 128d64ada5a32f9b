//! Model fitting: estimators, fitted models, and batch application.

mod batch;
mod lasso;
mod least_squares;

pub use batch::{fit_all, BatchFit};
pub use lasso::{fit_at, fit_tuned, LassoFit, TunedLassoFit};
pub use least_squares::LeastSquaresFit;
pub use least_squares::fit as fit_least_squares;

use faer::{Col, Mat};
use thiserror::Error;

use crate::strategies::{
    PartialLeastSquares, PrincipalComponents, RepresentationError, Strategy,
};

/// Errors raised while fitting one model to one replicate.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("dimension mismatch: predictors have {x_rows} rows but response has {y_len}")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("penalty grid is empty")]
    EmptyPenaltyGrid,

    #[error(transparent)]
    Representation(#[from] RepresentationError),
}

/// One replicate's fit could not be computed. Recoverable: the batch records
/// the failure and continues with its remaining replicates.
#[derive(Debug, Error)]
#[error("replicate {replicate_index}: {cause}")]
pub struct FitFailure {
    pub replicate_index: usize,
    #[source]
    pub cause: FitError,
}

/// A fitted feature representation, able to re-express new predictor rows
/// exactly as it re-expressed the training rows.
#[derive(Debug, Clone)]
pub enum FittedRepresentation {
    Identity,
    PrincipalComponents(PrincipalComponents),
    PartialLeastSquares(PartialLeastSquares),
}

impl FittedRepresentation {
    /// Apply the representation to predictor rows.
    pub fn transform(&self, x: &Mat<f64>) -> Mat<f64> {
        match self {
            FittedRepresentation::Identity => x.clone(),
            FittedRepresentation::PrincipalComponents(pca) => pca.transform(x),
            FittedRepresentation::PartialLeastSquares(pls) => pls.transform(x),
        }
    }
}

/// A fitted estimator over the represented predictors.
#[derive(Debug, Clone)]
pub enum FittedEstimator {
    LeastSquares(LeastSquaresFit),
    Lasso(TunedLassoFit),
}

/// The result of applying one strategy to one replicate: the fitted
/// representation and the fitted estimator, dispatched by tag.
#[derive(Debug, Clone)]
pub struct FittedModel {
    strategy: Strategy,
    representation: FittedRepresentation,
    estimator: FittedEstimator,
}

impl FittedModel {
    pub(crate) fn new(
        strategy: Strategy,
        representation: FittedRepresentation,
        estimator: FittedEstimator,
    ) -> Self {
        Self {
            strategy,
            representation,
            estimator,
        }
    }

    /// The strategy that produced this model.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The fitted representation.
    pub fn representation(&self) -> &FittedRepresentation {
        &self.representation
    }

    /// The fitted estimator.
    pub fn estimator(&self) -> &FittedEstimator {
        &self.estimator
    }

    /// Predict the response for raw predictor rows (the representation is
    /// applied first).
    pub fn predict(&self, predictors: &Mat<f64>) -> Col<f64> {
        let scores = self.representation.transform(predictors);
        match &self.estimator {
            FittedEstimator::LeastSquares(fit) => fit.predict(&scores),
            FittedEstimator::Lasso(tuned) => tuned.fit.predict(&scores),
        }
    }

    /// Parameter count at a significance level: significant coefficients for
    /// least-squares fits, non-zero coefficients for penalized fits (which
    /// ignore the level).
    pub fn parameter_count(&self, significance: f64) -> usize {
        match &self.estimator {
            FittedEstimator::LeastSquares(fit) => fit.significant_count(significance),
            FittedEstimator::Lasso(tuned) => tuned.fit.nonzero_count(),
        }
    }

    /// The cross-validated penalty, for penalized fits.
    pub fn selected_penalty(&self) -> Option<f64> {
        match &self.estimator {
            FittedEstimator::LeastSquares(_) => None,
            FittedEstimator::Lasso(tuned) => Some(tuned.selected_penalty()),
        }
    }
}
