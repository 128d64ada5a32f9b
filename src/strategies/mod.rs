//! The modeling strategies compared by the study: a feature representation
//! paired with an estimator.

mod pca;
mod pls;

pub use pca::PrincipalComponents;
pub use pls::PartialLeastSquares;

use thiserror::Error;

use crate::core::StudyConfig;

/// Errors raised while fitting a feature representation.
#[derive(Debug, Error)]
pub enum RepresentationError {
    #[error("eigendecomposition did not converge")]
    EigenFailure,

    #[error("projection is degenerate: no informative component")]
    DegenerateProjection,

    #[error("too few rows: need at least {needed}, got {got}")]
    TooFewRows { needed: usize, got: usize },
}

/// How predictors are re-expressed before estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Representation {
    /// Use the raw predictor columns.
    Identity,
    /// Rotate onto principal components, keeping the minimal count whose
    /// cumulative explained variance reaches the threshold. A threshold of
    /// 1.0 or more keeps every component: a pure rotation whose least-squares
    /// fit reproduces the raw fit exactly. That configuration is deliberately
    /// representable because the study measures it.
    PrincipalComponents { variance_threshold: f64 },
    /// Outcome-supervised projection onto a fixed number of components.
    PartialLeastSquares { n_components: usize },
}

/// How the (represented) predictors are fit to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// Closed-form least squares.
    LeastSquares,
    /// L1-penalized least squares with the penalty chosen by k-fold
    /// cross-validation over the configured grid.
    CrossValidatedLasso,
}

/// A named (representation, estimator) pairing. Declared once, immutable.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub representation: Representation,
    pub estimator: Estimator,
}

impl Strategy {
    /// Whether this strategy tunes a penalty.
    pub fn is_regularized(&self) -> bool {
        self.estimator == Estimator::CrossValidatedLasso
    }
}

/// The seven strategies of the study design.
pub fn registry(config: &StudyConfig) -> Vec<Strategy> {
    let pls_components = config.pls_components.unwrap_or_else(|| config.n_predictors());

    vec![
        Strategy {
            name: "ols",
            representation: Representation::Identity,
            estimator: Estimator::LeastSquares,
        },
        Strategy {
            name: "lasso",
            representation: Representation::Identity,
            estimator: Estimator::CrossValidatedLasso,
        },
        Strategy {
            name: "pca",
            representation: Representation::PrincipalComponents {
                variance_threshold: 1.0,
            },
            estimator: Estimator::LeastSquares,
        },
        Strategy {
            name: "pca_cutoff",
            representation: Representation::PrincipalComponents {
                variance_threshold: config.pca_variance_threshold,
            },
            estimator: Estimator::LeastSquares,
        },
        Strategy {
            name: "pca_lasso",
            representation: Representation::PrincipalComponents {
                variance_threshold: 1.0,
            },
            estimator: Estimator::CrossValidatedLasso,
        },
        Strategy {
            name: "pls",
            representation: Representation::PartialLeastSquares {
                n_components: pls_components,
            },
            estimator: Estimator::LeastSquares,
        },
        Strategy {
            name: "pls_lasso",
            representation: Representation::PartialLeastSquares {
                n_components: pls_components,
            },
            estimator: Estimator::CrossValidatedLasso,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_declares_seven_strategies() {
        let config = StudyConfig::default();
        let strategies = registry(&config);

        assert_eq!(strategies.len(), 7);

        let names: Vec<&str> = strategies.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["ols", "lasso", "pca", "pca_cutoff", "pca_lasso", "pls", "pls_lasso"]
        );
    }

    #[test]
    fn test_plain_pca_retains_everything() {
        let config = StudyConfig::default();
        let strategies = registry(&config);

        let pca = strategies.iter().find(|s| s.name == "pca").expect("pca exists");
        match pca.representation {
            Representation::PrincipalComponents { variance_threshold } => {
                assert!(variance_threshold >= 1.0);
            }
            _ => panic!("pca strategy should use a principal-component representation"),
        }
        assert!(!pca.is_regularized());
    }

    #[test]
    fn test_pls_defaults_to_full_component_count() {
        let config = StudyConfig::default();
        let strategies = registry(&config);

        let pls = strategies.iter().find(|s| s.name == "pls").expect("pls exists");
        match pls.representation {
            Representation::PartialLeastSquares { n_components } => {
                assert_eq!(n_components, config.n_predictors());
            }
            _ => panic!("pls strategy should use a partial-least-squares representation"),
        }
    }
}
