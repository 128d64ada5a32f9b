//! Principal-component feature representation.

use faer::{Col, Mat};

use crate::strategies::RepresentationError;
use crate::utils::{center_columns, symmetric_eigen};

const EIGEN_MAX_SWEEPS: usize = 64;
const EIGEN_TOLERANCE: f64 = 1e-11;

/// A fitted principal-component rotation: column means and the retained
/// eigenvectors of the predictor covariance, sorted by descending eigenvalue.
#[derive(Debug, Clone)]
pub struct PrincipalComponents {
    means: Col<f64>,
    rotation: Mat<f64>,
    eigenvalues: Col<f64>,
    n_components: usize,
}

impl PrincipalComponents {
    /// Fit the rotation on a predictor matrix, retaining the minimal number
    /// of components whose cumulative explained variance reaches
    /// `variance_threshold`. Thresholds >= 1.0 retain every component.
    pub fn fit(x: &Mat<f64>, variance_threshold: f64) -> Result<Self, RepresentationError> {
        let n = x.nrows();
        let p = x.ncols();
        if n < 2 {
            return Err(RepresentationError::TooFewRows { needed: 2, got: n });
        }

        let (centered, means) = center_columns(x);

        let mut covariance: Mat<f64> = Mat::zeros(p, p);
        for i in 0..p {
            for j in i..p {
                let mut sum = 0.0;
                for r in 0..n {
                    sum += centered[(r, i)] * centered[(r, j)];
                }
                let value = sum / (n - 1) as f64;
                covariance[(i, j)] = value;
                covariance[(j, i)] = value;
            }
        }

        let (eigenvalues, vectors) = symmetric_eigen(&covariance, EIGEN_MAX_SWEEPS, EIGEN_TOLERANCE)
            .ok_or(RepresentationError::EigenFailure)?;

        let n_components = components_for_threshold(&eigenvalues, variance_threshold);
        let rotation = Mat::from_fn(p, n_components, |i, k| vectors[(i, k)]);

        Ok(Self {
            means,
            rotation,
            eigenvalues,
            n_components,
        })
    }

    /// Number of retained components.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Eigenvalues of the predictor covariance, descending, all of them
    /// (not only the retained ones).
    pub fn eigenvalues(&self) -> &Col<f64> {
        &self.eigenvalues
    }

    /// Project predictors onto the retained components.
    pub fn transform(&self, x: &Mat<f64>) -> Mat<f64> {
        let n = x.nrows();
        let p = self.means.nrows();
        let k = self.n_components;

        let mut scores: Mat<f64> = Mat::zeros(n, k);
        for i in 0..n {
            for c in 0..k {
                let mut sum = 0.0;
                for j in 0..p {
                    sum += (x[(i, j)] - self.means[j]) * self.rotation[(j, c)];
                }
                scores[(i, c)] = sum;
            }
        }

        scores
    }
}

/// Minimal component count whose cumulative variance share reaches the
/// threshold. A threshold of 1.0 or more resolves to full retention.
fn components_for_threshold(eigenvalues: &Col<f64>, threshold: f64) -> usize {
    let p = eigenvalues.nrows();
    if threshold >= 1.0 {
        return p;
    }

    let total: f64 = eigenvalues.iter().map(|&v| v.max(0.0)).sum();
    if total <= 0.0 {
        return p;
    }

    let mut cumulative = 0.0;
    for k in 0..p {
        cumulative += eigenvalues[k].max(0.0);
        if cumulative / total >= threshold {
            return k + 1;
        }
    }
    p
}
