//! Draws one synthetic dataset from the linear data-generating process.

use faer::{Col, Mat};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::simulate::{CoefficientVector, CorrelationMatrix, SimulationError};

/// One simulated dataset: a response column and an n × p predictor matrix
/// with deterministic column names `X1..Xp`. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Replicate {
    response: Col<f64>,
    predictors: Mat<f64>,
    column_names: Vec<String>,
}

impl Replicate {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.response.nrows()
    }

    /// Number of predictor columns.
    pub fn n_predictors(&self) -> usize {
        self.predictors.ncols()
    }

    /// The response column.
    pub fn response(&self) -> &Col<f64> {
        &self.response
    }

    /// The predictor matrix.
    pub fn predictors(&self) -> &Mat<f64> {
        &self.predictors
    }

    /// Predictor column names, `X1..Xp`.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

/// Simulate `n` rows under a correlation regime.
///
/// Predictors are drawn from a zero-mean multivariate normal whose covariance
/// is the correlation matrix (unit marginal variances), via X = Z·Lᵀ with Z
/// standard normal and L the stored Cholesky factor. Errors are unit-variance
/// homoskedastic noise. The response is `intercept + X·β + ε`.
///
/// Draw order is fixed (predictor rows first, then errors), so identical
/// generator state yields a bit-identical replicate.
pub fn simulate_replicate(
    n: usize,
    correlation: &CorrelationMatrix,
    coefficients: &CoefficientVector,
    rng: &mut ChaCha8Rng,
) -> Result<Replicate, SimulationError> {
    let p = coefficients.len();
    if correlation.dim() != p {
        return Err(SimulationError::DimensionMismatch {
            matrix_dim: correlation.dim(),
            n_coefficients: p,
        });
    }

    let mut standard: Mat<f64> = Mat::zeros(n, p);
    for i in 0..n {
        for j in 0..p {
            standard[(i, j)] = rng.sample::<f64, _>(StandardNormal);
        }
    }

    // X = Z·Lᵀ gives rows with covariance L·Lᵀ = correlation.
    let cholesky = correlation.cholesky_lower();
    let mut predictors: Mat<f64> = Mat::zeros(n, p);
    for i in 0..n {
        for j in 0..p {
            let mut sum = 0.0;
            for k in 0..=j {
                sum += standard[(i, k)] * cholesky[(j, k)];
            }
            predictors[(i, j)] = sum;
        }
    }

    let betas = coefficients.values();
    let intercept = coefficients.intercept();
    let mut response = Col::zeros(n);
    for i in 0..n {
        let mut value = intercept;
        for j in 0..p {
            value += predictors[(i, j)] * betas[j];
        }
        value += rng.sample::<f64, _>(StandardNormal);
        response[i] = value;
    }

    let column_names = (1..=p).map(|j| format!("X{j}")).collect();

    Ok(Replicate {
        response,
        predictors,
        column_names,
    })
}
