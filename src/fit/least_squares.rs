//! Closed-form least squares with coefficient inference.
//!
//! Uses QR decomposition with column pivoting so that rank-deficient designs
//! (the pathological end of the collinearity regimes) degrade gracefully:
//! aliased coefficients are set to NaN instead of failing the fit.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::fit::FitError;
use crate::utils::{center_columns, center_vector, detect_constant_columns};

const RANK_TOLERANCE: f64 = 1e-10;

/// A fitted least-squares model with an intercept.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    coefficients: Col<f64>,
    intercept: f64,
    aliased: Vec<bool>,
    p_values: Option<Col<f64>>,
    fitted_values: Col<f64>,
    residuals: Col<f64>,
    rank: usize,
    r_squared: f64,
    mse: f64,
}

/// Fit `y = intercept + x·β` by centered least squares.
pub fn fit(x: &Mat<f64>, y: &Col<f64>) -> Result<LeastSquaresFit, FitError> {
    let n = x.nrows();
    let p = x.ncols();

    if n != y.nrows() {
        return Err(FitError::DimensionMismatch {
            x_rows: n,
            y_len: y.nrows(),
        });
    }
    if n < 2 {
        return Err(FitError::InsufficientObservations { needed: 2, got: n });
    }
    if n < p + 1 {
        return Err(FitError::InsufficientObservations {
            needed: p + 1,
            got: n,
        });
    }

    let constant_cols = detect_constant_columns(x, RANK_TOLERANCE);
    let (x_centered, x_means) = center_columns(x);
    let (y_centered, y_mean) = center_vector(y);

    let (coefficients, aliased, rank) = solve_with_qr(&x_centered, &y_centered, &constant_cols);

    // intercept = ȳ - x̄'β over the non-aliased coefficients.
    let mut intercept = y_mean;
    for j in 0..p {
        if !aliased[j] && !coefficients[j].is_nan() {
            intercept -= x_means[j] * coefficients[j];
        }
    }

    let mut fitted_values = Col::zeros(n);
    let mut residuals = Col::zeros(n);
    for i in 0..n {
        let mut pred = intercept;
        for j in 0..p {
            if !aliased[j] && !coefficients[j].is_nan() {
                pred += x[(i, j)] * coefficients[j];
            }
        }
        fitted_values[i] = pred;
        residuals[i] = y[i] - pred;
    }

    let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
    let rss: f64 = residuals.iter().map(|&r| r.powi(2)).sum();
    let r_squared = if tss > 0.0 {
        (1.0 - rss / tss).clamp(0.0, 1.0)
    } else if rss < 1e-10 {
        1.0
    } else {
        0.0
    };

    let df_resid = n as f64 - (rank + 1) as f64;
    let mse = if df_resid > 0.0 { rss / df_resid } else { f64::NAN };

    let p_values = coefficient_p_values(x, mse, df_resid, &coefficients, &aliased);

    Ok(LeastSquaresFit {
        coefficients,
        intercept,
        aliased,
        p_values,
        fitted_values,
        residuals,
        rank,
        r_squared,
        mse,
    })
}

/// Solve the centered least-squares problem via column-pivoted QR.
///
/// Returns (coefficients, aliased flags, numerical rank); aliased
/// coefficients are NaN.
fn solve_with_qr(
    x: &Mat<f64>,
    y: &Col<f64>,
    constant_cols: &[bool],
) -> (Col<f64>, Vec<bool>, usize) {
    let n_features = x.ncols();
    let n_samples = x.nrows();

    let mut aliased = constant_cols.to_vec();

    let qr = x.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    // perm_inv[j] = where original column j ended up after pivoting.
    let perm_arr = perm.arrays().0;
    let mut perm_inv: Vec<usize> = vec![0; n_features];
    perm_inv[..n_features].copy_from_slice(&perm_arr[..n_features]);

    // Numerical rank from the R diagonal.
    let mut rank = 0;
    for i in 0..n_features.min(n_samples) {
        if r[(i, i)].abs() > RANK_TOLERANCE {
            rank += 1;
        } else {
            break;
        }
    }

    if rank == 0 {
        let mut coefficients = Col::zeros(n_features);
        for j in 0..n_features {
            coefficients[j] = f64::NAN;
            aliased[j] = true;
        }
        return (coefficients, aliased, 0);
    }

    for j in 0..n_features {
        if constant_cols[j] || perm_inv[j] >= rank {
            aliased[j] = true;
        }
    }

    // Back-substitution of R·β_perm = Q'y on the leading rank × rank block.
    let qty = q.transpose() * y;
    let mut beta_reduced = Col::zeros(rank);
    for i in (0..rank).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..rank {
            sum -= r[(i, j)] * beta_reduced[j];
        }
        beta_reduced[i] = sum / r[(i, i)];
    }

    let mut coefficients = Col::zeros(n_features);
    for j in 0..n_features {
        if aliased[j] {
            coefficients[j] = f64::NAN;
        } else {
            coefficients[j] = beta_reduced[perm_inv[j]];
        }
    }

    (coefficients, aliased, rank)
}

/// Two-sided t-test p-values for the coefficients, from the augmented design
/// [1 | X]. Returns `None` when the augmented normal matrix is singular or
/// the residual degrees of freedom are exhausted.
fn coefficient_p_values(
    x: &Mat<f64>,
    mse: f64,
    df: f64,
    coefficients: &Col<f64>,
    aliased: &[bool],
) -> Option<Col<f64>> {
    if df <= 0.0 || !mse.is_finite() {
        return None;
    }

    let n = x.nrows();
    let p = x.ncols();
    let aug = p + 1;

    let mut x_aug: Mat<f64> = Mat::zeros(n, aug);
    for i in 0..n {
        x_aug[(i, 0)] = 1.0;
        for j in 0..p {
            x_aug[(i, j + 1)] = x[(i, j)];
        }
    }

    let xtx_aug = x_aug.transpose() * &x_aug;

    let qr = xtx_aug.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..aug {
        if r[(i, i)].abs() < RANK_TOLERANCE {
            return None;
        }
    }

    // Invert column by column: solve R·z = Q'e_col, where (Q'e_col)_i is
    // Q[(col, i)].
    let mut inverse_diag = vec![0.0; aug];
    for col in 0..aug {
        let mut z = vec![0.0; aug];
        for i in (0..aug).rev() {
            let mut sum = q[(col, i)];
            for j in (i + 1)..aug {
                sum -= r[(i, j)] * z[j];
            }
            z[i] = sum / r[(i, i)];
        }
        inverse_diag[col] = z[col];
    }

    let t_dist = StudentsT::new(0.0, 1.0, df).ok()?;

    let mut p_values = Col::zeros(p);
    for j in 0..p {
        if aliased[j] || coefficients[j].is_nan() {
            p_values[j] = f64::NAN;
            continue;
        }
        let variance = mse * inverse_diag[j + 1];
        if !(variance > 0.0) {
            p_values[j] = f64::NAN;
            continue;
        }
        let t = coefficients[j] / variance.sqrt();
        p_values[j] = if t.is_finite() {
            2.0 * (1.0 - t_dist.cdf(t.abs()))
        } else {
            f64::NAN
        };
    }

    Some(p_values)
}

impl LeastSquaresFit {
    /// Estimated coefficients; aliased entries are NaN.
    pub fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }

    /// Estimated intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient p-values, when the inference computation succeeded.
    pub fn p_values(&self) -> Option<&Col<f64>> {
        self.p_values.as_ref()
    }

    /// Numerical rank of the centered design.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Coefficient of determination on the fitting data.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Residual mean squared error.
    pub fn mse(&self) -> f64 {
        self.mse
    }

    /// Fitted values on the training rows.
    pub fn fitted_values(&self) -> &Col<f64> {
        &self.fitted_values
    }

    /// Training residuals.
    pub fn residuals(&self) -> &Col<f64> {
        &self.residuals
    }

    /// Predict on new rows.
    pub fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let n = x.nrows();
        let p = x.ncols();
        let mut predictions = Col::zeros(n);

        for i in 0..n {
            let mut pred = self.intercept;
            for j in 0..p {
                if !self.aliased[j] && !self.coefficients[j].is_nan() {
                    pred += x[(i, j)] * self.coefficients[j];
                }
            }
            predictions[i] = pred;
        }

        predictions
    }

    /// Number of coefficients with p-value at or below `level`. Aliased
    /// coefficients and coefficients without a computable p-value never
    /// count.
    pub fn significant_count(&self, level: f64) -> usize {
        match &self.p_values {
            Some(p_values) => (0..p_values.nrows())
                .filter(|&j| !self.aliased[j] && p_values[j].is_finite() && p_values[j] <= level)
                .count(),
            None => 0,
        }
    }
}
