//! Partial-least-squares feature representation.
//!
//! Uses the SIMPLS construction (de Jong, 1993): weight directions maximize
//! covariance between predictor scores and the outcome, with the
//! cross-product vector deflated against an orthogonalized loading basis
//! after each component. Unlike the principal-component rotation, the
//! projection is supervised by the response.

use faer::{Col, Mat};

use crate::strategies::RepresentationError;
use crate::utils::{center_columns, center_vector};

const TOLERANCE: f64 = 1e-10;

/// A fitted supervised projection: predictor column means plus the SIMPLS
/// weight matrix mapping centered predictors to component scores.
#[derive(Debug, Clone)]
pub struct PartialLeastSquares {
    x_means: Col<f64>,
    weights: Mat<f64>,
    n_components: usize,
}

impl PartialLeastSquares {
    /// Fit the projection with up to `n_components` components. The count is
    /// clamped to min(rows, columns); extraction stops early when the
    /// deflated cross-product vanishes. Fails when not even one informative
    /// component can be extracted.
    pub fn fit(
        x: &Mat<f64>,
        y: &Col<f64>,
        n_components: usize,
    ) -> Result<Self, RepresentationError> {
        let n = x.nrows();
        let p = x.ncols();
        if n < 2 {
            return Err(RepresentationError::TooFewRows { needed: 2, got: n });
        }

        let requested = n_components.min(n).min(p).max(1);

        let (x_centered, x_means) = center_columns(x);
        let (y_centered, _) = center_vector(y);

        let mut weights: Mat<f64> = Mat::zeros(p, requested);
        let mut loadings: Mat<f64> = Mat::zeros(p, requested);
        let mut extracted = 0;

        // s = X'y, deflated after each component.
        let mut s = Col::zeros(p);
        for j in 0..p {
            let mut sum = 0.0;
            for i in 0..n {
                sum += x_centered[(i, j)] * y_centered[i];
            }
            s[j] = sum;
        }

        for a in 0..requested {
            // Direction for this component, orthogonalized against the
            // loading basis of earlier components.
            let mut r = s.clone();
            for k in 0..a {
                let mut dot = 0.0;
                for j in 0..p {
                    dot += loadings[(j, k)] * r[j];
                }
                for j in 0..p {
                    r[j] -= loadings[(j, k)] * dot;
                }
            }

            let r_norm = r.iter().map(|&v| v * v).sum::<f64>().sqrt();
            if r_norm < TOLERANCE {
                break;
            }
            for j in 0..p {
                weights[(j, a)] = r[j] / r_norm;
            }

            // Score t = X·w and its norm.
            let mut t = Col::zeros(n);
            for i in 0..n {
                let mut sum = 0.0;
                for j in 0..p {
                    sum += x_centered[(i, j)] * weights[(j, a)];
                }
                t[i] = sum;
            }
            let t_norm = t.iter().map(|&v| v * v).sum::<f64>().sqrt();
            if t_norm < TOLERANCE {
                break;
            }

            // Loading v = X't / ||t||², orthogonalized and normalized, then
            // used to deflate s.
            for j in 0..p {
                let mut sum = 0.0;
                for i in 0..n {
                    sum += x_centered[(i, j)] * t[i];
                }
                loadings[(j, a)] = sum / (t_norm * t_norm);
            }
            for k in 0..a {
                let mut dot = 0.0;
                for j in 0..p {
                    dot += loadings[(j, k)] * loadings[(j, a)];
                }
                for j in 0..p {
                    loadings[(j, a)] -= loadings[(j, k)] * dot;
                }
            }
            let v_norm = (0..p).map(|j| loadings[(j, a)].powi(2)).sum::<f64>().sqrt();
            if v_norm < TOLERANCE {
                break;
            }
            for j in 0..p {
                loadings[(j, a)] /= v_norm;
            }

            let mut vts = 0.0;
            for j in 0..p {
                vts += loadings[(j, a)] * s[j];
            }
            for j in 0..p {
                s[j] -= loadings[(j, a)] * vts;
            }

            extracted = a + 1;
        }

        if extracted == 0 {
            return Err(RepresentationError::DegenerateProjection);
        }

        let weights = Mat::from_fn(p, extracted, |j, a| weights[(j, a)]);

        Ok(Self {
            x_means,
            weights,
            n_components: extracted,
        })
    }

    /// Number of extracted components.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Project predictors onto the component scores.
    pub fn transform(&self, x: &Mat<f64>) -> Mat<f64> {
        let n = x.nrows();
        let p = self.x_means.nrows();
        let a = self.n_components;

        let mut scores: Mat<f64> = Mat::zeros(n, a);
        for i in 0..n {
            for c in 0..a {
                let mut sum = 0.0;
                for j in 0..p {
                    sum += (x[(i, j)] - self.x_means[j]) * self.weights[(j, c)];
                }
                scores[(i, c)] = sum;
            }
        }

        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_data(n: usize) -> (Mat<f64>, Col<f64>) {
        let x = Mat::from_fn(n, 4, |i, j| {
            let t = i as f64 * 0.23;
            (t + j as f64 * 0.81).sin() + 0.1 * (t * (j + 1) as f64).cos()
        });
        let y = Col::from_fn(n, |i| {
            1.0 + 2.0 * x[(i, 0)] - 0.7 * x[(i, 2)] + 0.05 * (i as f64 * 0.11).sin()
        });
        (x, y)
    }

    #[test]
    fn test_fit_extracts_requested_components() {
        let (x, y) = test_data(40);
        let pls = PartialLeastSquares::fit(&x, &y, 3).expect("fits");
        assert_eq!(pls.n_components(), 3);
    }

    #[test]
    fn test_component_count_is_clamped() {
        let (x, y) = test_data(40);
        let pls = PartialLeastSquares::fit(&x, &y, 100).expect("fits");
        assert!(pls.n_components() <= 4);
        assert!(pls.n_components() >= 1);
    }

    #[test]
    fn test_scores_shape_and_centering() {
        let (x, y) = test_data(36);
        let pls = PartialLeastSquares::fit(&x, &y, 2).expect("fits");
        let scores = pls.transform(&x);

        assert_eq!(scores.nrows(), 36);
        assert_eq!(scores.ncols(), 2);
        for c in 0..2 {
            let mean: f64 = (0..36).map(|i| scores[(i, c)]).sum::<f64>() / 36.0;
            assert!(mean.abs() < 1e-10);
        }
    }

    #[test]
    fn test_first_component_tracks_outcome() {
        // The first score should correlate with y far better than noise.
        let (x, y) = test_data(60);
        let pls = PartialLeastSquares::fit(&x, &y, 1).expect("fits");
        let scores = pls.transform(&x);

        let y_mean: f64 = y.iter().sum::<f64>() / 60.0;
        let mut cov = 0.0;
        let mut var_t = 0.0;
        let mut var_y = 0.0;
        for i in 0..60 {
            let t = scores[(i, 0)];
            cov += t * (y[i] - y_mean);
            var_t += t * t;
            var_y += (y[i] - y_mean).powi(2);
        }
        let correlation = cov / (var_t.sqrt() * var_y.sqrt());
        assert!(correlation.abs() > 0.7, "correlation = {correlation}");
    }

    #[test]
    fn test_degenerate_predictors_fail() {
        // Constant predictors carry no covariance with y.
        let x = Mat::from_fn(20, 3, |_, _| 2.5);
        let y = Col::from_fn(20, |i| i as f64);

        assert!(matches!(
            PartialLeastSquares::fit(&x, &y, 2),
            Err(RepresentationError::DegenerateProjection)
        ));
    }

    #[test]
    fn test_too_few_rows() {
        let x = Mat::zeros(1, 2);
        let y = Col::zeros(1);
        assert!(matches!(
            PartialLeastSquares::fit(&x, &y, 1),
            Err(RepresentationError::TooFewRows { needed: 2, got: 1 })
        ));
    }
}
