//! Random positive-definite correlation matrices with a tunable shape.
//!
//! The shape parameter controls the distribution of pairwise correlations:
//! near 0 the off-diagonals concentrate around zero, around 1.7 they become
//! bimodal at moderate magnitudes, near 2 they spread towards uniform, and
//! beyond that they cluster at ±1 without ever reaching exact collinearity.

use faer::Mat;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::simulate::SimulationError;
use crate::utils::cholesky_lower;

/// A validated correlation matrix: symmetric, unit diagonal, entries in
/// [-1, 1], positive-definite. The lower Cholesky factor is retained for
/// multivariate-normal sampling.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    values: Mat<f64>,
    cholesky: Mat<f64>,
}

impl CorrelationMatrix {
    /// Validate an explicit matrix. Fails when the Cholesky factorization
    /// does not exist, i.e. the matrix is not positive-definite.
    pub fn from_matrix(values: Mat<f64>) -> Result<Self, SimulationError> {
        let size = values.nrows();
        match cholesky_lower(&values) {
            Some(cholesky) => Ok(Self { values, cholesky }),
            None => Err(SimulationError::NotPositiveDefinite { size }),
        }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    /// The correlation entries.
    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    /// Lower Cholesky factor L with values = L·Lᵀ.
    pub fn cholesky_lower(&self) -> &Mat<f64> {
        &self.cholesky
    }

    /// Upper-triangle off-diagonal entries, row by row. Used to document a
    /// regime's correlation distribution (histograms).
    pub fn off_diagonal(&self) -> Vec<f64> {
        let n = self.dim();
        let mut entries = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                entries.push(self.values[(i, j)]);
            }
        }
        entries
    }

    /// Mean absolute off-diagonal correlation.
    pub fn mean_absolute_correlation(&self) -> f64 {
        let entries = self.off_diagonal();
        if entries.is_empty() {
            return 0.0;
        }
        entries.iter().map(|r| r.abs()).sum::<f64>() / entries.len() as f64
    }
}

/// Generate a random positive-definite correlation matrix.
///
/// Repeats up to `max_attempts` times: draw `size` standard-normal rows of
/// length `size`, shift every entry of each row by `shape` times one shared
/// standard-normal scalar, form the Gram matrix, normalize to unit diagonal,
/// and round to `decimals` places. The first candidate whose Cholesky
/// factorization succeeds is returned.
pub fn generate_correlation(
    shape: f64,
    size: usize,
    max_attempts: usize,
    decimals: u32,
    rng: &mut ChaCha8Rng,
) -> Result<CorrelationMatrix, SimulationError> {
    for _ in 0..max_attempts {
        let candidate = candidate_matrix(shape, size, decimals, rng);
        if let Ok(matrix) = CorrelationMatrix::from_matrix(candidate) {
            return Ok(matrix);
        }
    }

    Err(SimulationError::GenerationExhausted {
        attempts: max_attempts,
        size,
    })
}

fn candidate_matrix(shape: f64, size: usize, decimals: u32, rng: &mut ChaCha8Rng) -> Mat<f64> {
    let mut rows: Mat<f64> = Mat::zeros(size, size);
    for i in 0..size {
        for k in 0..size {
            rows[(i, k)] = rng.sample::<f64, _>(StandardNormal);
        }
        // One shared shift per row; this is what moves probability mass from
        // near-zero correlations (shape 0) towards ±1 (large shape).
        let shift: f64 = rng.sample::<f64, _>(StandardNormal);
        for k in 0..size {
            rows[(i, k)] += shape * shift;
        }
    }

    // Gram matrix without centering; the diagonal carries each row's scale.
    let mut gram: Mat<f64> = Mat::zeros(size, size);
    for i in 0..size {
        for j in i..size {
            let mut sum = 0.0;
            for k in 0..size {
                sum += rows[(i, k)] * rows[(j, k)];
            }
            gram[(i, j)] = sum;
            gram[(j, i)] = sum;
        }
    }

    // Normalize to unit diagonal and round. Rounding guards against
    // floating-point asymmetry but can push a near-singular candidate over
    // the edge, which the retry loop absorbs.
    let scale = 10f64.powi(decimals as i32);
    let mut matrix: Mat<f64> = Mat::zeros(size, size);
    for i in 0..size {
        for j in 0..size {
            let denom = (gram[(i, i)] * gram[(j, j)]).sqrt();
            let r = if denom > 0.0 { gram[(i, j)] / denom } else { 0.0 };
            matrix[(i, j)] = (r * scale).round() / scale;
        }
    }

    matrix
}
