//! True regression coefficients in three magnitude tiers.

use faer::Col;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Uniform;

/// Bounds of the large-negative coefficient tier.
pub const LARGE_NEGATIVE_BOUNDS: (f64, f64) = (-1.0, -0.5);
/// Bounds of the small coefficient tier.
pub const SMALL_BOUNDS: (f64, f64) = (-0.2, 0.2);
/// Bounds of the large-positive coefficient tier.
pub const LARGE_POSITIVE_BOUNDS: (f64, f64) = (0.5, 1.0);

/// The true coefficients of the data-generating process, plus a separately
/// fixed intercept. Held constant across correlation regimes so that regime
/// comparisons isolate the effect of correlation alone.
#[derive(Debug, Clone)]
pub struct CoefficientVector {
    values: Col<f64>,
    intercept: f64,
}

impl CoefficientVector {
    /// Draw a coefficient vector with the given tier sizes, laid out
    /// large-negative, then small, then large-positive. Each tier is drawn
    /// uniformly within its bounds.
    pub fn generate(
        n_large_negative: usize,
        n_small: usize,
        n_large_positive: usize,
        intercept: f64,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let total = n_large_negative + n_small + n_large_positive;
        let mut values = Col::zeros(total);

        let tiers = [
            (n_large_negative, LARGE_NEGATIVE_BOUNDS),
            (n_small, SMALL_BOUNDS),
            (n_large_positive, LARGE_POSITIVE_BOUNDS),
        ];

        let mut offset = 0;
        for (count, (low, high)) in tiers {
            let tier = Uniform::new_inclusive(low, high);
            for k in 0..count {
                values[offset + k] = rng.sample(tier);
            }
            offset += count;
        }

        Self { values, intercept }
    }

    /// Wrap an explicit coefficient vector.
    pub fn from_values(values: Col<f64>, intercept: f64) -> Self {
        Self { values, intercept }
    }

    /// Number of coefficients (excluding the intercept).
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    /// Whether the vector holds no coefficients.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The coefficient values.
    pub fn values(&self) -> &Col<f64> {
        &self.values
    }

    /// The intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
