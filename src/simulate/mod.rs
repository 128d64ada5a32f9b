//! Synthetic data generation: correlation regimes, true coefficients, and
//! simulated replicates.

mod coefficients;
mod correlation;
mod pools;
mod sampler;

pub use coefficients::{
    CoefficientVector, LARGE_NEGATIVE_BOUNDS, LARGE_POSITIVE_BOUNDS, SMALL_BOUNDS,
};
pub use correlation::{generate_correlation, CorrelationMatrix};
pub use pools::{build_pools, Regime, RegimeLabel, RegimePools, RegimeSpec, ReplicatePool};
pub use sampler::{simulate_replicate, Replicate};

use thiserror::Error;

/// Errors that can occur during data simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("no positive-definite correlation matrix found in {attempts} attempts (size {size})")]
    GenerationExhausted { attempts: usize, size: usize },

    #[error("correlation dimension {matrix_dim} does not match coefficient count {n_coefficients}")]
    DimensionMismatch {
        matrix_dim: usize,
        n_coefficients: usize,
    },

    #[error("matrix of size {size} is not positive-definite")]
    NotPositiveDefinite { size: usize },
}
