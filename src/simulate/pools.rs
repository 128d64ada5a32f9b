//! Replicate pools: independent simulated datasets grouped by regime.

use rand_chacha::ChaCha8Rng;

pub use crate::core::RegimeLabel;
use crate::simulate::{
    simulate_replicate, CoefficientVector, CorrelationMatrix, Replicate, SimulationError,
};

/// One multicollinearity scenario: a label, the shape that generated it, and
/// its correlation matrix. Created once per run and shared read-only by every
/// replicate drawn under it.
#[derive(Debug, Clone)]
pub struct Regime {
    pub label: RegimeLabel,
    pub shape: f64,
    pub correlation: CorrelationMatrix,
}

/// Pool dimensions for one regime.
#[derive(Debug, Clone)]
pub struct RegimeSpec {
    pub regime: Regime,
    pub train_count: usize,
    pub train_rows: usize,
    pub test_count: usize,
    pub test_rows: usize,
}

/// An ordered collection of replicates sharing a regime and sample size.
#[derive(Debug, Clone)]
pub struct ReplicatePool {
    label: RegimeLabel,
    rows_per_replicate: usize,
    replicates: Vec<Replicate>,
}

impl ReplicatePool {
    /// Regime label of every replicate in the pool.
    pub fn label(&self) -> RegimeLabel {
        self.label
    }

    /// Rows in each replicate.
    pub fn rows_per_replicate(&self) -> usize {
        self.rows_per_replicate
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    /// The replicates, in draw order.
    pub fn replicates(&self) -> &[Replicate] {
        &self.replicates
    }
}

/// Training and testing pools for one regime.
#[derive(Debug, Clone)]
pub struct RegimePools {
    pub regime: Regime,
    pub training: ReplicatePool,
    pub testing: ReplicatePool,
}

/// Build training and testing pools for every regime, order-preserving.
///
/// Coefficients and each regime's correlation matrix are held fixed across
/// all of that regime's replicates. Training draws come from `train_rng` and
/// testing draws from `test_rng`, mirroring the per-stage reseeding of the
/// reference design.
pub fn build_pools(
    specs: Vec<RegimeSpec>,
    coefficients: &CoefficientVector,
    train_rng: &mut ChaCha8Rng,
    test_rng: &mut ChaCha8Rng,
) -> Result<Vec<RegimePools>, SimulationError> {
    let mut pools = Vec::with_capacity(specs.len());

    for spec in specs {
        let mut training = Vec::with_capacity(spec.train_count);
        for _ in 0..spec.train_count {
            training.push(simulate_replicate(
                spec.train_rows,
                &spec.regime.correlation,
                coefficients,
                train_rng,
            )?);
        }

        let mut testing = Vec::with_capacity(spec.test_count);
        for _ in 0..spec.test_count {
            testing.push(simulate_replicate(
                spec.test_rows,
                &spec.regime.correlation,
                coefficients,
                test_rng,
            )?);
        }

        log::debug!(
            "regime {}: {} training x {} rows, {} testing x {} rows",
            spec.regime.label,
            training.len(),
            spec.train_rows,
            testing.len(),
            spec.test_rows
        );

        pools.push(RegimePools {
            training: ReplicatePool {
                label: spec.regime.label,
                rows_per_replicate: spec.train_rows,
                replicates: training,
            },
            testing: ReplicatePool {
                label: spec.regime.label,
                rows_per_replicate: spec.test_rows,
                replicates: testing,
            },
            regime: spec.regime,
        });
    }

    Ok(pools)
}
