//! Study configuration and validation.

use thiserror::Error;

/// Descriptive label for a multicollinearity regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegimeLabel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegimeLabel::Low => write!(f, "low"),
            RegimeLabel::Moderate => write!(f, "moderate"),
            RegimeLabel::High => write!(f, "high"),
        }
    }
}

/// One correlation regime to simulate: a label plus the shape value driving
/// the correlation distribution of its generated matrix.
#[derive(Debug, Clone, Copy)]
pub struct RegimeShapeSpec {
    pub label: RegimeLabel,
    pub shape: f64,
}

/// Configuration for a full simulation study.
///
/// Defaults reproduce the reference design: three regimes (shape 0.0 / 1.7 /
/// 2.5), 30 predictors in three coefficient tiers of 10, 100 training
/// replicates of 100 rows and 50 testing replicates of 20 rows per regime.
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Number of large-negative coefficients, drawn uniformly from [-1, -0.5].
    pub n_large_negative: usize,
    /// Number of small coefficients, drawn uniformly from [-0.2, 0.2].
    pub n_small: usize,
    /// Number of large-positive coefficients, drawn uniformly from [0.5, 1].
    pub n_large_positive: usize,
    /// Fixed intercept of the data-generating process.
    pub intercept: f64,
    /// Correlation regimes to simulate, in report order.
    pub regimes: Vec<RegimeShapeSpec>,
    /// Training replicates per regime.
    pub train_replicates: usize,
    /// Rows per training replicate.
    pub train_rows: usize,
    /// Testing replicates per regime.
    pub test_replicates: usize,
    /// Rows per testing replicate.
    pub test_rows: usize,
    /// Attempt budget for correlation-matrix generation.
    pub max_generation_attempts: usize,
    /// Decimal places kept when rounding generated correlation entries.
    pub correlation_decimals: u32,
    /// Ascending penalty grid searched by cross-validated L1 estimators.
    pub penalty_grid: Vec<f64>,
    /// Fold count for cross-validated tuning.
    pub k_folds: usize,
    /// Relaxed significance level for parameter counting (default 0.5).
    pub relaxed_significance: f64,
    /// Strict significance level for parameter counting (default 0.05).
    pub strict_significance: f64,
    /// Cumulative-variance threshold of the thresholded-PCA strategy.
    ///
    /// Values >= 1.0 resolve to full retention; the registry's plain PCA
    /// strategy uses exactly that configuration.
    pub pca_variance_threshold: f64,
    /// Component count for the PLS strategies; `None` keeps one component per
    /// predictor.
    pub pls_components: Option<usize>,
    /// Confidence level of the aggregated mean intervals (default 0.99).
    pub confidence_level: f64,
    /// Iteration cap for the coordinate-descent L1 solver.
    pub lasso_max_iterations: usize,
    /// Convergence tolerance for the coordinate-descent L1 solver.
    pub lasso_tolerance: f64,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            n_large_negative: 10,
            n_small: 10,
            n_large_positive: 10,
            intercept: 1.0,
            regimes: vec![
                RegimeShapeSpec {
                    label: RegimeLabel::Low,
                    shape: 0.0,
                },
                RegimeShapeSpec {
                    label: RegimeLabel::Moderate,
                    shape: 1.7,
                },
                RegimeShapeSpec {
                    label: RegimeLabel::High,
                    shape: 2.5,
                },
            ],
            train_replicates: 100,
            train_rows: 100,
            test_replicates: 50,
            test_rows: 20,
            max_generation_attempts: 100,
            correlation_decimals: 6,
            penalty_grid: default_penalty_grid(),
            k_folds: 10,
            relaxed_significance: 0.5,
            strict_significance: 0.05,
            pca_variance_threshold: 0.75,
            pls_components: None,
            confidence_level: 0.99,
            lasso_max_iterations: 1000,
            lasso_tolerance: 1e-6,
        }
    }
}

/// Errors that can occur when validating a study configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one predictor coefficient is required")]
    NoPredictors,

    #[error("at least one correlation regime is required")]
    NoRegimes,

    #[error("regime shape must be finite and non-negative, got {0}")]
    InvalidShape(f64),

    #[error("replicate counts and row counts must be positive")]
    EmptyPool,

    #[error("training replicates need at least 2 rows, got {0}")]
    TooFewRows(usize),

    #[error("max_generation_attempts must be at least 1")]
    NoGenerationBudget,

    #[error("penalty grid must be non-empty")]
    EmptyPenaltyGrid,

    #[error("penalty grid must be finite, positive, and strictly ascending")]
    InvalidPenaltyGrid,

    #[error("k_folds must be in [2, train_rows], got {0}")]
    InvalidFoldCount(usize),

    #[error("significance level must be in (0, 1], got {0}")]
    InvalidSignificance(f64),

    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("pca_variance_threshold must be positive, got {0}")]
    InvalidVarianceThreshold(f64),

    #[error("pls_components must be at least 1")]
    InvalidComponentCount,

    #[error("lasso_max_iterations must be at least 1")]
    InvalidMaxIterations,

    #[error("lasso_tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

impl StudyConfig {
    /// Create a new builder with default options.
    pub fn builder() -> StudyConfigBuilder {
        StudyConfigBuilder::default()
    }

    /// Total predictor count: the three coefficient tiers laid end to end.
    pub fn n_predictors(&self) -> usize {
        self.n_large_negative + self.n_small + self.n_large_positive
    }

    /// Validate the configuration and return an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_predictors() == 0 {
            return Err(ConfigError::NoPredictors);
        }
        if self.regimes.is_empty() {
            return Err(ConfigError::NoRegimes);
        }
        for spec in &self.regimes {
            if !spec.shape.is_finite() || spec.shape < 0.0 {
                return Err(ConfigError::InvalidShape(spec.shape));
            }
        }
        if self.train_replicates == 0
            || self.test_replicates == 0
            || self.train_rows == 0
            || self.test_rows == 0
        {
            return Err(ConfigError::EmptyPool);
        }
        if self.train_rows < 2 {
            return Err(ConfigError::TooFewRows(self.train_rows));
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::NoGenerationBudget);
        }
        if self.penalty_grid.is_empty() {
            return Err(ConfigError::EmptyPenaltyGrid);
        }
        let ascending = self
            .penalty_grid
            .windows(2)
            .all(|pair| pair[0] < pair[1]);
        let positive = self
            .penalty_grid
            .iter()
            .all(|&lambda| lambda.is_finite() && lambda > 0.0);
        if !ascending || !positive {
            return Err(ConfigError::InvalidPenaltyGrid);
        }
        if self.k_folds < 2 || self.k_folds > self.train_rows {
            return Err(ConfigError::InvalidFoldCount(self.k_folds));
        }
        for level in [self.relaxed_significance, self.strict_significance] {
            if !(level > 0.0 && level <= 1.0) {
                return Err(ConfigError::InvalidSignificance(level));
            }
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidConfidenceLevel(self.confidence_level));
        }
        if !(self.pca_variance_threshold > 0.0) {
            return Err(ConfigError::InvalidVarianceThreshold(
                self.pca_variance_threshold,
            ));
        }
        if self.pls_components == Some(0) {
            return Err(ConfigError::InvalidComponentCount);
        }
        if self.lasso_max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        if !(self.lasso_tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.lasso_tolerance));
        }
        Ok(())
    }
}

/// Default penalty grid: 25 log-spaced values from 1e-4 to 1, ascending.
pub fn default_penalty_grid() -> Vec<f64> {
    let n = 25;
    (0..n)
        .map(|i| 10f64.powf(-4.0 + 4.0 * i as f64 / (n - 1) as f64))
        .collect()
}

/// Builder for `StudyConfig`.
#[derive(Debug, Clone, Default)]
pub struct StudyConfigBuilder {
    config: StudyConfig,
}

impl StudyConfigBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coefficient tier sizes (large-negative, small, large-positive).
    pub fn tier_sizes(mut self, large_negative: usize, small: usize, large_positive: usize) -> Self {
        self.config.n_large_negative = large_negative;
        self.config.n_small = small;
        self.config.n_large_positive = large_positive;
        self
    }

    /// Set the intercept of the data-generating process.
    pub fn intercept(mut self, intercept: f64) -> Self {
        self.config.intercept = intercept;
        self
    }

    /// Replace the regime list.
    pub fn regimes(mut self, regimes: Vec<RegimeShapeSpec>) -> Self {
        self.config.regimes = regimes;
        self
    }

    /// Set the training pool dimensions.
    pub fn training_pool(mut self, replicates: usize, rows: usize) -> Self {
        self.config.train_replicates = replicates;
        self.config.train_rows = rows;
        self
    }

    /// Set the testing pool dimensions.
    pub fn testing_pool(mut self, replicates: usize, rows: usize) -> Self {
        self.config.test_replicates = replicates;
        self.config.test_rows = rows;
        self
    }

    /// Set the correlation generation attempt budget.
    pub fn max_generation_attempts(mut self, attempts: usize) -> Self {
        self.config.max_generation_attempts = attempts;
        self
    }

    /// Replace the penalty grid searched by cross-validated L1 estimators.
    pub fn penalty_grid(mut self, grid: Vec<f64>) -> Self {
        self.config.penalty_grid = grid;
        self
    }

    /// Set the fold count for cross-validated tuning.
    pub fn k_folds(mut self, k: usize) -> Self {
        self.config.k_folds = k;
        self
    }

    /// Set both parameter-counting significance levels.
    pub fn significance_levels(mut self, relaxed: f64, strict: f64) -> Self {
        self.config.relaxed_significance = relaxed;
        self.config.strict_significance = strict;
        self
    }

    /// Set the cumulative-variance threshold of the thresholded-PCA strategy.
    pub fn pca_variance_threshold(mut self, threshold: f64) -> Self {
        self.config.pca_variance_threshold = threshold;
        self
    }

    /// Set the PLS component count.
    pub fn pls_components(mut self, components: usize) -> Self {
        self.config.pls_components = Some(components);
        self
    }

    /// Set the confidence level of aggregated mean intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.config.confidence_level = level;
        self
    }

    /// Build the configuration, validating it first.
    pub fn build(self) -> Result<StudyConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
