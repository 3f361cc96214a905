//! Runtime configuration of the matrix-function engine.
//!
//! The engine reads its knobs from a [`MatrixFunctionConfig`]. A process-wide
//! default is lazily initialized and can be replaced once, before first use,
//! with [`set_global_config`]; callers needing different settings build a
//! [`MatrixFunctions`](super::MatrixFunctions) with their own config instead.

use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Global configuration for the matrix-function engine
static GLOBAL_CONFIG: OnceLock<MatrixFunctionConfig> = OnceLock::new();

/// How a failed eigenvalue check on the symmetric fast path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FallbackPolicy {
    /// The batch takes the fast path only if every element is symmetric and
    /// passes the eigenvalue check; otherwise the whole batch uses the general
    /// algorithm.
    #[default]
    WholeBatch,
    /// Each element picks its own path.
    PerElement,
}

/// Configuration for the matrix-function engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatrixFunctionConfig {
    /// Fast-path fallback granularity.
    pub fallback_policy: FallbackPolicy,

    /// Maximum number of Denman–Beavers iterations for one square root.
    pub sqrt_max_iterations: usize,

    /// Relative Frobenius change at which the square-root iteration stops.
    ///
    /// Values below `10 · n · ε` of the scalar type are raised to that floor.
    pub sqrt_tolerance: f64,

    /// Maximum number of square roots taken by the logarithm before giving up.
    pub log_max_square_roots: usize,

    /// Batches at least this long are mapped in parallel.
    pub parallel_threshold: usize,
}

impl Default for MatrixFunctionConfig {
    fn default() -> Self {
        Self {
            fallback_policy: FallbackPolicy::WholeBatch,
            sqrt_max_iterations: 100,
            sqrt_tolerance: 1e-12,
            log_max_square_roots: 64,
            parallel_threshold: 32,
        }
    }
}

impl MatrixFunctionConfig {
    /// Start a builder from the default values.
    pub fn builder() -> MatrixFunctionConfigBuilder {
        MatrixFunctionConfigBuilder::new()
    }
}

/// Builder for customizing the engine configuration
#[derive(Debug, Clone, Default)]
pub struct MatrixFunctionConfigBuilder {
    config: MatrixFunctionConfig,
}

impl MatrixFunctionConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: MatrixFunctionConfig::default(),
        }
    }

    /// Set the fallback policy
    pub fn fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.config.fallback_policy = policy;
        self
    }

    /// Set the square-root iteration cap
    pub fn sqrt_max_iterations(mut self, iterations: usize) -> Self {
        self.config.sqrt_max_iterations = iterations;
        self
    }

    /// Set the square-root stopping tolerance
    pub fn sqrt_tolerance(mut self, tolerance: f64) -> Self {
        self.config.sqrt_tolerance = tolerance;
        self
    }

    /// Set the cap on square roots taken by the logarithm
    pub fn log_max_square_roots(mut self, count: usize) -> Self {
        self.config.log_max_square_roots = count;
        self
    }

    /// Set the parallel mapping threshold
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Build the configuration
    pub fn build(self) -> MatrixFunctionConfig {
        self.config
    }
}

/// Get the global engine configuration
pub fn global_config() -> &'static MatrixFunctionConfig {
    GLOBAL_CONFIG.get_or_init(MatrixFunctionConfig::default)
}

/// Set the global engine configuration.
///
/// Fails, handing the config back, if the global config was already
/// initialized (explicitly or by a first use).
pub fn set_global_config(config: MatrixFunctionConfig) -> Result<(), MatrixFunctionConfig> {
    GLOBAL_CONFIG.set(config)
}
