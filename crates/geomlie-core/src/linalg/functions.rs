//! Batched matrix exponential, logarithm, power, square root and QR.
//!
//! # Path selection
//!
//! `expm`, `logm` and `powerm` first test the batch for exact symmetry. A
//! symmetric batch goes through the eigendecomposition fast path; for `logm`
//! and `powerm` the fast path additionally requires every transformed
//! eigenvalue to be real and finite. When the test fails the computation is
//! rerouted to the general algorithms of [`general`](super::general). This
//! rerouting is a policy decision, not an error. With
//! [`FallbackPolicy::WholeBatch`] one failing element sends the entire batch
//! to the general path; with [`FallbackPolicy::PerElement`] each element
//! decides for itself.
//!
//! `powerm` on the general path is always `expm(p · logm(X))`. `sqrtm` never
//! takes the symmetric shortcut.
//!
//! Non-finite input entries are rejected before either path runs, and a
//! non-finite result (an overflowing exponential, say) fails with the same
//! [`NumericalError`](crate::error::ManifoldError::NumericalError) on both
//! paths.
//!
//! # Example
//!
//! ```rust
//! use geomlie_core::linalg::{expm, logm};
//! use geomlie_core::core::MatrixBatch;
//! use nalgebra::{dvector, DMatrix};
//!
//! let x = MatrixBatch::single(DMatrix::from_diagonal(&dvector![1.0_f64, 2.0]));
//! let e = expm(&x).unwrap();
//! let back = logm(&e).unwrap().into_single().unwrap();
//! assert!((back[(1, 1)] - 2.0).abs() < 1e-12);
//! ```

use crate::{
    core::batch::MatrixBatch,
    error::Result,
    linalg::{
        config::{global_config, FallbackPolicy, MatrixFunctionConfig},
        general::{self, QrMode},
        symmetric,
    },
    types::{DMatrix, Scalar},
};

/// Matrix-function engine bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct MatrixFunctions {
    config: MatrixFunctionConfig,
}

impl MatrixFunctions {
    /// Engine using the given configuration.
    pub fn new(config: MatrixFunctionConfig) -> Self {
        Self { config }
    }

    /// Engine using a copy of the global configuration.
    pub fn from_global() -> Self {
        Self::new(global_config().clone())
    }

    /// The configuration in use.
    pub fn config(&self) -> &MatrixFunctionConfig {
        &self.config
    }

    /// Whether every matrix of the batch equals its transpose exactly.
    pub fn is_symmetric<T: Scalar>(&self, x: &MatrixBatch<T>) -> bool {
        x.iter().all(symmetric::is_symmetric_matrix)
    }

    /// Exponential of symmetric matrices through their eigendecomposition.
    ///
    /// The input is assumed symmetric; only its lower triangle is read.
    pub fn expsym<T: Scalar>(&self, x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
        x.check_square()?;
        ensure_finite_batch(x)?;
        x.try_map(self.config.parallel_threshold, |m| {
            let result = symmetric::expsym_matrix(m);
            general::ensure_finite(&result, "matrix exponential")?;
            Ok(result)
        })
    }

    /// Matrix exponential.
    pub fn expm<T: Scalar>(&self, x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
        x.check_square()?;
        self.dispatch(
            x,
            "matrix exponential",
            |m| Some(symmetric::expsym_matrix(m)),
            |m| general::expm_general(m),
        )
    }

    /// Principal matrix logarithm.
    pub fn logm<T: Scalar>(&self, x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
        x.check_square()?;
        let config = &self.config;
        self.dispatch(x, "matrix logarithm", symmetric::logsym_matrix, |m| {
            general::logm_general(m, config)
        })
    }

    /// Real matrix power `X^p`.
    pub fn powerm<T: Scalar>(&self, x: &MatrixBatch<T>, power: T) -> Result<MatrixBatch<T>> {
        x.check_square()?;
        let config = &self.config;
        self.dispatch(
            x,
            "matrix power",
            |m| symmetric::powsym_matrix(m, power),
            |m| general::powm_general(m, power, config),
        )
    }

    /// Principal matrix square root, always on the general path.
    pub fn sqrtm<T: Scalar>(&self, x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
        x.check_square()?;
        let config = &self.config;
        x.try_map(config.parallel_threshold, |m| general::sqrtm_general(m, config))
    }

    /// Batched QR decomposition, returning `(Q, R)` with the rank of the input.
    ///
    /// Rectangular matrices are accepted.
    pub fn qr<T: Scalar>(
        &self,
        x: &MatrixBatch<T>,
        mode: QrMode,
    ) -> Result<(MatrixBatch<T>, MatrixBatch<T>)> {
        let factors = x
            .iter()
            .map(|m| general::qr_general(m, mode))
            .collect::<Result<Vec<_>>>()?;
        let (qs, rs): (Vec<DMatrix<T>>, Vec<DMatrix<T>>) = factors.into_iter().unzip();
        Ok((x.with_rank_of(qs), x.with_rank_of(rs)))
    }

    /// Run the symmetric fast path where allowed, the general path elsewhere.
    ///
    /// `fast` returns `None` when its eigenvalue check fails for a matrix.
    /// `op` names the result in errors and logs.
    fn dispatch<T, F, G>(
        &self,
        x: &MatrixBatch<T>,
        op: &'static str,
        fast: F,
        slow: G,
    ) -> Result<MatrixBatch<T>>
    where
        T: Scalar,
        F: Fn(&DMatrix<T>) -> Option<DMatrix<T>> + Sync + Send,
        G: Fn(&DMatrix<T>) -> Result<DMatrix<T>> + Sync + Send,
    {
        ensure_finite_batch(x)?;
        let threshold = self.config.parallel_threshold;
        match self.config.fallback_policy {
            FallbackPolicy::WholeBatch => {
                if self.is_symmetric(x) {
                    let fast_results: Option<Vec<DMatrix<T>>> = x.iter().map(&fast).collect();
                    if let Some(results) = fast_results {
                        for result in &results {
                            general::ensure_finite(result, op)?;
                        }
                        return Ok(x.with_rank_of(results));
                    }
                    tracing::debug!(op, batch = x.len(), "eigenvalue check failed, using general algorithm for the batch");
                }
                x.try_map(threshold, slow)
            }
            FallbackPolicy::PerElement => x.try_map(threshold, |m| {
                if symmetric::is_symmetric_matrix(m) {
                    if let Some(result) = fast(m) {
                        general::ensure_finite(&result, op)?;
                        return Ok(result);
                    }
                    tracing::debug!(op, "eigenvalue check failed, using general algorithm for one element");
                }
                slow(m)
            }),
        }
    }
}

fn ensure_finite_batch<T: Scalar>(x: &MatrixBatch<T>) -> Result<()> {
    x.iter().try_for_each(|m| general::ensure_finite(m, "matrix"))
}

/// Whether every matrix of the batch equals its transpose exactly.
pub fn is_symmetric<T: Scalar>(x: &MatrixBatch<T>) -> bool {
    x.iter().all(symmetric::is_symmetric_matrix)
}

/// Eigen-based exponential of symmetric matrices, with the global configuration.
pub fn expsym<T: Scalar>(x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
    MatrixFunctions::from_global().expsym(x)
}

/// Matrix exponential with the global configuration.
pub fn expm<T: Scalar>(x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
    MatrixFunctions::from_global().expm(x)
}

/// Matrix logarithm with the global configuration.
pub fn logm<T: Scalar>(x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
    MatrixFunctions::from_global().logm(x)
}

/// Matrix power with the global configuration.
pub fn powerm<T: Scalar>(x: &MatrixBatch<T>, power: T) -> Result<MatrixBatch<T>> {
    MatrixFunctions::from_global().powerm(x, power)
}

/// Matrix square root with the global configuration.
pub fn sqrtm<T: Scalar>(x: &MatrixBatch<T>) -> Result<MatrixBatch<T>> {
    MatrixFunctions::from_global().sqrtm(x)
}

/// Batched QR decomposition.
pub fn qr<T: Scalar>(x: &MatrixBatch<T>, mode: QrMode) -> Result<(MatrixBatch<T>, MatrixBatch<T>)> {
    MatrixFunctions::from_global().qr(x, mode)
}
